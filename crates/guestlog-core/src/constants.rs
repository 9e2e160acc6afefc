//! Constants and default values for the guest log agent

use std::path::PathBuf;

/// Default agent home directory name
pub const GUESTLOG_DIR: &str = ".guestlog";

/// Default socket file name
pub const SOCKET_FILE: &str = "agent.sock";

/// Default config file name inside the agent home
pub const CONFIG_FILE: &str = "agent.toml";

/// Default container root directory name inside the agent home
pub const CONTAINERS_DIR: &str = "containers";

/// Base directory for guest log files
pub const GUEST_LOG_BASE_DIR: &str = "/var/log/trove";

/// Directory under the base directory holding datastore logs
pub const GUEST_LOG_DATASTORE_DIRNAME: &str = "datastore";

/// Name of the agent's own system log
pub const GUEST_LOG_NAME: &str = "guest";

/// Default container for published log segments
pub const DEFAULT_LOG_CONTAINER: &str = "database_logs";

/// Suffix appended to an object prefix to name its metafile
pub const METAFILE_SUFFIX: &str = "_metafile";

/// Permission bits applied to every guest log file (rw-r-----)
pub const LOG_FILE_MODE: u32 = 0o640;

/// Default size of a single published segment (64KB)
pub const DEFAULT_SEGMENT_SIZE: u64 = 64 * 1024;

/// Container name reported before a log has been published
pub const UNASSIGNED_CONTAINER: &str = "n/a";

/// Get the agent home directory
pub fn guestlog_home() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(GUESTLOG_DIR))
        .unwrap_or_else(|| PathBuf::from(GUESTLOG_DIR))
}

/// Get the socket path
pub fn socket_path() -> PathBuf {
    guestlog_home().join(SOCKET_FILE)
}

/// Get the default config path
pub fn config_path() -> PathBuf {
    guestlog_home().join(CONFIG_FILE)
}

/// Get the default container root
pub fn containers_dir() -> PathBuf {
    guestlog_home().join(CONTAINERS_DIR)
}

/// File name for a datastore log, e.g. `mysql-general.log`
pub fn log_file_name(manager: &str, log_name: &str) -> String {
    format!("{}-{}.log", manager, log_name)
}
