//! Agent configuration file parsing
//!
//! Supports multiple configuration file formats:
//! - TOML (.toml)
//! - YAML (.yaml, .yml)
//! - JSON (.json)

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::error::{Error, Result};
use crate::types::{validate_log_name, LogType};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(ConfigFormat::Toml),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    /// Detect format from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

fn default_instance_id() -> String {
    "local".to_string()
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(GUEST_LOG_BASE_DIR)
}

fn default_datastore_dirname() -> String {
    GUEST_LOG_DATASTORE_DIRNAME.to_string()
}

fn default_container() -> String {
    DEFAULT_LOG_CONTAINER.to_string()
}

fn default_container_root() -> PathBuf {
    containers_dir()
}

fn default_segment_size() -> u64 {
    DEFAULT_SEGMENT_SIZE
}

fn default_true() -> bool {
    true
}

/// Agent configuration (agent.toml/yaml/json)
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Datastore manager name, e.g. "mysql"
    pub manager: String,
    /// Instance identifier used to namespace published objects
    #[serde(default = "default_instance_id")]
    pub instance_id: String,
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    #[serde(default = "default_datastore_dirname")]
    pub datastore_dirname: String,
    /// Container that receives published segments
    #[serde(default = "default_container")]
    pub container: String,
    /// Directory backing the object containers
    #[serde(default = "default_container_root")]
    pub container_root: PathBuf,
    /// Maximum bytes per published segment
    #[serde(default = "default_segment_size")]
    pub segment_size: u64,
    /// Command probing the datastore service on `update_status`
    pub status_command: Option<String>,
    /// Owner of the agent's own guest log (defaults to the current user)
    pub guest_log_owner: Option<String>,
    #[serde(default)]
    pub logs: Vec<LogConfig>,
}

/// Single datastore log from the config file
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub log_type: LogType,
    pub owner: String,
    /// Explicit log file; built under the datastore directory when absent
    pub file: Option<PathBuf>,
    /// Directory used instead of `<base_dir>/<datastore_dirname>`
    pub datastore_dir: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub exposed: bool,
    #[serde(default)]
    pub enabled: bool,
    pub enable_command: Option<String>,
    pub disable_command: Option<String>,
    /// Toggling this log only takes effect after a service restart
    #[serde(default)]
    pub restart_required: bool,
}

impl AgentConfig {
    /// Minimal config for a manager with no datastore logs
    pub fn new(manager: impl Into<String>) -> Self {
        Self {
            manager: manager.into(),
            instance_id: default_instance_id(),
            base_dir: default_base_dir(),
            datastore_dirname: default_datastore_dirname(),
            container: default_container(),
            container_root: default_container_root(),
            segment_size: default_segment_size(),
            status_command: None,
            guest_log_owner: None,
            logs: Vec::new(),
        }
    }

    /// Load config from file, automatically detecting format from extension
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            Error::ConfigError(format!(
                "Unsupported config file extension: {}. Expected .toml, .yaml, .yml, or .json",
                path.display()
            ))
        })?;

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, format)
    }

    /// Parse config content with specified format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let config: AgentConfig = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check names and ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if !validate_log_name(&self.manager) {
            return Err(Error::config(format!("Invalid manager name '{}'", self.manager)));
        }
        if self.segment_size == 0 {
            return Err(Error::config("segment_size must be greater than zero"));
        }

        let mut seen = HashSet::new();
        seen.insert(GUEST_LOG_NAME);
        for log in &self.logs {
            if !validate_log_name(&log.name) {
                return Err(Error::config(format!(
                    "Invalid log name '{}': only alphanumeric characters, underscores, and hyphens are allowed",
                    log.name
                )));
            }
            if !seen.insert(log.name.as_str()) {
                return Err(Error::config(format!("Duplicate log name '{}'", log.name)));
            }
            if let Some(file) = &log.file {
                if !file.is_absolute() {
                    return Err(Error::config(format!(
                        "Log file for '{}' must be an absolute path: {}",
                        log.name,
                        file.display()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Default datastore log directory, `<base_dir>/<datastore_dirname>`
    pub fn datastore_dir(&self) -> PathBuf {
        self.base_dir.join(&self.datastore_dirname)
    }

    /// Look up a configured datastore log
    pub fn log(&self, name: &str) -> Option<&LogConfig> {
        self.logs.iter().find(|l| l.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_format_detection() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("yaml"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("yml"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("txt"), None);
    }

    #[test]
    fn test_config_parse_toml() {
        let config_content = r#"
manager = "mysql"
instance_id = "6e4f1c2a"
status_command = "mysqladmin ping"

[[logs]]
name = "general"
type = "user"
owner = "mysql"
enable_command = "mysql -e 'SET GLOBAL general_log = 1'"
disable_command = "mysql -e 'SET GLOBAL general_log = 0'"

[[logs]]
name = "error"
type = "sys"
owner = "mysql"
file = "/var/log/mysql/error.log"
"#;
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = AgentConfig::load(file.path()).unwrap();
        assert_eq!(config.manager, "mysql");
        assert_eq!(config.instance_id, "6e4f1c2a");
        assert_eq!(config.logs.len(), 2);
        assert_eq!(config.logs[0].log_type, LogType::User);
        assert!(config.logs[0].exposed);
        assert!(!config.logs[0].enabled);
        assert_eq!(config.logs[1].log_type, LogType::Sys);
        assert_eq!(
            config.logs[1].file,
            Some(PathBuf::from("/var/log/mysql/error.log"))
        );
        // Defaults
        assert_eq!(config.base_dir, PathBuf::from(GUEST_LOG_BASE_DIR));
        assert_eq!(config.container, DEFAULT_LOG_CONTAINER);
        assert_eq!(config.segment_size, DEFAULT_SEGMENT_SIZE);
        assert_eq!(
            config.datastore_dir(),
            PathBuf::from("/var/log/trove/datastore")
        );
    }

    #[test]
    fn test_config_parse_yaml() {
        let config_content = r#"
manager: postgresql
container: pg_logs
logs:
  - name: general
    type: USER
    owner: postgres
    restart_required: true
    exposed: false
"#;
        let mut file = NamedTempFile::with_suffix(".yml").unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = AgentConfig::load(file.path()).unwrap();
        assert_eq!(config.manager, "postgresql");
        assert_eq!(config.container, "pg_logs");
        let general = config.log("general").unwrap();
        assert!(general.restart_required);
        assert!(!general.exposed);
    }

    #[test]
    fn test_config_parse_json() {
        let config_content = r#"
{
    "manager": "mongodb",
    "segment_size": 1024,
    "logs": [
        { "name": "general", "type": "user", "owner": "mongodb", "enabled": true }
    ]
}
"#;
        let config = AgentConfig::parse(config_content, ConfigFormat::Json).unwrap();
        assert_eq!(config.segment_size, 1024);
        assert!(config.logs[0].enabled);
    }

    #[test]
    fn test_config_not_found() {
        let result = AgentConfig::load(Path::new("/nonexistent/agent.toml"));
        assert!(matches!(result, Err(Error::ConfigNotFound(_))));
    }

    #[test]
    fn test_config_rejects_duplicate_names() {
        let content = r#"
manager = "mysql"
[[logs]]
name = "general"
type = "user"
owner = "mysql"
[[logs]]
name = "general"
type = "user"
owner = "mysql"
"#;
        let result = AgentConfig::parse(content, ConfigFormat::Toml);
        assert!(matches!(result, Err(Error::ConfigError(msg)) if msg.contains("Duplicate")));
    }

    #[test]
    fn test_config_rejects_reserved_guest_name() {
        let content = r#"
manager = "mysql"
[[logs]]
name = "guest"
type = "sys"
owner = "mysql"
"#;
        assert!(AgentConfig::parse(content, ConfigFormat::Toml).is_err());
    }

    #[test]
    fn test_config_rejects_bad_names() {
        let content = r#"
manager = "mysql"
[[logs]]
name = "../../etc"
type = "user"
owner = "mysql"
"#;
        assert!(AgentConfig::parse(content, ConfigFormat::Toml).is_err());
    }

    #[test]
    fn test_config_rejects_relative_file() {
        let content = r#"
manager = "mysql"
[[logs]]
name = "general"
type = "user"
owner = "mysql"
file = "general.log"
"#;
        assert!(AgentConfig::parse(content, ConfigFormat::Toml).is_err());
    }
}
