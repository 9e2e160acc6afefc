//! A single named guest log and its status

use guestlog_core::{constants, LogDetails, LogSpec, LogStatus, LogType, Result};
use guestlog_fs::FileOps;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One log stream produced by the datastore or the agent itself
#[derive(Debug, Clone)]
pub struct GuestLog {
    name: String,
    log_type: LogType,
    file: PathBuf,
    owner: String,
    exposed: bool,
    enabled: bool,
    status: LogStatus,
    size: u64,
    published_size: u64,
    container: Option<String>,
    prefix: String,
    rotation_pending: bool,
    refresh_enabled: bool,
}

impl GuestLog {
    /// Create a log from discovery metadata; `prefix` namespaces its objects
    pub fn new(spec: LogSpec, prefix: impl Into<String>) -> Self {
        let enabled = spec.log_type == LogType::Sys || spec.enabled;
        let status = if enabled {
            LogStatus::Enabled
        } else {
            LogStatus::Disabled
        };

        Self {
            name: spec.name,
            log_type: spec.log_type,
            file: spec.file,
            owner: spec.owner,
            exposed: spec.exposed,
            enabled,
            status,
            size: 0,
            published_size: 0,
            container: None,
            prefix: prefix.into(),
            rotation_pending: false,
            refresh_enabled: true,
        }
    }

    /// Object prefix for a log, `<instance_id>/<manager>-<name>`
    pub fn object_prefix(instance_id: &str, manager: &str, name: &str) -> String {
        format!("{}/{}-{}", instance_id, manager, name)
    }

    /// Stop re-reading the physical file; counters are then maintained by
    /// the owner through [`GuestLog::update_counters`]
    pub fn without_refresh(mut self) -> Self {
        self.refresh_enabled = false;
        self
    }

    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn log_type(&self) -> LogType {
        self.log_type
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn exposed(&self) -> bool {
        self.exposed
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn status(&self) -> LogStatus {
        self.status
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn published_size(&self) -> u64 {
        self.published_size
    }

    /// Bytes written but not yet published
    pub fn pending(&self) -> u64 {
        self.size.saturating_sub(self.published_size)
    }

    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn metafile(&self) -> String {
        format!("{}{}", self.prefix, constants::METAFILE_SUFFIX)
    }

    /// Whether the file was replaced since its components were last deleted
    pub fn rotation_pending(&self) -> bool {
        self.rotation_pending
    }

    /// Mark the stale pre-rotation components as deleted
    pub fn clear_rotation(&mut self) {
        self.rotation_pending = false;
    }

    pub fn refresh_enabled(&self) -> bool {
        self.refresh_enabled
    }

    /// Request a status; the transition table decides the outcome
    pub fn set_status(&mut self, requested: LogStatus) {
        let next = self.status.next(requested);
        if next != self.status {
            debug!("Log '{}' status {} -> {}", self.name, self.status, next);
        }
        self.status = next;
    }

    /// Force a status, bypassing the transition table
    pub fn force_status(&mut self, status: LogStatus) {
        self.status = status;
    }

    /// Turn collection on or off. SYS logs stay enabled.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.log_type == LogType::User {
            self.enabled = enabled;
        }
    }

    /// Status a log falls back to once its published state is cleared
    pub fn baseline_status(&self) -> LogStatus {
        if self.enabled {
            LogStatus::Enabled
        } else {
            LogStatus::Disabled
        }
    }

    /// Set counters directly; published bytes are capped at the size
    pub fn update_counters(&mut self, size: u64, published_size: u64) {
        self.size = size;
        self.published_size = published_size.min(size);
    }

    /// Re-read the physical file size and detect rotation.
    ///
    /// A file that shrank below the published size, or vanished after
    /// something was published, was rotated: its checkpoint restarts from
    /// zero and the rotation stays pending until [`GuestLog::clear_rotation`].
    pub fn refresh(&mut self, fs: &dyn FileOps) -> Result<()> {
        if !self.refresh_enabled {
            return Ok(());
        }

        let len = fs.file_size(&self.file)?;
        let current = len.unwrap_or(0);
        if self.published_size > 0 && (len.is_none() || current < self.published_size) {
            debug!(
                "Log '{}' rotated ({} bytes, {} published)",
                self.name, current, self.published_size
            );
            self.rotation_pending = true;
            self.published_size = 0;
        }
        self.size = current;
        Ok(())
    }

    /// Record bytes acknowledged by the container.
    ///
    /// Status becomes `Published` once nothing is pending, `Partial` otherwise.
    pub fn record_published(&mut self, bytes: u64, container: &str) {
        self.published_size = self.published_size.saturating_add(bytes).min(self.size);
        self.container = Some(container.to_string());
        if self.pending() == 0 {
            self.set_status(LogStatus::Published);
        } else {
            self.set_status(LogStatus::Partial);
        }
    }

    /// Clear counters after the log's components were deleted.
    ///
    /// A pending restart is kept as is instead of going through the
    /// transition table.
    pub fn reset(&mut self) {
        self.size = 0;
        self.published_size = 0;
        self.rotation_pending = false;
        if self.status != LogStatus::RestartRequired {
            self.set_status(self.baseline_status());
        }
    }

    /// Detail record for callers
    pub fn details(&self) -> LogDetails {
        LogDetails {
            name: self.name.clone(),
            log_type: self.log_type,
            status: self.status,
            prefix: self.prefix.clone(),
            container: self
                .container
                .clone()
                .unwrap_or_else(|| constants::UNASSIGNED_CONTAINER.to_string()),
            published: self.published_size,
            pending: self.pending(),
            metafile: self.metafile(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guestlog_fs::MemoryFileOps;

    fn user_log() -> GuestLog {
        GuestLog::new(
            LogSpec::new("general", LogType::User, PathBuf::from("/tmp/gen.log"), "mysql"),
            "log_prefix",
        )
    }

    fn sys_log() -> GuestLog {
        GuestLog::new(
            LogSpec::new("guest", LogType::Sys, PathBuf::from("/tmp/guest.log"), "trove"),
            "log_prefix",
        )
    }

    #[test]
    fn test_initial_status() {
        assert_eq!(user_log().status(), LogStatus::Disabled);
        assert!(!user_log().enabled());
        assert_eq!(sys_log().status(), LogStatus::Enabled);
        assert!(sys_log().enabled());

        let spec = LogSpec::new("general", LogType::User, PathBuf::from("/tmp/gen.log"), "mysql")
            .with_enabled(true);
        assert_eq!(GuestLog::new(spec, "p").status(), LogStatus::Enabled);
    }

    #[test]
    fn test_set_status_table() {
        let cases = [
            (LogStatus::Enabled, LogStatus::Disabled, LogStatus::Disabled),
            (LogStatus::RestartRequired, LogStatus::Enabled, LogStatus::RestartCompleted),
            (LogStatus::RestartRequired, LogStatus::Disabled, LogStatus::RestartRequired),
            (LogStatus::RestartRequired, LogStatus::RestartCompleted, LogStatus::RestartCompleted),
            (LogStatus::Published, LogStatus::Partial, LogStatus::Partial),
        ];
        for (orig, new, expected) in cases {
            let mut log = sys_log();
            log.force_status(orig);
            log.set_status(new);
            assert_eq!(log.status(), expected, "{} + {}", orig, new);
        }
    }

    #[test]
    fn test_sys_log_stays_enabled() {
        let mut log = sys_log();
        log.set_enabled(false);
        assert!(log.enabled());
    }

    #[test]
    fn test_details() {
        let mut log = user_log().with_container("log_container");
        log.update_counters(1024, 128);

        let details = log.details();
        assert_eq!(details.name, "general");
        assert_eq!(details.log_type, LogType::User);
        assert_eq!(details.status, LogStatus::Disabled);
        assert_eq!(details.prefix, "log_prefix");
        assert_eq!(details.container, "log_container");
        assert_eq!(details.published, 128);
        assert_eq!(details.pending, 896);
        assert_eq!(details.metafile, "log_prefix_metafile");
    }

    #[test]
    fn test_details_before_publish() {
        assert_eq!(user_log().details().container, "n/a");
    }

    #[test]
    fn test_update_counters_caps_published() {
        let mut log = user_log();
        log.update_counters(10, 50);
        assert_eq!(log.published_size(), 10);
        assert_eq!(log.pending(), 0);
    }

    #[test]
    fn test_refresh_reads_size() {
        let fs = MemoryFileOps::new();
        fs.put_file("/tmp/gen.log", b"0123456789");

        let mut log = user_log();
        log.refresh(&fs).unwrap();
        assert_eq!(log.size(), 10);
        assert!(!log.rotation_pending());
    }

    #[test]
    fn test_refresh_detects_rotation() {
        let fs = MemoryFileOps::new();
        fs.put_file("/tmp/gen.log", b"0123456789");

        let mut log = user_log();
        log.refresh(&fs).unwrap();
        log.record_published(10, "database_logs");
        assert_eq!(log.published_size(), 10);

        fs.put_file("/tmp/gen.log", b"abc");
        log.refresh(&fs).unwrap();
        assert!(log.rotation_pending());
        assert_eq!(log.size(), 3);
        assert_eq!(log.published_size(), 0);

        // Later refreshes see no shrink but the rotation stays pending
        log.refresh(&fs).unwrap();
        assert!(log.rotation_pending());

        log.clear_rotation();
        assert!(!log.rotation_pending());
    }

    #[test]
    fn test_refresh_missing_file() {
        let fs = MemoryFileOps::new();
        let mut log = user_log();
        log.update_counters(100, 50);
        log.refresh(&fs).unwrap();
        assert_eq!(log.size(), 0);
        assert_eq!(log.published_size(), 0);
        assert!(log.rotation_pending());

        fs.put_file("/tmp/gen.log", &b"0123456789".repeat(10));
        log.refresh(&fs).unwrap();
        assert_eq!(log.size(), 100);
        assert!(log.rotation_pending());
    }

    #[test]
    fn test_refresh_missing_unpublished_file() {
        let fs = MemoryFileOps::new();
        let mut log = user_log();
        log.refresh(&fs).unwrap();
        assert_eq!(log.size(), 0);
        assert!(!log.rotation_pending());
    }

    #[test]
    fn test_refresh_disabled_keeps_counters() {
        let fs = MemoryFileOps::new();
        fs.put_file("/tmp/gen.log", b"0123456789");

        let mut log = user_log().without_refresh();
        log.update_counters(1024, 128);
        log.refresh(&fs).unwrap();
        assert_eq!(log.size(), 1024);
        assert_eq!(log.published_size(), 128);
    }

    #[test]
    fn test_refresh_error_propagates() {
        let fs = MemoryFileOps::new().failing_size();
        let mut log = user_log();
        assert!(log.refresh(&fs).is_err());
    }

    #[test]
    fn test_record_published() {
        let mut log = sys_log();
        log.update_counters(1024, 128);

        log.record_published(400, "database_logs");
        assert_eq!(log.published_size(), 528);
        assert_eq!(log.status(), LogStatus::Partial);
        assert_eq!(log.container(), Some("database_logs"));

        log.record_published(10_000, "database_logs");
        assert_eq!(log.published_size(), 1024);
        assert_eq!(log.pending(), 0);
        assert_eq!(log.status(), LogStatus::Published);
    }

    #[test]
    fn test_reset_returns_to_baseline() {
        let mut log = user_log();
        log.update_counters(1024, 1024);
        log.force_status(LogStatus::Published);

        log.reset();
        assert_eq!(log.size(), 0);
        assert_eq!(log.published_size(), 0);
        assert_eq!(log.status(), LogStatus::Disabled);

        let mut log = sys_log();
        log.force_status(LogStatus::Partial);
        log.reset();
        assert_eq!(log.status(), LogStatus::Enabled);
    }

    #[test]
    fn test_reset_keeps_pending_restart() {
        let mut log = user_log();
        log.set_enabled(true);
        log.force_status(LogStatus::RestartRequired);
        log.reset();
        assert_eq!(log.status(), LogStatus::RestartRequired);
    }

    #[test]
    fn test_object_prefix() {
        assert_eq!(
            GuestLog::object_prefix("6e4f1c2a", "mysql", "general"),
            "6e4f1c2a/mysql-general"
        );
    }
}
