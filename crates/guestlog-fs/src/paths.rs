//! Guest log file path construction and validation

use guestlog_core::{constants, validate_log_name, Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::FileOps;

/// Builds datastore log file paths and enforces their ownership and mode
#[derive(Clone)]
pub struct LogPathBuilder {
    manager: String,
    base_dir: PathBuf,
    datastore_dirname: String,
    fs: Arc<dyn FileOps>,
}

impl LogPathBuilder {
    pub fn new(manager: impl Into<String>, fs: Arc<dyn FileOps>) -> Self {
        Self {
            manager: manager.into(),
            base_dir: PathBuf::from(constants::GUEST_LOG_BASE_DIR),
            datastore_dirname: constants::GUEST_LOG_DATASTORE_DIRNAME.to_string(),
            fs,
        }
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn with_datastore_dirname(mut self, dirname: impl Into<String>) -> Self {
        self.datastore_dirname = dirname.into();
        self
    }

    pub fn manager(&self) -> &str {
        &self.manager
    }

    /// Default datastore log directory
    pub fn datastore_dir(&self) -> PathBuf {
        self.base_dir.join(&self.datastore_dirname)
    }

    /// Build `<dir>/<manager>-<log_name>.log`, creating the directory layout
    /// and the file if needed.
    ///
    /// Without `datastore_dir` both the base directory and the datastore
    /// directory are created (owned by `owner`); with it only that directory
    /// is. Directory creation is idempotent so no existence check precedes it.
    pub fn build_log_file_name(
        &self,
        log_name: &str,
        owner: &str,
        datastore_dir: Option<&Path>,
    ) -> Result<PathBuf> {
        if !validate_log_name(log_name) {
            return Err(Error::bad_request(format!("Invalid log name '{}'", log_name)));
        }

        let dir = match datastore_dir {
            Some(dir) => dir.to_path_buf(),
            None => {
                self.fs.create_directory(&self.base_dir, owner)?;
                self.datastore_dir()
            }
        };
        self.fs.create_directory(&dir, owner)?;

        let file = dir.join(constants::log_file_name(&self.manager, log_name));
        self.validate_log_file(&file, owner)
    }

    /// Make sure `file` exists, is owned by `owner` and carries the log mode.
    ///
    /// Ownership and mode are applied even when the file already exists.
    pub fn validate_log_file(&self, file: &Path, owner: &str) -> Result<PathBuf> {
        if !file.is_absolute() {
            return Err(Error::bad_request(format!(
                "Log file must be an absolute path: {}",
                file.display()
            )));
        }

        if !self.fs.exists(file)? {
            self.fs.write_file(file, b"")?;
        }
        self.fs.chown(file, owner)?;
        self.fs.chmod(file, constants::LOG_FILE_MODE)?;
        debug!("Set log file '{}' as readable", file.display());

        Ok(file.to_path_buf())
    }
}
