//! FileOps backed by the local filesystem

use guestlog_core::{Error, Result};
use nix::unistd::{self, User};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::debug;

use crate::FileOps;

/// Filesystem operations on the host
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileOps;

impl LocalFileOps {
    pub fn new() -> Self {
        Self
    }
}

fn lookup_user(owner: &str) -> Result<User> {
    User::from_name(owner)
        .map_err(std::io::Error::from)?
        .ok_or_else(|| Error::UnknownUser(owner.to_string()))
}

/// Name of the user running the agent
pub fn current_user() -> Result<String> {
    let uid = unistd::getuid();
    let user = User::from_uid(uid)
        .map_err(std::io::Error::from)?
        .ok_or_else(|| Error::UnknownUser(uid.to_string()))?;
    Ok(user.name)
}

impl FileOps for LocalFileOps {
    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(path.exists())
    }

    fn create_directory(&self, path: &Path, owner: &str) -> Result<()> {
        if path.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(path)?;
        self.chown(path, owner)?;
        debug!("Created directory {}", path.display());
        Ok(())
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> Result<()> {
        fs::write(path, contents)?;
        Ok(())
    }

    fn chown(&self, path: &Path, owner: &str) -> Result<()> {
        let user = lookup_user(owner)?;
        unistd::chown(path, Some(user.uid), Some(user.gid)).map_err(std::io::Error::from)?;
        Ok(())
    }

    fn chmod(&self, path: &Path, mode: u32) -> Result<()> {
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
        Ok(())
    }

    fn file_size(&self, path: &Path) -> Result<Option<u64>> {
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => Ok(Some(meta.len())),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
