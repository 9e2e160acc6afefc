//! Guestlog FS - Filesystem primitives and log file path construction

mod local;
mod memory;
mod paths;

pub use local::{current_user, LocalFileOps};
pub use memory::{FsOp, MemoryFileOps};
pub use paths::LogPathBuilder;

use guestlog_core::Result;
use std::path::Path;

/// Low-level filesystem operations the agent depends on.
///
/// Every call that touches the host goes through this trait so ownership and
/// permission handling can be observed in tests.
pub trait FileOps: Send + Sync {
    /// Check whether a path exists
    fn exists(&self, path: &Path) -> Result<bool>;

    /// Create a directory and its parents (no error if it already exists)
    fn create_directory(&self, path: &Path, owner: &str) -> Result<()>;

    /// Write a file, replacing any previous contents
    fn write_file(&self, path: &Path, contents: &[u8]) -> Result<()>;

    /// Change user and group ownership to `owner`
    fn chown(&self, path: &Path, owner: &str) -> Result<()>;

    /// Set permission bits
    fn chmod(&self, path: &Path, mode: u32) -> Result<()>;

    /// Size of a regular file, `None` if it does not exist
    fn file_size(&self, path: &Path) -> Result<Option<u64>>;
}
