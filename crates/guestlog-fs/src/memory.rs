//! In-memory FileOps that records every call

use guestlog_core::{Error, Result};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::FileOps;

/// Operation recorded by [`MemoryFileOps`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsOp {
    Exists,
    CreateDirectory,
    WriteFile,
    Chown,
    Chmod,
    FileSize,
}

#[derive(Debug, Default)]
struct MemoryFile {
    contents: Vec<u8>,
    owner: Option<String>,
    mode: Option<u32>,
}

#[derive(Debug, Default)]
struct State {
    files: HashMap<PathBuf, MemoryFile>,
    dirs: HashSet<PathBuf>,
    calls: HashMap<FsOp, usize>,
}

/// Filesystem kept in memory, used by tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryFileOps {
    state: Mutex<State>,
    /// Refuse to write files whose parent directory was never created
    strict_parents: bool,
    fail_size: bool,
}

impl MemoryFileOps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes fail unless the parent directory was created first
    pub fn with_strict_parents(mut self) -> Self {
        self.strict_parents = true;
        self
    }

    /// `file_size` always fails, simulating an unreadable file
    pub fn failing_size(mut self) -> Self {
        self.fail_size = true;
        self
    }

    /// Number of times an operation was called
    pub fn calls(&self, op: FsOp) -> usize {
        self.state.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Forget recorded calls, keeping files and directories
    pub fn reset_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Create or replace a file without recording a call
    pub fn put_file(&self, path: impl Into<PathBuf>, contents: &[u8]) {
        let mut state = self.state.lock();
        let file = state.files.entry(path.into()).or_default();
        file.contents = contents.to_vec();
    }

    /// Append to a file without recording a call
    pub fn append(&self, path: impl Into<PathBuf>, contents: &[u8]) {
        let mut state = self.state.lock();
        let file = state.files.entry(path.into()).or_default();
        file.contents.extend_from_slice(contents);
    }

    pub fn remove_file(&self, path: &Path) {
        self.state.lock().files.remove(path);
    }

    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.state.lock().files.get(path).map(|f| f.contents.clone())
    }

    pub fn owner(&self, path: &Path) -> Option<String> {
        self.state.lock().files.get(path).and_then(|f| f.owner.clone())
    }

    pub fn mode(&self, path: &Path) -> Option<u32> {
        self.state.lock().files.get(path).and_then(|f| f.mode)
    }

    pub fn has_dir(&self, path: &Path) -> bool {
        self.state.lock().dirs.contains(path)
    }

    fn record(state: &mut State, op: FsOp) {
        *state.calls.entry(op).or_insert(0) += 1;
    }
}

fn not_found(path: &Path) -> Error {
    Error::IoError(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("No such file or directory: {}", path.display()),
    ))
}

impl FileOps for MemoryFileOps {
    fn exists(&self, path: &Path) -> Result<bool> {
        let mut state = self.state.lock();
        Self::record(&mut state, FsOp::Exists);
        Ok(state.files.contains_key(path) || state.dirs.contains(path))
    }

    fn create_directory(&self, path: &Path, _owner: &str) -> Result<()> {
        let mut state = self.state.lock();
        Self::record(&mut state, FsOp::CreateDirectory);
        for ancestor in path.ancestors() {
            state.dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        Self::record(&mut state, FsOp::WriteFile);
        if self.strict_parents {
            let parent_exists = path.parent().map(|p| state.dirs.contains(p)).unwrap_or(false);
            if !parent_exists {
                return Err(not_found(path));
            }
        }
        let file = state.files.entry(path.to_path_buf()).or_default();
        file.contents = contents.to_vec();
        Ok(())
    }

    fn chown(&self, path: &Path, owner: &str) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        Self::record(state, FsOp::Chown);
        if let Some(file) = state.files.get_mut(path) {
            file.owner = Some(owner.to_string());
            Ok(())
        } else if state.dirs.contains(path) {
            Ok(())
        } else {
            Err(not_found(path))
        }
    }

    fn chmod(&self, path: &Path, mode: u32) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        Self::record(state, FsOp::Chmod);
        if let Some(file) = state.files.get_mut(path) {
            file.mode = Some(mode);
            Ok(())
        } else if state.dirs.contains(path) {
            Ok(())
        } else {
            Err(not_found(path))
        }
    }

    fn file_size(&self, path: &Path) -> Result<Option<u64>> {
        let mut state = self.state.lock();
        Self::record(&mut state, FsOp::FileSize);
        if self.fail_size {
            return Err(Error::IoError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("Permission denied: {}", path.display()),
            )));
        }
        Ok(state.files.get(path).map(|f| f.contents.len() as u64))
    }
}
