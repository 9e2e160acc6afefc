//! Registry of guest logs, populated lazily through discovery

use guestlog_core::{Error, LogDetails, LogSpec, Result};
use guestlog_fs::FileOps;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::entry::GuestLog;

/// Datastore-specific knowledge of which logs exist and where they live
pub trait Discovery: Send + Sync {
    /// Describe a log, or `None` if the name is unknown
    fn discover(&self, name: &str) -> Result<Option<LogSpec>>;

    /// Every log name this datastore knows about
    fn log_names(&self) -> Vec<String>;
}

/// Guest logs keyed by name
pub struct GuestLogRegistry {
    logs: BTreeMap<String, GuestLog>,
    discovery: Box<dyn Discovery>,
    fs: Arc<dyn FileOps>,
    instance_id: String,
    manager: String,
}

impl GuestLogRegistry {
    pub fn new(
        discovery: Box<dyn Discovery>,
        fs: Arc<dyn FileOps>,
        instance_id: impl Into<String>,
        manager: impl Into<String>,
    ) -> Self {
        Self {
            logs: BTreeMap::new(),
            discovery,
            fs,
            instance_id: instance_id.into(),
            manager: manager.into(),
        }
    }

    pub fn fs(&self) -> &Arc<dyn FileOps> {
        &self.fs
    }

    /// Cache a log directly, replacing any entry with the same name
    pub fn insert(&mut self, log: GuestLog) {
        self.logs.insert(log.name().to_string(), log);
    }

    pub fn get(&self, name: &str) -> Option<&GuestLog> {
        self.logs.get(name)
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    /// Cached log, building it through discovery on first reference
    pub fn get_or_create(&mut self, name: &str) -> Result<&mut GuestLog> {
        if !self.logs.contains_key(name) {
            let spec = self
                .discovery
                .discover(name)?
                .ok_or_else(|| Error::LogNotFound(name.to_string()))?;
            let prefix = GuestLog::object_prefix(&self.instance_id, &self.manager, &spec.name);
            debug!("Registered guest log '{}' at {}", name, spec.file.display());
            self.logs.insert(name.to_string(), GuestLog::new(spec, prefix));
        }

        self.logs
            .get_mut(name)
            .ok_or_else(|| Error::LogNotFound(name.to_string()))
    }

    /// Refresh one log's size and rotation state
    pub fn refresh(&mut self, name: &str) -> Result<&mut GuestLog> {
        let fs = Arc::clone(&self.fs);
        let log = self.get_or_create(name)?;
        log.refresh(fs.as_ref())?;
        Ok(log)
    }

    /// All logs sorted by name, each refreshed first.
    ///
    /// Every name known to discovery is registered before listing. A refresh
    /// failure aborts the listing.
    pub fn list(&mut self) -> Result<Vec<&GuestLog>> {
        for name in self.discovery.log_names() {
            self.get_or_create(&name)?;
        }

        for log in self.logs.values_mut() {
            log.refresh(self.fs.as_ref())?;
        }

        Ok(self.logs.values().collect())
    }

    /// Detail records for every log, sorted by name
    pub fn details(&mut self) -> Result<Vec<LogDetails>> {
        Ok(self.list()?.into_iter().map(GuestLog::details).collect())
    }
}
