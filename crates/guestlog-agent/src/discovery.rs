//! Log discovery backed by the agent configuration

use guestlog_core::{constants, AgentConfig, LogSpec, LogType, Result};
use guestlog_fs::LogPathBuilder;
use guestlog_logs::Discovery;

/// Discovers the agent's own `guest` log plus every configured datastore log.
///
/// Discovering a log establishes its file (directories, ownership, mode).
pub struct ConfigDiscovery {
    config: AgentConfig,
    paths: LogPathBuilder,
    guest_owner: String,
}

impl ConfigDiscovery {
    pub fn new(config: AgentConfig, paths: LogPathBuilder, guest_owner: impl Into<String>) -> Self {
        Self {
            config,
            paths,
            guest_owner: guest_owner.into(),
        }
    }
}

impl Discovery for ConfigDiscovery {
    fn discover(&self, name: &str) -> Result<Option<LogSpec>> {
        if name == constants::GUEST_LOG_NAME {
            let file = self
                .paths
                .build_log_file_name(name, &self.guest_owner, None)?;
            return Ok(Some(LogSpec::new(
                name,
                LogType::Sys,
                file,
                self.guest_owner.clone(),
            )));
        }

        let log = match self.config.log(name) {
            Some(log) => log,
            None => return Ok(None),
        };

        let file = match &log.file {
            Some(file) => self.paths.validate_log_file(file, &log.owner)?,
            None => self.paths.build_log_file_name(
                &log.name,
                &log.owner,
                log.datastore_dir.as_deref(),
            )?,
        };

        Ok(Some(
            LogSpec::new(log.name.clone(), log.log_type, file, log.owner.clone())
                .with_exposed(log.exposed)
                .with_enabled(log.enabled),
        ))
    }

    fn log_names(&self) -> Vec<String> {
        std::iter::once(constants::GUEST_LOG_NAME.to_string())
            .chain(self.config.logs.iter().map(|l| l.name.clone()))
            .collect()
    }
}
