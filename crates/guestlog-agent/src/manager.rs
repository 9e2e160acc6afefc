//! Guest log manager - validates and executes log actions

use guestlog_core::{AgentConfig, Error, LogDetails, LogStatus, LogType, Result};
use guestlog_fs::{current_user, FileOps, LocalFileOps, LogPathBuilder};
use guestlog_logs::{ContainerClient, DirectoryContainer, GuestLogRegistry};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::discovery::ConfigDiscovery;
use crate::driver::{AppDriver, CommandDriver};
use crate::status::{CommandStatus, StatusPoller};

/// Owns the guest log registry and the collaborators every action goes through
pub struct GuestLogManager {
    registry: GuestLogRegistry,
    paths: LogPathBuilder,
    driver: Arc<dyn AppDriver>,
    status: Arc<dyn StatusPoller>,
    container: Arc<dyn ContainerClient>,
}

impl GuestLogManager {
    pub fn new(
        registry: GuestLogRegistry,
        paths: LogPathBuilder,
        driver: Arc<dyn AppDriver>,
        status: Arc<dyn StatusPoller>,
        container: Arc<dyn ContainerClient>,
    ) -> Self {
        Self {
            registry,
            paths,
            driver,
            status,
            container,
        }
    }

    /// Wire the local filesystem, shell command collaborators and the
    /// directory container from agent configuration
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let fs: Arc<dyn FileOps> = Arc::new(LocalFileOps::new());
        let paths = LogPathBuilder::new(config.manager.clone(), Arc::clone(&fs))
            .with_base_dir(config.base_dir.clone())
            .with_datastore_dirname(config.datastore_dirname.clone());

        let guest_owner = match &config.guest_log_owner {
            Some(owner) => owner.clone(),
            None => current_user()?,
        };

        let discovery = ConfigDiscovery::new(config.clone(), paths.clone(), guest_owner);
        let registry = GuestLogRegistry::new(
            Box::new(discovery),
            fs,
            config.instance_id.clone(),
            config.manager.clone(),
        );

        let container = DirectoryContainer::new(
            config.container_root.clone(),
            config.container.clone(),
            config.segment_size,
        );

        Ok(Self::new(
            registry,
            paths,
            Arc::new(CommandDriver::from_config(config)),
            Arc::new(CommandStatus::new(config.status_command.clone())),
            Arc::new(container),
        ))
    }

    pub fn registry(&self) -> &GuestLogRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut GuestLogRegistry {
        &mut self.registry
    }

    /// Refresh the recorded datastore service status
    pub async fn update_status(&self) -> Result<()> {
        debug!("Updating datastore status");
        self.status.update().await
    }

    /// Details of every known log, sorted by name
    pub async fn guest_log_list(&mut self) -> Result<Vec<LogDetails>> {
        info!("Getting list of guest logs");
        self.registry.details()
    }

    /// Validate the request, then apply enable/disable, publish and discard
    /// in that order.
    ///
    /// All validation happens before any state changes. Collaborator failures
    /// are not rolled back.
    pub async fn guest_log_action(
        &mut self,
        name: &str,
        enable: bool,
        disable: bool,
        publish: bool,
        discard: bool,
    ) -> Result<LogDetails> {
        if enable && disable {
            return Err(Error::bad_request(format!(
                "Cannot enable and disable log '{}'",
                name
            )));
        }

        let log = self.registry.get_or_create(name)?;
        if log.log_type() == LogType::Sys {
            if enable {
                return Err(Error::bad_request(format!(
                    "Cannot enable a SYSTEM log ('{}')",
                    name
                )));
            }
            if disable {
                return Err(Error::bad_request(format!(
                    "Cannot disable a SYSTEM log ('{}')",
                    name
                )));
            }
        }
        if (publish || discard) && !log.exposed() {
            let action = if publish { "publish" } else { "discard" };
            return Err(Error::forbidden(action, name));
        }

        info!(
            "Processing guest log '{}' (enable={}, disable={}, publish={}, discard={})",
            name, enable, disable, publish, discard
        );

        // Publishing a user log turns its collection on
        let implicit_enable =
            publish && !disable && log.log_type() == LogType::User && !log.enabled();
        let enable = enable || implicit_enable;

        if enable || disable {
            self.toggle(name, enable).await?;
        }
        if publish {
            self.publish(name).await?;
        }
        if discard {
            self.discard(name).await?;
        }

        Ok(self.registry.get_or_create(name)?.details())
    }

    async fn toggle(&mut self, name: &str, enable: bool) -> Result<()> {
        let log = self.registry.get_or_create(name)?;
        let target = if enable {
            LogStatus::Enabled
        } else {
            LogStatus::Disabled
        };

        if log.enabled() == enable {
            log.set_status(target);
            return Ok(());
        }

        debug!(
            "Asking driver to {} log '{}'",
            if enable { "enable" } else { "disable" },
            name
        );
        let restart_required = self.driver.guest_log_enable(name, enable, !enable).await?;
        log.set_enabled(enable);
        if restart_required {
            info!("Log '{}' takes effect after a datastore restart", name);
            log.set_status(LogStatus::RestartRequired);
        } else {
            log.set_status(target);
        }
        Ok(())
    }

    async fn publish(&mut self, name: &str) -> Result<()> {
        let fs = Arc::clone(self.registry.fs());
        let log = self.registry.refresh(name)?;

        if !fs.exists(log.file())? {
            return Err(Error::LogFileMissing(log.file().to_path_buf()));
        }

        if log.rotation_pending() {
            info!("Log file rotation detected for '{}', discarding old log", name);
            self.container.delete_components(log).await?;
            log.clear_rotation();
        }

        let container = self.container.container_name().to_string();
        let outcome = self.container.publish(log).await;
        match outcome {
            Ok(sent) => {
                log.record_published(sent, &container);
                info!("Published log '{}' ({} bytes pending)", name, log.pending());
                Ok(())
            }
            Err(Error::PartialPublish { log: log_name, sent, reason }) => {
                log.record_published(sent, &container);
                Err(Error::PartialPublish {
                    log: log_name,
                    sent,
                    reason,
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn discard(&mut self, name: &str) -> Result<()> {
        let log = self.registry.get_or_create(name)?;
        self.container.delete_components(log).await?;
        log.reset();
        info!("Discarded published components of log '{}'", name);
        Ok(())
    }

    /// Path of a datastore log file, creating directories and the file
    pub fn build_log_file_name(
        &self,
        log_name: &str,
        owner: &str,
        datastore_dir: Option<&Path>,
    ) -> Result<PathBuf> {
        self.paths.build_log_file_name(log_name, owner, datastore_dir)
    }

    pub fn validate_log_file(&self, file: &Path, owner: &str) -> Result<PathBuf> {
        self.paths.validate_log_file(file, owner)
    }
}
