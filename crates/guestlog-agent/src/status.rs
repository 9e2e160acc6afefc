//! Datastore service status polling

use async_trait::async_trait;
use guestlog_core::{Error, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::driver::run_shell;

/// Refreshes the recorded datastore service status
#[async_trait]
pub trait StatusPoller: Send + Sync {
    async fn update(&self) -> Result<()>;
}

/// Last observed state of the datastore service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Unknown,
    Running,
    Shutdown,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Unknown => "unknown",
            ServiceStatus::Running => "running",
            ServiceStatus::Shutdown => "shutdown",
        }
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Poller running a health command; exit status 0 means running.
/// Without a command the status stays unknown.
pub struct CommandStatus {
    command: Option<String>,
    current: Mutex<ServiceStatus>,
}

impl CommandStatus {
    pub fn new(command: Option<String>) -> Self {
        Self {
            command,
            current: Mutex::new(ServiceStatus::Unknown),
        }
    }

    pub fn current(&self) -> ServiceStatus {
        *self.current.lock()
    }
}

#[async_trait]
impl StatusPoller for CommandStatus {
    async fn update(&self) -> Result<()> {
        let command = match &self.command {
            Some(command) => command,
            None => {
                debug!("No status command configured");
                return Ok(());
            }
        };

        let output = run_shell(command)
            .await
            .map_err(|e| Error::StatusError(e.to_string()))?;
        let status = if output.status.success() {
            ServiceStatus::Running
        } else {
            ServiceStatus::Shutdown
        };

        let previous = std::mem::replace(&mut *self.current.lock(), status);
        if previous != status {
            info!("Datastore status changed: {} -> {}", previous, status);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_running() {
        let status = CommandStatus::new(Some("true".to_string()));
        assert_eq!(status.current(), ServiceStatus::Unknown);
        status.update().await.unwrap();
        assert_eq!(status.current(), ServiceStatus::Running);
    }

    #[tokio::test]
    async fn test_update_shutdown() {
        let status = CommandStatus::new(Some("exit 1".to_string()));
        status.update().await.unwrap();
        assert_eq!(status.current(), ServiceStatus::Shutdown);
    }

    #[tokio::test]
    async fn test_update_without_command() {
        let status = CommandStatus::new(None);
        status.update().await.unwrap();
        assert_eq!(status.current(), ServiceStatus::Unknown);
    }
}
