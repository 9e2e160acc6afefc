//! Datastore driver toggling log collection

use async_trait::async_trait;
use guestlog_core::{AgentConfig, Error, Result};
use std::collections::HashMap;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, warn};

/// Turns datastore log collection on or off
#[async_trait]
pub trait AppDriver: Send + Sync {
    /// Apply the change and report whether the datastore must restart
    /// before it takes effect
    async fn guest_log_enable(&self, log_name: &str, enable: bool, disable: bool) -> Result<bool>;
}

/// Shell commands configured for one log
#[derive(Debug, Clone, Default)]
pub struct LogCommands {
    pub enable_command: Option<String>,
    pub disable_command: Option<String>,
    pub restart_required: bool,
}

/// Driver that runs configured shell commands through `sh -c`
#[derive(Debug, Default)]
pub struct CommandDriver {
    logs: HashMap<String, LogCommands>,
}

impl CommandDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        let logs = config
            .logs
            .iter()
            .map(|log| {
                (
                    log.name.clone(),
                    LogCommands {
                        enable_command: log.enable_command.clone(),
                        disable_command: log.disable_command.clone(),
                        restart_required: log.restart_required,
                    },
                )
            })
            .collect();
        Self { logs }
    }

    pub fn with_log(mut self, name: impl Into<String>, commands: LogCommands) -> Self {
        self.logs.insert(name.into(), commands);
        self
    }
}

/// Run `command` with `sh -c` and capture its output
pub(crate) async fn run_shell(command: &str) -> Result<std::process::Output> {
    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| Error::driver(format!("Failed to run '{}': {}", command, e)))?;
    Ok(output)
}

#[async_trait]
impl AppDriver for CommandDriver {
    async fn guest_log_enable(&self, log_name: &str, enable: bool, disable: bool) -> Result<bool> {
        let commands = self.logs.get(log_name).ok_or_else(|| {
            Error::driver(format!("Log '{}' has no driver configuration", log_name))
        })?;

        if enable == disable {
            return Err(Error::bad_request(format!(
                "Exactly one of enable or disable is required for log '{}'",
                log_name
            )));
        }
        let (action, command) = if enable {
            ("enable", &commands.enable_command)
        } else {
            ("disable", &commands.disable_command)
        };

        let command = match command {
            Some(command) => command,
            None => {
                return Err(Error::driver(format!(
                    "No {} command configured for log '{}'",
                    action, log_name
                )))
            }
        };

        info!("Running {} command for log '{}'", action, log_name);
        let output = run_shell(command).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                "{} command for log '{}' failed: {}",
                action,
                log_name,
                stderr.trim()
            );
            return Err(Error::driver(format!(
                "Failed to {} log '{}': {}",
                action,
                log_name,
                stderr.trim()
            )));
        }

        Ok(commands.restart_required)
    }
}
