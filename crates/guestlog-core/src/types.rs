//! Core types for the guest log agent

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Regex pattern for valid log names: only alphanumeric, underscore, and hyphen
static LOG_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("Invalid log name regex"));

/// Validate a log name; log names end up in file and object names
pub fn validate_log_name(name: &str) -> bool {
    !name.is_empty() && LOG_NAME_REGEX.is_match(name)
}

/// Kind of log stream
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LogType {
    /// Always collected, managed implicitly by the agent
    #[serde(rename = "SYS", alias = "sys", alias = "system")]
    Sys,
    /// Collection can be toggled by the caller
    #[serde(rename = "USER", alias = "user")]
    User,
}

impl LogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Sys => "SYS",
            LogType::User => "USER",
        }
    }
}

impl FromStr for LogType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sys" | "system" => Ok(LogType::Sys),
            "user" => Ok(LogType::User),
            _ => Err(Error::ConfigError(format!("Invalid log type: {}", s))),
        }
    }
}

impl std::fmt::Display for LogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a guest log
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogStatus {
    Disabled,
    Enabled,
    #[serde(rename = "Restart_Required")]
    RestartRequired,
    #[serde(rename = "Restart_Completed")]
    RestartCompleted,
    Published,
    Partial,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Disabled => "Disabled",
            LogStatus::Enabled => "Enabled",
            LogStatus::RestartRequired => "Restart_Required",
            LogStatus::RestartCompleted => "Restart_Completed",
            LogStatus::Published => "Published",
            LogStatus::Partial => "Partial",
        }
    }

    /// Status that results from requesting `requested` while in `self`.
    ///
    /// A pending restart swallows a disable and turns an enable into
    /// `Restart_Completed`; every other request is taken literally.
    pub fn next(self, requested: LogStatus) -> LogStatus {
        match (self, requested) {
            (LogStatus::RestartRequired, LogStatus::Enabled) => LogStatus::RestartCompleted,
            (LogStatus::RestartRequired, LogStatus::Disabled) => LogStatus::RestartRequired,
            (_, requested) => requested,
        }
    }
}

impl std::fmt::Display for LogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LogStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Disabled" => Ok(LogStatus::Disabled),
            "Enabled" => Ok(LogStatus::Enabled),
            "Restart_Required" => Ok(LogStatus::RestartRequired),
            "Restart_Completed" => Ok(LogStatus::RestartCompleted),
            "Published" => Ok(LogStatus::Published),
            "Partial" => Ok(LogStatus::Partial),
            _ => Err(Error::ConfigError(format!("Invalid log status: {}", s))),
        }
    }
}

/// Discovery metadata describing one log stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogSpec {
    pub name: String,
    pub log_type: LogType,
    /// Absolute path of the physical log file
    pub file: PathBuf,
    /// System user owning the file
    pub owner: String,
    /// Whether callers may publish or discard this log
    #[serde(default = "default_true")]
    pub exposed: bool,
    /// Initial collection flag (USER logs only)
    #[serde(default)]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl LogSpec {
    pub fn new(name: impl Into<String>, log_type: LogType, file: PathBuf, owner: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            log_type,
            file,
            owner: owner.into(),
            exposed: true,
            enabled: false,
        }
    }

    pub fn with_exposed(mut self, exposed: bool) -> Self {
        self.exposed = exposed;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Detail record reported for a single guest log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogDetails {
    pub name: String,
    #[serde(rename = "type")]
    pub log_type: LogType,
    pub status: LogStatus,
    pub prefix: String,
    pub container: String,
    pub published: u64,
    pub pending: u64,
    pub metafile: String,
}
