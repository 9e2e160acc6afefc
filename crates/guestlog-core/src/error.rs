//! Error types for the guest log agent

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Guest log agent error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    BadRequest(String),

    #[error("Log not found: {0}")]
    LogNotFound(String),

    #[error("Cannot {action} log '{log}': access forbidden")]
    LogAccessForbidden { action: String, log: String },

    #[error("Cannot publish log file '{0}' as it does not exist")]
    LogFileMissing(PathBuf),

    #[error("Partial publish of log '{log}' ({sent} bytes acknowledged): {reason}")]
    PartialPublish {
        log: String,
        sent: u64,
        reason: String,
    },

    #[error("Container error: {0}")]
    ContainerError(String),

    #[error("Driver error: {0}")]
    DriverError(String),

    #[error("Status update failed: {0}")]
    StatusError(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Daemon not running")]
    DaemonNotRunning,

    #[error("IPC error: {0}")]
    IpcError(String),

    #[error("IPC connection failed: {0}")]
    IpcConnectionFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Result type alias for the guest log agent
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse error category reported to callers across the IPC boundary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Forbidden,
    CollaboratorFailure,
    Config,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::CollaboratorFailure => "collaborator_failure",
            ErrorKind::Config => "config",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Error {
    pub fn bad_request<S: Into<String>>(msg: S) -> Self {
        Error::BadRequest(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::ConfigError(msg.into())
    }

    pub fn ipc<S: Into<String>>(msg: S) -> Self {
        Error::IpcError(msg.into())
    }

    pub fn container<S: Into<String>>(msg: S) -> Self {
        Error::ContainerError(msg.into())
    }

    pub fn driver<S: Into<String>>(msg: S) -> Self {
        Error::DriverError(msg.into())
    }

    pub fn forbidden(action: &str, log: &str) -> Self {
        Error::LogAccessForbidden {
            action: action.to_string(),
            log: log.to_string(),
        }
    }

    /// Category used when reporting this error to a caller
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::BadRequest(_) => ErrorKind::BadRequest,
            Error::LogNotFound(_) => ErrorKind::NotFound,
            Error::LogAccessForbidden { .. } => ErrorKind::Forbidden,
            Error::ConfigError(_)
            | Error::ConfigNotFound(_)
            | Error::TomlError(_)
            | Error::YamlError(_) => ErrorKind::Config,
            _ => ErrorKind::CollaboratorFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::LogNotFound("general".to_string());
        assert_eq!(err.to_string(), "Log not found: general");

        let err = Error::forbidden("publish", "slow_query");
        assert_eq!(
            err.to_string(),
            "Cannot publish log 'slow_query': access forbidden"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::IoError(_)));
        assert_eq!(err.kind(), ErrorKind::CollaboratorFailure);
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(Error::bad_request("nope").kind(), ErrorKind::BadRequest);
        assert_eq!(Error::LogNotFound("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(Error::forbidden("discard", "x").kind(), ErrorKind::Forbidden);
        assert_eq!(Error::config("bad").kind(), ErrorKind::Config);
        assert_eq!(
            Error::PartialPublish {
                log: "x".into(),
                sent: 10,
                reason: "disk full".into()
            }
            .kind(),
            ErrorKind::CollaboratorFailure
        );
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
    }
}
