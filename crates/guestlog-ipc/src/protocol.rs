//! IPC Protocol - Request/Response types

use guestlog_core::{Error, ErrorKind, LogDetails};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// IPC Request from CLI to daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Check if daemon is alive
    Ping,

    /// Refresh the datastore service status
    UpdateStatus,

    /// Details of every guest log
    GuestLogList,

    /// Enable, disable, publish or discard a guest log
    GuestLogAction {
        name: String,
        #[serde(default)]
        enable: bool,
        #[serde(default)]
        disable: bool,
        #[serde(default)]
        publish: bool,
        #[serde(default)]
        discard: bool,
    },

    /// Build (and create) a datastore log file path
    BuildLogFileName {
        log_name: String,
        owner: String,
        datastore_dir: Option<PathBuf>,
    },

    /// Make sure a log file exists with the right ownership and mode
    ValidateLogFile { file_name: PathBuf, owner: String },
}

/// IPC Response from daemon to CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Pong,

    /// Success with message
    Ok { message: String },

    /// Error with its category and message
    Error { kind: ErrorKind, message: String },

    LogList { logs: Vec<LogDetails> },

    LogDetails { details: LogDetails },

    LogFile { path: PathBuf },
}

impl Response {
    pub fn ok<S: Into<String>>(message: S) -> Self {
        Response::Ok {
            message: message.into(),
        }
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Response::Error {
            kind,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Response::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl From<&Error> for Response {
    fn from(err: &Error) -> Self {
        Response::error(err.kind(), err.to_string())
    }
}
