//! Command implementations

pub mod action;
pub mod build_path;
pub mod list;
pub mod ping;
pub mod status;
pub mod validate;

use anyhow::{anyhow, Error};
use guestlog_core::constants;
use guestlog_ipc::{IpcClient, Response};
use std::path::PathBuf;

use crate::output::print_error;

/// IPC client for the given socket, or the default agent socket
pub fn get_client(socket: Option<PathBuf>) -> IpcClient {
    IpcClient::new(socket.unwrap_or_else(constants::socket_path))
}

/// Report a response the command did not expect and turn it into an error
pub fn unexpected(response: Response) -> Error {
    match response {
        Response::Error { kind, message } => {
            print_error(&message);
            anyhow!("{} ({})", message, kind)
        }
        _ => {
            print_error("Unexpected response from daemon");
            anyhow!("Unexpected response")
        }
    }
}
