//! Ping command implementation

use anyhow::{bail, Result};
use guestlog_ipc::{IpcClient, Request, Response};

use crate::output::{print_error, print_success};

pub async fn execute(client: &IpcClient) -> Result<()> {
    match client.send(&Request::Ping).await {
        Ok(Response::Pong) => {
            print_success("Daemon is alive");
            Ok(())
        }
        Ok(response) => Err(super::unexpected(response)),
        Err(e) => {
            print_error(&format!("Daemon is not running: {}", e));
            bail!("Daemon not running")
        }
    }
}
