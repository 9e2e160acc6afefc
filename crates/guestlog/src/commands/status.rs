//! Status command implementation

use anyhow::Result;
use guestlog_ipc::{IpcClient, Request, Response};

use crate::output::print_success;

pub async fn execute(client: &IpcClient) -> Result<()> {
    match client.send(&Request::UpdateStatus).await? {
        Response::Ok { message } => {
            print_success(&message);
            Ok(())
        }
        response => Err(super::unexpected(response)),
    }
}
