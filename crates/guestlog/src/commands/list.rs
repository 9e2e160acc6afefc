//! List command implementation

use anyhow::Result;
use guestlog_ipc::{IpcClient, Request, Response};

use crate::output::print_log_table;

pub async fn execute(client: &IpcClient) -> Result<()> {
    match client.send(&Request::GuestLogList).await? {
        Response::LogList { logs } => {
            print_log_table(&logs);
            Ok(())
        }
        response => Err(super::unexpected(response)),
    }
}
