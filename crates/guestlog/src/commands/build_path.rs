//! Build-path command implementation

use anyhow::Result;
use guestlog_ipc::{IpcClient, Request, Response};
use std::path::PathBuf;

use crate::output::print_path;

pub async fn execute(
    client: &IpcClient,
    log_name: String,
    owner: String,
    dir: Option<PathBuf>,
) -> Result<()> {
    let request = Request::BuildLogFileName {
        log_name,
        owner,
        datastore_dir: dir,
    };

    match client.send(&request).await? {
        Response::LogFile { path } => {
            print_path(&path);
            Ok(())
        }
        response => Err(super::unexpected(response)),
    }
}
