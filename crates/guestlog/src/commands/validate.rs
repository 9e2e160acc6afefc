//! Validate command implementation

use anyhow::{bail, Result};
use guestlog_ipc::{IpcClient, Request, Response};
use std::path::PathBuf;

use crate::output::{print_error, print_path};

pub async fn execute(client: &IpcClient, file: PathBuf, owner: String) -> Result<()> {
    if !file.is_absolute() {
        print_error("Log file must be an absolute path");
        bail!("Relative log file path: {}", file.display());
    }

    let request = Request::ValidateLogFile {
        file_name: file,
        owner,
    };

    match client.send(&request).await? {
        Response::LogFile { path } => {
            print_path(&path);
            Ok(())
        }
        response => Err(super::unexpected(response)),
    }
}
