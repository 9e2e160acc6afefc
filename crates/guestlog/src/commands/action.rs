//! Action command implementation

use anyhow::Result;
use guestlog_ipc::{IpcClient, Request, Response};

use crate::cli::ActionArgs;
use crate::output::print_log_detail;

pub async fn execute(client: &IpcClient, args: ActionArgs) -> Result<()> {
    let request = Request::GuestLogAction {
        name: args.name,
        enable: args.enable,
        disable: args.disable,
        publish: args.publish,
        discard: args.discard,
    };

    match client.send(&request).await? {
        Response::LogDetails { details } => {
            print_log_detail(&details);
            Ok(())
        }
        response => Err(super::unexpected(response)),
    }
}
