//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "guestlog")]
#[command(version, about = "Manage datastore guest logs through the guest agent")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output in JSON format instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Agent socket path
    #[arg(long, env = "GUESTLOG_SOCKET", global = true)]
    pub socket: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check daemon health
    Ping,

    /// Refresh the datastore service status
    Status,

    /// Show every guest log
    List,

    /// Enable, disable, publish or discard a guest log
    Action(ActionArgs),

    /// Build a datastore log file path, creating it if needed
    BuildPath {
        /// Log name
        log_name: String,

        /// User owning the directories and the file
        #[arg(long)]
        owner: String,

        /// Directory used instead of the default datastore log directory
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Make sure a log file exists with the right owner and mode
    Validate {
        /// Absolute path of the log file
        file: PathBuf,

        /// User owning the file
        #[arg(long)]
        owner: String,
    },
}

#[derive(Args)]
pub struct ActionArgs {
    /// Log name
    pub name: String,

    /// Turn collection on (USER logs only)
    #[arg(long)]
    pub enable: bool,

    /// Turn collection off (USER logs only)
    #[arg(long)]
    pub disable: bool,

    /// Publish pending bytes to the log container
    #[arg(long)]
    pub publish: bool,

    /// Delete published components
    #[arg(long)]
    pub discard: bool,
}
