//! Guestlog CLI - manage datastore guest logs

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    output::set_json_mode(cli.json);

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("guestlog={},guestlog_ipc={}", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let client = get_client(cli.socket);

    let result = match cli.command {
        Commands::Ping => ping::execute(&client).await,
        Commands::Status => status::execute(&client).await,
        Commands::List => list::execute(&client).await,
        Commands::Action(args) => action::execute(&client, args).await,
        Commands::BuildPath {
            log_name,
            owner,
            dir,
        } => build_path::execute(&client, log_name, owner, dir).await,
        Commands::Validate { file, owner } => validate::execute(&client, file, owner).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
