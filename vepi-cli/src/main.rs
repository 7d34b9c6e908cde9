//! Vena ETL CLI
//!
//! Command-line interface for loading data through Vena ETL templates and
//! reading model data back.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::ConnectionArgs;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "vepi")]
#[command(about = "Vena ETL pipeline CLI", long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vepi_client=info,vepi_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let client = cli.connection.connect()?;

    // Ctrl-C abandons any wait in progress; the remote job keeps running
    let cancel = client.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, no longer waiting for the job");
            cancel.cancel();
        }
    });

    handle_command(cli.command, &client).await
}
