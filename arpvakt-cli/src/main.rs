//! ## arpvakt-cli
//! **Operational entrypoint for the arpvakt monitoring service**
//!
//! `run` supervises the detector and notification pipeline until
//! interrupted; `simulate` drives a scripted toggle/report scenario
//! through the in-memory store for demos and smoke checks.

use clap::Parser;

use arpvakt_telemetry::EventLogger;

mod commands;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    EventLogger::init();
    let cli = Cli::parse();
    commands::run_command(cli).await
}
