use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use opentelemetry::KeyValue;
use tokio::time::sleep;
use tracing::info;

use arpvakt_config::ArpvaktConfig;
use arpvakt_core::types::{SecurityReport, ARP_SPOOFING};
use arpvakt_engine::build_runtime;
use arpvakt_storage::{MemoryStore, ReportStore, SettingsStore};
use arpvakt_telemetry::{EventLogger, MetricsRecorder};

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the supervisor and notification pipeline until interrupted
    Run(RunArgs),
    /// Drive a scripted toggle/report scenario through the in-memory store
    Simulate(SimulateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Enable the detector toggle at startup
    #[arg(long, default_value_t = false)]
    pub enable: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Number of enable/disable toggle pairs to drive
    #[arg(long, default_value_t = 2)]
    pub toggles: usize,
    /// Number of ARP spoofing reports to insert
    #[arg(long, default_value_t = 1)]
    pub reports: usize,
    /// Milliseconds between scripted events
    #[arg(long, default_value_t = 100)]
    pub pace_ms: u64,
}

pub async fn run_command(cli: Cli) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match cli.command {
        Commands::Run(args) => run_live_mode(args).await,
        Commands::Simulate(args) => run_simulation_mode(args).await,
    }
}

/// Live supervision: the engine reacts to store writes until Ctrl-C, then
/// the toggle is cleared so the detector is stopped through the normal
/// reconcile path before the feeds drain.
async fn run_live_mode(args: RunArgs) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = ArpvaktConfig::load()?;
    let metrics = Arc::new(MetricsRecorder::new());
    let store = Arc::new(MemoryStore::new(config.feeds.capacity));
    let runtime = build_runtime(&config, store.clone(), metrics.clone())?;

    if args.enable {
        store.set_enabled(true).await?;
    }

    let run_handle = tokio::spawn(runtime.clone().run());

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    store.set_enabled(false).await?;
    runtime.close();
    run_handle.await??;

    println!("{}", metrics.gather_metrics()?);
    Ok(())
}

/// Scripted scenario: toggle pairs and report insertions at a fixed pace,
/// then drain and summarize.
async fn run_simulation_mode(
    args: SimulateArgs,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = ArpvaktConfig::load()?;
    let metrics = Arc::new(MetricsRecorder::new());
    let store = Arc::new(MemoryStore::new(config.feeds.capacity));
    store.add_user("admin@example.com", true);
    store.add_user("auditor@example.com", true);
    store.add_user("quiet@example.com", false);

    let runtime = build_runtime(&config, store.clone(), metrics.clone())?;
    let run_handle = tokio::spawn(runtime.clone().run());
    let pace = Duration::from_millis(args.pace_ms);

    for _ in 0..args.toggles {
        store.set_enabled(true).await?;
        sleep(pace).await;
        store.set_enabled(false).await?;
        sleep(pace).await;
    }

    for i in 0..args.reports {
        store.insert(sample_report(i)).await?;
        sleep(pace).await;
    }

    runtime.close();
    run_handle.await??;

    EventLogger::log_event(
        "simulation_complete",
        vec![
            KeyValue::new("toggles", args.toggles.to_string()),
            KeyValue::new("reports", args.reports.to_string()),
        ],
    )
    .await;

    println!("{}", metrics.gather_metrics()?);
    Ok(())
}

fn sample_report(index: usize) -> SecurityReport {
    SecurityReport {
        kind: ARP_SPOOFING.into(),
        source_ip: format!("192.168.1.{}", 100 + index),
        mac_address: "aa:bb:cc:dd:ee:01".into(),
        description: "[Expected MAC] aa:bb:cc:dd:ee:01  |  [Spoofed MAC] aa:bb:cc:dd:ee:02".into(),
        detected_by: "ARP Spoof Detector".into(),
        recommendation: "Disconnect the device and verify the gateway MAC".into(),
        timestamp: Utc::now(),
    }
}
