//! Telldus Live cloud sync daemon.
//!
//! Polls the Telldus Live API on a fixed cadence and regenerates the local
//! tellstick.conf when the cloud device list meaningfully changed, then
//! signals telldusd to restart. Per-cycle failures are logged and the loop
//! continues; only an interrupt stops the process.

mod cloud;
mod config;
mod engine;
mod error;
mod notify;
mod oauth;

use crate::cloud::TelldusClient;
use crate::config::Config;
use crate::engine::{CycleOutcome, SyncEngine};
use crate::error::Result;
use crate::notify::TelldusdNotifier;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Sync devices from Telldus Live cloud to tellstick.conf")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/cloudsync.yml")]
    config: PathBuf,

    /// Run a single sync cycle and exit
    #[arg(long)]
    once: bool,

    /// Override the sync interval in seconds
    #[arg(long, value_name = "SECS")]
    interval: Option<u64>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match Config::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        },
    };

    let level = if args.debug {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let interval_secs = args.interval.unwrap_or(config.sync.interval_secs);
    info!("Starting Telldus Live cloud sync");
    info!("Conf path: {}", config.sync.conf_path.display());
    info!("Sync interval: {} seconds", interval_secs);

    let client = TelldusClient::new(&config.api, config.credentials.clone())?;
    let notifier = TelldusdNotifier::new(config.sync.telldusd_process.clone());
    let mut engine = SyncEngine::new(
        Box::new(client),
        Box::new(notifier),
        config.sync.conf_path.clone(),
    );

    // First tick fires immediately, so a fresh start syncs right away
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match engine.run_cycle().await {
                    Ok(CycleOutcome::Updated { device_count }) => {
                        info!("Sync cycle updated conf with {} devices", device_count);
                    },
                    Ok(CycleOutcome::Unchanged) => {},
                    Err(e) => error!("Error during sync: {}", e),
                }
                if args.once {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, exiting...");
                break;
            }
        }
    }

    info!("Cloud sync stopped");
    Ok(())
}
