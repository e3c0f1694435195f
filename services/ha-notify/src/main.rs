//! HA Notify CLI
//!
//! Runs the notification relay or its inbox service, and exposes the status
//! panel's one-shot actions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ha_notify::action::Resolution;
use ha_notify::{build_relay, load_config, run_inbox, run_relay, Config};
use tracing::Level;

#[derive(Parser)]
#[command(name = "ha-notify")]
#[command(about = "Home Assistant notification relay")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config file)
    #[arg(long)]
    base_url: Option<String>,

    /// Inbox port (overrides config file)
    #[arg(long)]
    port: Option<u16>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the backend and show pending notifications as alerts
    Watch,
    /// Accept notifications on POST /notify and serve them to the relay
    Serve,
    /// Show a test alert
    Test,
    /// Ask the backend to verify its Home Assistant connection
    Check,
    /// Open the Home Assistant dashboard
    Open,
    /// Print the status panel once
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, base_url={:?}, port={:?}, command={:?}",
        args.config,
        args.base_url,
        args.port,
        args.command
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    config.resolve_environment();

    if let Some(base_url) = args.base_url {
        config.backend.base_url = base_url;
    }
    if let Some(port) = args.port {
        config.inbox.port = port;
    }

    match args.command {
        Command::Watch => {
            tracing::info!("Starting relay against {}", config.backend.base_url);
            run_relay(config).await?;
        }
        Command::Serve => {
            tracing::info!("Starting inbox on port {}", config.inbox.port);
            run_inbox(config).await?;
        }
        Command::Test => {
            build_relay(&config)?.send_test_notification()?;
        }
        Command::Check => {
            let status = build_relay(&config)?.test_connection().await;
            println!("connected: {}\n{}", status.connected, status.message);
        }
        Command::Open => {
            if let Resolution::Navigate(url) = build_relay(&config)?.open_dashboard().await {
                println!("{}", url);
            } else {
                return Err("No dashboard URL available".into());
            }
        }
        Command::Status => {
            let relay = build_relay(&config)?;
            if !relay.refresh_stats().await {
                tracing::warn!("Could not fetch stats from {}", config.backend.base_url);
            }
            println!("{}", relay.status().read().await);
        }
    }

    Ok(())
}
