//! Hubwatch - Entry Point
//!
//! CLI application for running the dashboard client.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{debug, error, info};

use hubwatch::{Config, HubWatcher, PanelBoard, VERSION};

/// Hubwatch - WebSocket dashboard client
#[derive(Parser)]
#[command(name = "hubwatch")]
#[command(version = VERSION)]
#[command(about = "WebSocket dashboard client for realtime hub value streams")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the dashboard client
    Run {
        /// Path to configuration file
        #[arg(short, long, default_value = "hubwatch.toml")]
        config: PathBuf,
    },
    /// Test connection to the hub stream
    TestConnection {
        /// Path to configuration file
        #[arg(short, long, default_value = "hubwatch.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => run_client(config).await,
        Commands::TestConnection { config } => test_connection(config).await,
    }
}

async fn run_client(config_path: PathBuf) -> Result<()> {
    // Load configuration
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Initialize tracing
    init_tracing(&config.logging)?;

    info!(
        version = VERSION,
        config_path = ?config_path,
        "Starting Hubwatch"
    );

    let config = Arc::new(config);

    // Register display panels from config
    let panels = Arc::new(PanelBoard::with_panels(&config.display.panels));

    let watcher = Arc::new(HubWatcher::new(config.clone(), panels.clone()));

    info!(
        url = %config.server.url,
        panels = config.display.panels.len(),
        "Client started"
    );

    // Stop the watcher on ctrl-c / SIGTERM; the active session closes its
    // socket before run() returns.
    {
        let watcher = watcher.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            info!("Shutdown signal received, stopping watcher");
            watcher.shutdown();
        });
    }

    if let Err(e) = watcher.run().await {
        error!(error = %e, "Client error");
        return Err(e);
    }

    let summary = watcher.info();
    info!(
        sessions = summary.sessions_started,
        frames = summary.frames_received,
        displayed = summary.frames_displayed,
        rejected = summary.frames_rejected,
        probes = summary.probes_sent,
        faulted = summary.faulted,
        "Client stopped"
    );

    for (id, text) in panels.snapshot() {
        debug!(panel = %id, text = %text, "Final panel text");
    }

    Ok(())
}

async fn test_connection(config_path: PathBuf) -> Result<()> {
    // Load configuration
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Initialize simple tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!(
        url = %config.server.url,
        "Testing connection to hub stream"
    );

    let config = Arc::new(config);

    // Try to establish a connection
    match HubWatcher::test_connection(config).await {
        Ok(()) => {
            info!("Connection test successful!");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Connection test failed");
            Err(e)
        }
    }
}

fn init_tracing(logging_config: &hubwatch::config::LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging_config.level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if logging_config.format == "json" {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber.with(fmt::layer()).init();
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
