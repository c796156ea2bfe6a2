//! Watch supervision
//!
//! `HubWatcher` owns the reconnect loop: one session at a time against the
//! configured address, redialing immediately after clean closures and
//! stopping for good once a transport error has occurred.

use anyhow::Result;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::display::PanelSink;
use crate::watch::session;
use crate::watch::state::{SessionEnd, WatchInfo, WatchState};

/// Dashboard client supervising one hub stream connection
pub struct HubWatcher {
    config: Arc<Config>,
    panels: Arc<dyn PanelSink>,
    state: Arc<RwLock<WatchState>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl HubWatcher {
    /// Create a new watcher writing into the given panel sink
    pub fn new(config: Arc<Config>, panels: Arc<dyn PanelSink>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            panels,
            state: Arc::new(RwLock::new(WatchState::new())),
            shutdown_tx,
        }
    }

    /// Test connection to the hub stream
    pub async fn test_connection(config: Arc<Config>) -> Result<()> {
        info!(url = %config.server.url, "Connecting to hub stream");

        let mut ws = session::dial(&config.server).await?;
        let _ = ws.close(None).await;

        Ok(())
    }

    /// Run sessions until a transport fault or shutdown
    ///
    /// A fault is not an error return: the watcher just stops redialing.
    /// The outcome stays visible through `info()` and `is_faulted()`.
    pub async fn run(&self) -> Result<()> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let end = loop {
            let end = session::run_session(
                &self.config.server,
                self.panels.as_ref(),
                &self.state,
                &mut shutdown_rx,
            )
            .await;

            match end {
                SessionEnd::Closed => debug!("Reconnecting to hub stream"),
                SessionEnd::Faulted | SessionEnd::Shutdown => break end,
            }
        };

        self.state.write().set_stopped();

        match end {
            SessionEnd::Faulted => warn!("Watcher stopped after transport error"),
            _ => info!("Watcher stopped"),
        }

        Ok(())
    }

    /// Request shutdown; the active session closes its socket first
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Snapshot of watcher state
    pub fn info(&self) -> WatchInfo {
        self.state.read().to_info()
    }

    /// Whether a transport error has permanently stopped redialing
    pub fn is_faulted(&self) -> bool {
        self.state.read().faulted
    }

    /// Whether the one-shot probe update has been sent
    pub fn probe_sent(&self) -> bool {
        self.state.read().probes_sent > 0
    }
}
