//! Stream sessions
//!
//! One session covers one socket lifetime: dial the hub, read frames until
//! the peer closes or the transport fails, and classify how it ended. Frame
//! handling mirrors the raw frame text into the addressed panel and claims
//! the one-shot probe send.

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::display::PanelSink;
use crate::protocol;
use crate::watch::state::{SessionEnd, WatchState};

/// Socket type for a live session
pub(crate) type HubSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Dial the hub with the configured timeout
pub(crate) async fn dial(server: &ServerConfig) -> Result<HubSocket> {
    let dial_timeout = Duration::from_secs(server.connect_timeout_secs);

    let (ws, _) = timeout(dial_timeout, connect_async(server.url.as_str()))
        .await
        .context("Timed out connecting to hub stream")?
        .context("Failed to connect to hub stream")?;

    Ok(ws)
}

/// Drive one session from dial to close
///
/// A dial failure counts as a transport error: the error handler fires
/// before any close, so the session ends faulted and the watcher will not
/// redial.
pub(crate) async fn run_session(
    server: &ServerConfig,
    panels: &dyn PanelSink,
    state: &RwLock<WatchState>,
    shutdown_rx: &mut broadcast::Receiver<()>,
) -> SessionEnd {
    state.write().set_connecting();

    let mut ws = tokio::select! {
        result = dial(server) => match result {
            Ok(ws) => ws,
            Err(e) => {
                error!(error = %e, url = %server.url, "WebSocket error");
                state.write().set_faulted();
                info!("Stream closed");
                return SessionEnd::Faulted;
            }
        },
        _ = shutdown_rx.recv() => {
            debug!("Session shutting down");
            return SessionEnd::Shutdown;
        }
    };

    info!(url = %server.url, "Connected to hub stream");
    state.write().set_active();

    let end = read_frames(&mut ws, panels, state, shutdown_rx).await;

    if end == SessionEnd::Shutdown {
        let _ = ws.close(None).await;
    }

    info!("Stream closed");
    end
}

/// Read frames until the socket ends, a transport error fires, or shutdown
/// is requested
async fn read_frames(
    ws: &mut HubSocket,
    panels: &dyn PanelSink,
    state: &RwLock<WatchState>,
    shutdown_rx: &mut broadcast::Receiver<()>,
) -> SessionEnd {
    loop {
        tokio::select! {
            message = ws.next() => {
                match message {
                    Some(Ok(Message::Text(raw))) => {
                        if let Some(reply) = handle_frame(&raw, panels, state) {
                            match ws.send(Message::Text(reply)).await {
                                Ok(()) => info!("Probe update sent"),
                                // A failed send does not fault the session
                                Err(e) => warn!(error = %e, "Failed to send probe update"),
                            }
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        if let Err(e) = ws.send(Message::Pong(payload)).await {
                            warn!(error = %e, "Failed to answer ping");
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        debug!(frame = ?frame, "Close frame received");
                        return SessionEnd::Closed;
                    }
                    Some(Ok(_)) => {
                        debug!("Ignoring non-text frame");
                    }
                    Some(Err(e)) => {
                        error!(error = %e, "WebSocket error");
                        state.write().set_faulted();
                        return SessionEnd::Faulted;
                    }
                    None => return SessionEnd::Closed,
                }
            }
            _ = shutdown_rx.recv() => {
                debug!("Session shutting down");
                return SessionEnd::Shutdown;
            }
        }
    }
}

/// Process one text frame
///
/// Decodes the frame, mirrors the raw unparsed text into the addressed
/// panel, and claims the one-shot probe. Decode and panel failures are
/// logged and swallowed; they leave the probe gate untouched so a later
/// frame can still claim it. Returns the probe update when this frame
/// claimed it.
fn handle_frame(raw: &str, panels: &dyn PanelSink, state: &RwLock<WatchState>) -> Option<String> {
    debug!(payload = %raw, "Frame received");
    state.write().record_frame();

    let update = match protocol::decode_update(raw) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, "Dropping undecodable frame");
            state.write().record_rejected();
            return None;
        }
    };

    let selector = update.selector();
    debug!(selector = %selector, "Frame addressed");

    if let Err(e) = panels.set_text(&selector, raw) {
        warn!(error = %e, hub = %update.hub, "Dropping frame: panel write failed");
        state.write().record_rejected();
        return None;
    }
    state.write().record_displayed();

    if state.write().claim_probe() {
        return Some(protocol::probe_update());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayError;

    /// Sink that records writes, or rejects everything
    struct RecordingSink {
        writes: RwLock<Vec<(String, String)>>,
        reject: bool,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                writes: RwLock::new(Vec::new()),
                reject: false,
            }
        }

        fn rejecting() -> Self {
            Self {
                writes: RwLock::new(Vec::new()),
                reject: true,
            }
        }
    }

    impl PanelSink for RecordingSink {
        fn set_text(&self, selector: &str, text: &str) -> Result<(), DisplayError> {
            if self.reject {
                return Err(DisplayError::UnknownPanel(selector.to_string()));
            }
            self.writes
                .write()
                .push((selector.to_string(), text.to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_frame_mirrors_raw_text() {
        let sink = RecordingSink::new();
        let state = RwLock::new(WatchState::new());

        // Spacing must survive untouched; the panel gets the wire bytes,
        // not a re-serialization.
        let raw = r#"[ "facesensor-2" , {"a": 1} ]"#;
        let reply = handle_frame(raw, &sink, &state);

        let writes = sink.writes.read();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, "div#facesensor-2");
        assert_eq!(writes[0].1, raw);

        assert_eq!(reply.as_deref(), Some(protocol::probe_update().as_str()));
        assert_eq!(state.read().frames_displayed, 1);
        assert_eq!(state.read().probes_sent, 1);
    }

    #[test]
    fn test_probe_claimed_once() {
        let sink = RecordingSink::new();
        let state = RwLock::new(WatchState::new());

        let first = handle_frame(r#"["a",{}]"#, &sink, &state);
        let second = handle_frame(r#"["b",{}]"#, &sink, &state);

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(state.read().probes_sent, 1);
    }

    #[test]
    fn test_undecodable_frame_swallowed() {
        let sink = RecordingSink::new();
        let state = RwLock::new(WatchState::new());

        let reply = handle_frame("not json", &sink, &state);

        assert!(reply.is_none());
        assert!(sink.writes.read().is_empty());
        assert_eq!(state.read().frames_rejected, 1);
        assert_eq!(state.read().probes_sent, 0);

        // The gate is still unclaimed; the next good frame takes it.
        let reply = handle_frame(r#"["a",{}]"#, &sink, &state);
        assert!(reply.is_some());
    }

    #[test]
    fn test_panel_failure_defers_probe() {
        let state = RwLock::new(WatchState::new());

        let reply = handle_frame(r#"["a",{}]"#, &RecordingSink::rejecting(), &state);
        assert!(reply.is_none());
        assert_eq!(state.read().frames_rejected, 1);
        assert_eq!(state.read().probes_sent, 0);

        let reply = handle_frame(r#"["a",{}]"#, &RecordingSink::new(), &state);
        assert!(reply.is_some());
        assert_eq!(state.read().probes_sent, 1);
    }
}
