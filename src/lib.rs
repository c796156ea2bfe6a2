//! Hubwatch - WebSocket dashboard client
//!
//! This library provides the core components for a dashboard client that
//! follows a realtime hub value stream over a single supervised WebSocket
//! and mirrors incoming frames into named display panels.

pub mod config;
pub mod display;
pub mod protocol;
pub mod watch;

pub use config::Config;
pub use display::{PanelBoard, PanelSink};
pub use watch::HubWatcher;

/// Client version for display
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
