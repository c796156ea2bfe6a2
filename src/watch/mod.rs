//! Hub stream watching
//!
//! Supervises the WebSocket session to the hub and mirrors incoming frames
//! into display panels.

pub mod state;
pub mod watcher;

mod session;

pub use state::WatchInfo;
pub use watcher::HubWatcher;
