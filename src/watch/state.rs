//! Watcher state

use serde::Serialize;
use std::time::Instant;

/// Watcher lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchPhase {
    /// No session started yet
    Idle,
    /// A session is being established
    Connecting,
    /// A session is up and reading frames
    Active,
    /// The supervisor has stopped
    Stopped,
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Peer closed without a transport error; the watcher redials
    Closed,
    /// A transport error occurred; the watcher stops for good
    Faulted,
    /// Shutdown was requested
    Shutdown,
}

/// State shared across one watcher's sessions
#[derive(Debug)]
pub struct WatchState {
    /// Lifecycle phase
    pub phase: WatchPhase,
    /// Set once any session hits a transport error; never cleared
    pub faulted: bool,
    /// Watcher creation time
    pub started_at: Instant,
    /// Dial attempts so far
    pub sessions_started: u64,
    /// Text frames received
    pub frames_received: u64,
    /// Frames mirrored into a panel
    pub frames_displayed: u64,
    /// Frames dropped by decode or panel errors
    pub frames_rejected: u64,
    /// One-shot probe gate; 0 until the first frame is processed
    pub probes_sent: u64,
}

impl WatchState {
    /// Create fresh state
    pub fn new() -> Self {
        Self {
            phase: WatchPhase::Idle,
            faulted: false,
            started_at: Instant::now(),
            sessions_started: 0,
            frames_received: 0,
            frames_displayed: 0,
            frames_rejected: 0,
            probes_sent: 0,
        }
    }

    /// Mark a dial in progress
    pub fn set_connecting(&mut self) {
        self.phase = WatchPhase::Connecting;
        self.sessions_started = self.sessions_started.saturating_add(1);
    }

    /// Mark the current session active
    pub fn set_active(&mut self) {
        self.phase = WatchPhase::Active;
    }

    /// Mark the supervisor stopped
    pub fn set_stopped(&mut self) {
        self.phase = WatchPhase::Stopped;
    }

    /// Mark a transport fault
    pub fn set_faulted(&mut self) {
        self.faulted = true;
    }

    /// Record a received frame
    pub fn record_frame(&mut self) {
        self.frames_received = self.frames_received.saturating_add(1);
    }

    /// Record a frame mirrored into a panel
    pub fn record_displayed(&mut self) {
        self.frames_displayed = self.frames_displayed.saturating_add(1);
    }

    /// Record a frame dropped by a decode or panel error
    pub fn record_rejected(&mut self) {
        self.frames_rejected = self.frames_rejected.saturating_add(1);
    }

    /// Claim the one-shot probe send; true only the first time
    pub fn claim_probe(&mut self) -> bool {
        if self.probes_sent == 0 {
            self.probes_sent += 1;
            true
        } else {
            false
        }
    }

    /// Check if a session is up
    pub fn is_active(&self) -> bool {
        self.phase == WatchPhase::Active
    }

    /// Get watcher uptime
    pub fn uptime(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Convert to serializable info
    pub fn to_info(&self) -> WatchInfo {
        WatchInfo {
            phase: format!("{:?}", self.phase),
            faulted: self.faulted,
            uptime_secs: self.uptime().as_secs_f64(),
            sessions_started: self.sessions_started,
            frames_received: self.frames_received,
            frames_displayed: self.frames_displayed,
            frames_rejected: self.frames_rejected,
            probes_sent: self.probes_sent,
        }
    }
}

impl Default for WatchState {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable watcher information for status logs
#[derive(Debug, Clone, Serialize)]
pub struct WatchInfo {
    /// Lifecycle phase
    pub phase: String,
    /// Whether a transport error has occurred
    pub faulted: bool,
    /// Watcher uptime in seconds
    pub uptime_secs: f64,
    /// Dial attempts
    pub sessions_started: u64,
    /// Text frames received
    pub frames_received: u64,
    /// Frames mirrored into a panel
    pub frames_displayed: u64,
    /// Frames dropped by decode or panel errors
    pub frames_rejected: u64,
    /// Probe updates sent (0 or 1)
    pub probes_sent: u64,
}
