//! Configuration management
//!
//! Handles loading and validating client configuration from TOML files.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Hub stream connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Stream URL (ws:// or wss://)
    pub url: String,
    /// Dial timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Display panel configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Panel ids to register; each is addressed as `div#<id>`
    #[serde(default)]
    pub panels: Vec<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { panels: Vec::new() }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format: "json" or "pretty"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_connect_timeout() -> u64 {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config =
            toml::from_str(&contents).with_context(|| "Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.server.url.is_empty() {
            anyhow::bail!("server.url must not be empty");
        }
        if !self.server.url.starts_with("ws://") && !self.server.url.starts_with("wss://") {
            anyhow::bail!("server.url must use the ws:// or wss:// scheme");
        }
        if self.server.connect_timeout_secs == 0 {
            anyhow::bail!("server.connect_timeout_secs must be > 0");
        }
        let mut seen = HashSet::new();
        for panel in &self.display.panels {
            if panel.is_empty() {
                anyhow::bail!("display.panels must not contain empty ids");
            }
            if !seen.insert(panel.as_str()) {
                anyhow::bail!("display.panels contains duplicate id: {}", panel);
            }
        }
        Ok(())
    }
}
