//! Wire format for hub value frames
//!
//! Frames are UTF-8 text carrying a JSON array, in the shapes the hub
//! broker publishes:
//! - single pair: `["<hub-id>", <value>]`
//! - batch of pairs: `[["<hub-id>", <value>], ...]`
//!
//! Only the leading identifier is consumed downstream; the value rides
//! along in the decoded update for callers that want it.

use serde_json::{json, Value};
use thiserror::Error;

/// Selector prefix for display panels
pub const SELECTOR_PREFIX: &str = "div#";

/// Frame decoding failures
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame is not a JSON array")]
    NotArray,
    #[error("frame has no hub identifier")]
    MissingIdent,
}

/// One decoded hub update
#[derive(Debug, Clone, PartialEq)]
pub struct HubUpdate {
    /// Hub identifier from the leading element
    pub hub: String,
    /// Value published alongside the identifier (Null when absent)
    pub values: Value,
}

impl HubUpdate {
    /// Panel selector for this update: `div#<hub-id>`
    pub fn selector(&self) -> String {
        format!("{}{}", SELECTOR_PREFIX, self.hub)
    }
}

/// Decode a raw text frame
///
/// Accepts both wire shapes; for a batch, only the first pair is read.
/// The identifier must be a string.
pub fn decode_update(raw: &str) -> Result<HubUpdate, ProtocolError> {
    let doc: Value = serde_json::from_str(raw)?;
    let items = doc.as_array().ok_or(ProtocolError::NotArray)?;

    match items.first() {
        Some(Value::String(hub)) => Ok(HubUpdate {
            hub: hub.clone(),
            values: items.get(1).cloned().unwrap_or(Value::Null),
        }),
        Some(Value::Array(pair)) => match pair.first() {
            Some(Value::String(hub)) => Ok(HubUpdate {
                hub: hub.clone(),
                values: pair.get(1).cloned().unwrap_or(Value::Null),
            }),
            _ => Err(ProtocolError::MissingIdent),
        },
        _ => Err(ProtocolError::MissingIdent),
    }
}

/// Encode one update in the batch shape the broker expects
pub fn encode_update(hub: &str, values: &Value) -> String {
    json!([[hub, values]]).to_string()
}

/// Canned update sent back over the stream after the first frame is
/// processed, exercising the write path end to end
pub fn probe_update() -> String {
    encode_update("facesensor-2", &json!({"検出": ["次郎", "ポチ"]}))
}
