//! Display panels
//!
//! The client mirrors hub frames into named panels. `PanelSink` is the
//! seam the watcher writes through; `PanelBoard` is the in-memory
//! implementation the binary wires up from config.

use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

use crate::protocol::SELECTOR_PREFIX;

/// Panel write failures
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("selector {0:?} is not of the form div#<id>")]
    BadSelector(String),
    #[error("no panel registered for id {0:?}")]
    UnknownPanel(String),
}

/// Write access to display panels, addressed by selector
pub trait PanelSink: Send + Sync {
    /// Replace the text content of the panel matching `selector`
    fn set_text(&self, selector: &str, text: &str) -> Result<(), DisplayError>;
}

/// In-memory panel registry
///
/// Panels are registered by id and addressed as `div#<id>`. Writes to
/// unregistered ids fail so that a misdirected frame is visible to the
/// caller instead of disappearing.
pub struct PanelBoard {
    panels: RwLock<HashMap<String, String>>,
}

impl PanelBoard {
    /// Create an empty board
    pub fn new() -> Self {
        Self {
            panels: RwLock::new(HashMap::new()),
        }
    }

    /// Create a board with the given panel ids registered
    pub fn with_panels(ids: &[String]) -> Self {
        let board = Self::new();
        for id in ids {
            board.register(id);
        }
        board
    }

    /// Register a panel id; existing text is kept
    pub fn register(&self, id: &str) {
        self.panels.write().entry(id.to_string()).or_default();
    }

    /// Current text of a panel, if registered
    pub fn text_of(&self, id: &str) -> Option<String> {
        self.panels.read().get(id).cloned()
    }

    /// All panels and their text, sorted by id
    pub fn snapshot(&self) -> Vec<(String, String)> {
        let mut entries: Vec<_> = self
            .panels
            .read()
            .iter()
            .map(|(id, text)| (id.clone(), text.clone()))
            .collect();
        entries.sort();
        entries
    }
}

impl Default for PanelBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelSink for PanelBoard {
    fn set_text(&self, selector: &str, text: &str) -> Result<(), DisplayError> {
        let id = selector
            .strip_prefix(SELECTOR_PREFIX)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| DisplayError::BadSelector(selector.to_string()))?;

        let mut panels = self.panels.write();
        match panels.get_mut(id) {
            Some(slot) => {
                *slot = text.to_string();
                Ok(())
            }
            None => Err(DisplayError::UnknownPanel(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_set() {
        let board = PanelBoard::new();
        board.register("facesensor-2");

        board.set_text("div#facesensor-2", "hello").unwrap();
        assert_eq!(board.text_of("facesensor-2").as_deref(), Some("hello"));
    }

    #[test]
    fn test_set_replaces_text() {
        let board = PanelBoard::with_panels(&["a".to_string()]);
        board.set_text("div#a", "first").unwrap();
        board.set_text("div#a", "second").unwrap();
        assert_eq!(board.text_of("a").as_deref(), Some("second"));
    }

    #[test]
    fn test_unknown_panel() {
        let board = PanelBoard::new();
        assert!(matches!(
            board.set_text("div#ghost", "x"),
            Err(DisplayError::UnknownPanel(_))
        ));
    }

    #[test]
    fn test_bad_selector() {
        let board = PanelBoard::new();
        board.register("a");
        assert!(matches!(
            board.set_text("span#a", "x"),
            Err(DisplayError::BadSelector(_))
        ));
        assert!(matches!(
            board.set_text("div#", "x"),
            Err(DisplayError::BadSelector(_))
        ));
    }

    #[test]
    fn test_snapshot_sorted() {
        let board = PanelBoard::with_panels(&["b".to_string(), "a".to_string()]);
        board.set_text("div#b", "text-b").unwrap();

        let snapshot = board.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0], ("a".to_string(), String::new()));
        assert_eq!(snapshot[1], ("b".to_string(), "text-b".to_string()));
    }
}
