//! Event — the outbound message type pushed to viewers.
//!
//! DESIGN
//! ======
//! Inbound traffic is free text and never parsed as JSON. Outbound traffic is
//! a small tagged JSON object so browser clients can switch on `event`:
//!
//! ```json
//! {"event": "game", "value": "DOKAPON_KINGDOM"}
//! ```

use serde::{Deserialize, Serialize};

/// Event name carried by activity updates.
pub const EVENT_GAME: &str = "game";

/// A server-to-viewer event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "value", rename_all = "lowercase")]
pub enum Event {
    /// The current activity identifier.
    Game(String),
}

impl Event {
    /// Build a `game` event for the given activity.
    pub fn game(value: impl Into<String>) -> Self {
        Self::Game(value.into())
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Game(_) => EVENT_GAME,
        }
    }

    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Game(value) => value,
        }
    }

    /// Serialize to the JSON text sent over the socket.
    ///
    /// # Errors
    ///
    /// Returns a serde error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
#[path = "event_test.rs"]
mod tests;
