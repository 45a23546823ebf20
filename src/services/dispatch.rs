//! Dispatcher — handles one inbound message from one viewer.
//!
//! DESIGN
//! ======
//! 1. Forward the raw text to the control channel, always, exactly once.
//! 2. Classify it with the command parser.
//! 3. On `SetActivity(v)`, commit `v` and broadcast `game` to every other
//!    viewer while holding the activity lock.
//!
//! Nothing is echoed to the sender; it already knows the value it sent.

use tracing::info;
use uuid::Uuid;

use crate::event::Event;
use crate::services::command::{self, Command};
use crate::state::AppState;

/// What a dispatch did, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// Forwarded only.
    Plain,
    /// Forwarded, committed, and broadcast to `delivered` peers.
    ActivityChanged { value: String, delivered: usize },
}

/// Process one raw inbound message from `origin`.
pub async fn dispatch(state: &AppState, origin: Uuid, raw: &str) -> Dispatched {
    info!(client_id = %origin, text = raw, "relay: recv message");
    state.control.send(raw);

    match command::classify(raw) {
        Command::Plain(_) => Dispatched::Plain,
        Command::SetActivity(value) => {
            let mut activity = state.activity.lock().await;
            let previous = activity.commit(value);
            let delivered = state
                .registry
                .broadcast_except(&Event::game(value), Some(origin))
                .await;
            drop(activity);

            info!(client_id = %origin, %previous, activity = value, delivered, "relay: activity changed");
            Dispatched::ActivityChanged { value: value.to_owned(), delivered }
        }
    }
}

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod tests;
