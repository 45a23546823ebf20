//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the live connection registry, the shared activity store, and
//! the control channel every inbound message is forwarded to.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::control::ControlChannel;
use crate::services::activity::ActivityStore;
use crate::services::registry::ConnectionRegistry;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub registry: ConnectionRegistry,
    pub activity: ActivityStore,
    pub control: Arc<dyn ControlChannel>,
    /// Outbound queue depth per viewer.
    pub client_queue_capacity: usize,
}

impl AppState {
    #[must_use]
    pub fn new(config: &RelayConfig, control: Arc<dyn ControlChannel>) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            activity: ActivityStore::new(config.default_activity.clone()),
            control,
            client_queue_capacity: config.client_queue_capacity,
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
