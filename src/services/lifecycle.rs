//! Connection lifecycle — greeting new viewers and cleaning up after them.
//!
//! A new viewer is registered and sent the current activity while the
//! activity lock is held, so the greeting is always its first event and no
//! concurrent change can slip in between.

use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use crate::event::Event;
use crate::services::registry::{Connection, DeliveryError};
use crate::state::AppState;

/// Register a viewer and queue the current activity for it.
///
/// # Errors
///
/// Returns a `DeliveryError` if the ID is already registered, or if the
/// greeting could not be queued (the viewer is unregistered in that case).
pub async fn connect(state: &AppState, client_id: Uuid, tx: mpsc::Sender<Event>) -> Result<String, DeliveryError> {
    let activity = state.activity.lock().await;
    let current = activity.get().to_owned();

    if !state.registry.register(Connection::new(client_id, tx)).await {
        return Err(DeliveryError::Duplicate(client_id));
    }
    state.registry.send_to(client_id, &Event::game(current.as_str())).await?;
    drop(activity);

    info!(%client_id, activity = %current, "relay: client greeted");
    Ok(current)
}

/// Remove a viewer from the registry.
pub async fn disconnect(state: &AppState, client_id: Uuid) {
    if let Some(conn) = state.registry.unregister(client_id).await {
        let connected_ms = u64::try_from(conn.connected_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(%client_id, connected_ms, "relay: client session ended");
    }
}

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod tests;
