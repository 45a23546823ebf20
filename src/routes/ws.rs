//! WebSocket handler — per-viewer relay loop.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID, registers it, and enters a `select!`
//! loop:
//! - Incoming text messages → dispatcher (forward, classify, maybe broadcast)
//! - Events queued for this viewer → serialize and send to the socket
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → register and queue `game` with the current activity
//! 2. Viewer sends text → dispatch
//! 3. Peer changes the activity → queued `game` event is flushed
//! 4. Close, socket error, or registry drop → unregister

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::event::Event;
use crate::services::{dispatch, lifecycle};
use crate::state::AppState;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();

    // Per-connection queue for events addressed to this viewer.
    let (client_tx, mut client_rx) = mpsc::channel::<Event>(state.client_queue_capacity);

    if let Err(e) = lifecycle::connect(&state, client_id, client_tx).await {
        warn!(%client_id, error = %e, "ws: greeting failed");
        return;
    }
    info!(%client_id, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                let Ok(msg) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        dispatch::dispatch(&state, client_id, text.as_str()).await;
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            event = client_rx.recv() => {
                // None: the registry dropped this viewer after a failed delivery.
                let Some(event) = event else { break };
                if send_event(&mut socket, &event).await.is_err() {
                    break;
                }
            }
        }
    }

    lifecycle::disconnect(&state, client_id).await;
    info!(%client_id, "ws: client disconnected");
}

// =============================================================================
// HELPERS
// =============================================================================

async fn send_event(socket: &mut WebSocket, event: &Event) -> Result<(), ()> {
    let json = match event.to_json() {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize event");
            return Err(());
        }
    };
    debug!(event = event.name(), value = event.value(), "ws: send event");
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
