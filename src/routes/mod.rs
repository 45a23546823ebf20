//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the websocket relay at `/ws`, two small
//! diagnostics endpoints, and everything else as static files from the
//! configured site directory (`/` resolves to `index.html`).

pub mod ws;

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::state::AppState;

/// Relay routes plus the static site fallback.
pub fn app(state: AppState, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let site = ServeDir::new(static_dir).append_index_html_on_directories(true);

    Router::new()
        .route("/ws", get(ws::handle_ws))
        .route("/api/activity", get(activity_status))
        .route("/healthz", get(healthz))
        .fallback_service(site)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct ActivityStatus {
    activity: String,
    connections: usize,
    viewers: Vec<ViewerStatus>,
}

#[derive(Debug, Serialize)]
struct ViewerStatus {
    id: Uuid,
    /// Milliseconds since Unix epoch.
    connected_since: u64,
}

/// Read-only view of the shared activity and connected viewers.
async fn activity_status(State(state): State<AppState>) -> Json<ActivityStatus> {
    let viewers: Vec<ViewerStatus> = state
        .registry
        .snapshot()
        .await
        .into_iter()
        .map(|info| ViewerStatus { id: info.id, connected_since: unix_ms(info.connected_since) })
        .collect();

    Json(ActivityStatus { activity: state.activity.current().await, connections: viewers.len(), viewers })
}

fn unix_ms(at: SystemTime) -> u64 {
    let Ok(dur) = at.duration_since(UNIX_EPOCH) else {
        return 0;
    };
    u64::try_from(dur.as_millis()).unwrap_or(0)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
