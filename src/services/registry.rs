//! Connection registry — live viewer connections and fan-out delivery.
//!
//! DESIGN
//! ======
//! Each viewer owns a bounded `mpsc` queue drained by its websocket task.
//! The registry holds the sending half keyed by client ID. Delivery is a
//! non-blocking `try_send`, so fan-out never waits on a slow viewer and
//! per-connection order is the queue's FIFO order.
//!
//! ERROR HANDLING
//! ==============
//! A closed or full queue counts as a failed delivery. The offending
//! connection is logged and unregistered; dropping its sender ends the
//! websocket task's receive loop. Other connections are never affected.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use tokio::sync::{RwLock, mpsc};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{info, warn};
use uuid::Uuid;

use crate::event::Event;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("client not registered: {0}")]
    NotRegistered(Uuid),
    #[error("client already registered: {0}")]
    Duplicate(Uuid),
    #[error("outbound queue full for client {0}")]
    QueueFull(Uuid),
    #[error("connection closed for client {0}")]
    Closed(Uuid),
}

/// One registered viewer.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: Uuid,
    /// Wall-clock connect time, reported by diagnostics.
    pub connected_since: SystemTime,
    /// Monotonic connect time, used for session duration.
    pub connected_at: Instant,
    tx: mpsc::Sender<Event>,
}

impl Connection {
    #[must_use]
    pub fn new(id: Uuid, tx: mpsc::Sender<Event>) -> Self {
        Self { id, connected_since: SystemTime::now(), connected_at: Instant::now(), tx }
    }

    fn deliver(&self, event: Event) -> Result<(), DeliveryError> {
        self.tx.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::QueueFull(self.id),
            TrySendError::Closed(_) => DeliveryError::Closed(self.id),
        })
    }
}

/// Diagnostic view of a registered connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub id: Uuid,
    pub connected_since: SystemTime,
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Set of live connections. Clone is cheap; all clones share one map.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<RwLock<HashMap<Uuid, Connection>>>,
}

impl ConnectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection. Returns `false` and leaves the existing entry in
    /// place if the ID is already registered.
    pub async fn register(&self, conn: Connection) -> bool {
        let mut connections = self.connections.write().await;
        if connections.contains_key(&conn.id) {
            warn!(client_id = %conn.id, "registry: duplicate register ignored");
            return false;
        }
        let client_id = conn.id;
        connections.insert(client_id, conn);
        info!(%client_id, clients = connections.len(), "registry: client registered");
        true
    }

    /// Remove a connection. No-op if it is already gone.
    pub async fn unregister(&self, client_id: Uuid) -> Option<Connection> {
        let mut connections = self.connections.write().await;
        let removed = connections.remove(&client_id);
        if removed.is_some() {
            info!(%client_id, clients = connections.len(), "registry: client unregistered");
        }
        removed
    }

    /// Deliver an event to exactly one connection. A failed delivery
    /// unregisters that connection.
    pub async fn send_to(&self, client_id: Uuid, event: &Event) -> Result<(), DeliveryError> {
        let result = {
            let connections = self.connections.read().await;
            match connections.get(&client_id) {
                Some(conn) => conn.deliver(event.clone()),
                None => return Err(DeliveryError::NotRegistered(client_id)),
            }
        };

        if let Err(e) = &result {
            warn!(%client_id, error = %e, "registry: delivery failed; dropping client");
            self.unregister(client_id).await;
        }
        result
    }

    /// Deliver an event to every connection except `exclude`. Returns the
    /// number of successful deliveries.
    pub async fn broadcast_except(&self, event: &Event, exclude: Option<Uuid>) -> usize {
        let mut delivered = 0;
        let mut failed = Vec::new();
        {
            let connections = self.connections.read().await;
            for (client_id, conn) in connections.iter() {
                if exclude == Some(*client_id) {
                    continue;
                }
                match conn.deliver(event.clone()) {
                    Ok(()) => delivered += 1,
                    Err(e) => failed.push((*client_id, e)),
                }
            }
        }

        for (client_id, e) in failed {
            warn!(%client_id, error = %e, "registry: broadcast delivery failed; dropping client");
            self.unregister(client_id).await;
        }
        delivered
    }

    #[cfg(test)]
    pub async fn contains(&self, client_id: Uuid) -> bool {
        self.connections.read().await.contains_key(&client_id)
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// List registered connections, oldest first.
    pub async fn snapshot(&self) -> Vec<ConnectionInfo> {
        let connections = self.connections.read().await;
        let mut infos: Vec<(Instant, ConnectionInfo)> = connections
            .values()
            .map(|c| (c.connected_at, ConnectionInfo { id: c.id, connected_since: c.connected_since }))
            .collect();
        infos.sort_by_key(|(at, _)| *at);
        infos.into_iter().map(|(_, info)| info).collect()
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
