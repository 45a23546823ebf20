//! Control channel — the external consumer of every inbound message.
//!
//! DESIGN
//! ======
//! The relay hands each raw message to a `ControlChannel` and moves on. The
//! contract is deliberately one-way: `send` takes a string, returns nothing,
//! and never fails from the caller's point of view. Implementations that do
//! I/O queue the message and let a background worker absorb latency and
//! errors.
//!
//! `CONTROL_ADDR` selects the implementation at startup:
//! - unset → [`LogControl`], messages are only logged
//! - `udp://host:port` / `tcp://host:port` → [`socket::SocketControl`]

pub mod socket;

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{ControlTarget, RelayConfig};

/// One-way sink for raw inbound messages.
pub trait ControlChannel: Send + Sync {
    /// Forward one raw message. Must not block and must not panic.
    fn send(&self, raw: &str);
}

/// Control channel that only logs what it receives.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogControl;

impl ControlChannel for LogControl {
    fn send(&self, raw: &str) {
        info!(text = raw, "control: forward (log only)");
    }
}

/// Build the control channel selected by config.
///
/// Socket targets spawn their worker on the current tokio runtime.
#[must_use]
pub fn from_config(config: &RelayConfig) -> Arc<dyn ControlChannel> {
    match &config.control {
        ControlTarget::Log => {
            warn!("CONTROL_ADDR not set — inbound messages will only be logged");
            Arc::new(LogControl)
        }
        ControlTarget::Udp(addr) => Arc::new(socket::SocketControl::spawn(
            socket::Transport::Udp,
            addr.clone(),
            config.control_queue_capacity,
            config.control_timeout,
        )),
        ControlTarget::Tcp(addr) => Arc::new(socket::SocketControl::spawn(
            socket::Transport::Tcp,
            addr.clone(),
            config.control_queue_capacity,
            config.control_timeout,
        )),
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
