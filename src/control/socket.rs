//! Socket control channel — queued UDP/TCP forwarding.
//!
//! DESIGN
//! ======
//! `send` does a non-blocking `try_send` into a bounded queue. A single
//! worker drains the queue in order and writes each message to the target:
//! - UDP: one datagram per message
//! - TCP: one `\n`-terminated line per message over a persistent stream
//!
//! ERROR HANDLING
//! ==============
//! The socket is opened lazily on the first message and after any failure.
//! Connect plus write for one message is bounded by the configured timeout,
//! so a peer that stops reading counts as a failure. A failed or timed out
//! write drops the socket and the message that failed; nothing is retried.
//! A full queue drops the incoming message with a warning.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::ControlChannel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Udp,
    Tcp,
}

#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("could not resolve control address {0}")]
    Resolve(String),
    #[error("control socket I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("control socket timed out after {0:?}")]
    Timeout(Duration),
}

// =============================================================================
// HANDLE
// =============================================================================

/// Queue-backed control channel. Dropping every handle stops the worker.
pub struct SocketControl {
    tx: mpsc::Sender<String>,
    addr: String,
}

impl SocketControl {
    /// Spawn the forwarding worker and return its queue handle.
    #[must_use]
    pub fn spawn(transport: Transport, addr: String, capacity: usize, io_timeout: Duration) -> Self {
        let (handle, _worker) = Self::spawn_with_worker(transport, addr, capacity, io_timeout);
        handle
    }

    pub(crate) fn spawn_with_worker(
        transport: Transport,
        addr: String,
        capacity: usize,
        io_timeout: Duration,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel::<String>(capacity);
        info!(?transport, %addr, capacity, ?io_timeout, "control: socket worker configured");
        let worker = tokio::spawn(run_worker(Sink::new(transport, addr.clone(), io_timeout), rx));
        (Self { tx, addr }, worker)
    }
}

impl ControlChannel for SocketControl {
    fn send(&self, raw: &str) {
        match self.tx.try_send(raw.to_owned()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(addr = %self.addr, "control: queue full; dropping message");
            }
            Err(TrySendError::Closed(_)) => {
                warn!(addr = %self.addr, "control: worker stopped; dropping message");
            }
        }
    }
}

// =============================================================================
// WORKER
// =============================================================================

async fn run_worker(mut sink: Sink, mut rx: mpsc::Receiver<String>) {
    while let Some(raw) = rx.recv().await {
        if let Err(e) = sink.deliver(&raw).await {
            warn!(addr = %sink.addr, error = %e, "control: forward failed; message dropped");
            sink.reset();
        }
    }
    debug!(addr = %sink.addr, "control: worker stopped");
}

enum Conn {
    Udp(UdpSocket),
    Tcp(TcpStream),
}

struct Sink {
    transport: Transport,
    addr: String,
    io_timeout: Duration,
    conn: Option<Conn>,
}

impl Sink {
    fn new(transport: Transport, addr: String, io_timeout: Duration) -> Self {
        Self { transport, addr, io_timeout, conn: None }
    }

    fn reset(&mut self) {
        self.conn = None;
    }

    async fn deliver(&mut self, raw: &str) -> Result<(), ControlError> {
        let limit = self.io_timeout;
        tokio::time::timeout(limit, self.write(raw))
            .await
            .map_err(|_| ControlError::Timeout(limit))?
    }

    async fn write(&mut self, raw: &str) -> Result<(), ControlError> {
        if self.conn.is_none() {
            self.conn = Some(self.connect().await?);
        }
        match &mut self.conn {
            Some(Conn::Udp(socket)) => {
                socket.send(raw.as_bytes()).await?;
            }
            Some(Conn::Tcp(stream)) => {
                let mut line = String::with_capacity(raw.len() + 1);
                line.push_str(raw);
                line.push('\n');
                stream.write_all(line.as_bytes()).await?;
            }
            None => {}
        }
        Ok(())
    }

    async fn connect(&self) -> Result<Conn, ControlError> {
        match self.transport {
            Transport::Udp => {
                let target = tokio::net::lookup_host(&self.addr)
                    .await?
                    .next()
                    .ok_or_else(|| ControlError::Resolve(self.addr.clone()))?;
                let local = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
                let socket = UdpSocket::bind(local).await?;
                socket.connect(target).await?;
                info!(addr = %self.addr, "control: udp socket ready");
                Ok(Conn::Udp(socket))
            }
            Transport::Tcp => {
                let stream = TcpStream::connect(&self.addr).await?;
                stream.set_nodelay(true)?;
                info!(addr = %self.addr, "control: tcp stream connected");
                Ok(Conn::Tcp(stream))
            }
        }
    }
}

#[cfg(test)]
#[path = "socket_test.rs"]
mod tests;
