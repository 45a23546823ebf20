//! Activity store — the one piece of process-wide shared state.
//!
//! DESIGN
//! ======
//! The current activity identifier lives behind a single async mutex. The
//! guard doubles as the relay's critical section: whoever holds it may
//! commit a new value and fan it out before anyone else observes or changes
//! the activity. Reads take the same lock briefly and return a copy.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

/// Shared activity identifier. Always holds a value.
#[derive(Clone)]
pub struct ActivityStore {
    current: Arc<Mutex<String>>,
}

/// Exclusive access to the activity for one commit-and-broadcast step.
pub struct ActivityGuard<'a> {
    current: MutexGuard<'a, String>,
}

impl ActivityStore {
    #[must_use]
    pub fn new(initial: impl Into<String>) -> Self {
        Self { current: Arc::new(Mutex::new(initial.into())) }
    }

    /// Copy of the committed activity.
    pub async fn current(&self) -> String {
        self.current.lock().await.clone()
    }

    /// Enter the critical section. Held across commit and broadcast so no
    /// other update can interleave.
    pub(crate) async fn lock(&self) -> ActivityGuard<'_> {
        ActivityGuard { current: self.current.lock().await }
    }
}

impl ActivityGuard<'_> {
    #[must_use]
    pub fn get(&self) -> &str {
        &self.current
    }

    /// Replace the activity, returning the previous value.
    pub fn commit(&mut self, value: &str) -> String {
        std::mem::replace(&mut *self.current, value.to_owned())
    }
}

#[cfg(test)]
#[path = "activity_test.rs"]
mod tests;
