//! Cancellable single-slot timer used to debounce viewport resizes.

use chrono::{DateTime, Duration, Utc};

/// Holds at most one pending payload. Scheduling replaces (cancels) whatever
/// was pending; the payload is released once by `fire_due` after its deadline.
#[derive(Debug, Clone)]
pub struct CancellableTimer<T> {
    pending: Option<Pending<T>>,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    due: DateTime<Utc>,
    payload: T,
}

impl<T> Default for CancellableTimer<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> CancellableTimer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels any pending payload and schedules `payload` to fire `delay` after `now`.
    pub fn schedule(&mut self, now: DateTime<Utc>, delay: Duration, payload: T) {
        self.pending = Some(Pending {
            due: now + delay,
            payload,
        });
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|pending| pending.payload)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        self.pending.as_ref().map(|pending| pending.due)
    }

    /// Releases the payload when `now` has reached its deadline.
    pub fn fire_due(&mut self, now: DateTime<Utc>) -> Option<T> {
        let ready = matches!(&self.pending, Some(pending) if now >= pending.due);
        if ready {
            self.cancel()
        } else {
            None
        }
    }
}
