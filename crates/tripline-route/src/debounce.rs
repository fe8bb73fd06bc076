//! Debounced-task primitive: a deadline plus a "latest pending input"
//! slot.
//!
//! The debouncer never reads a clock. Callers pass `now` in, which keeps
//! it deterministic under test and lets the browser driver decide how to
//! sleep until [`Debouncer::deadline`].

use std::time::Duration;

use web_time::Instant;

/// Coalesces bursts of inputs so only the last one in a quiet window is
/// released.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given quiet window.
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// The quiet window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Store `value`, replacing any pending input, and restart the window.
    ///
    /// Returns the new deadline.
    pub fn push(&mut self, value: T, now: Instant) -> Instant {
        let deadline = now + self.window;
        self.pending = Some((value, deadline));
        deadline
    }

    /// When the pending input becomes due, if there is one.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Whether an input is waiting.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Release the pending input if its window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.deadline().is_some_and(|deadline| now >= deadline) {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    /// Drop the pending input without releasing it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}
