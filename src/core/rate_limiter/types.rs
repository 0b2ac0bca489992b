//! Rate limiter types and data structures

use std::time::Duration;
use tokio::time::Instant;

/// Token bucket refilled to capacity once per interval
#[derive(Debug, Clone)]
pub(super) struct RateBucket {
    /// Maximum permits per interval
    pub(super) capacity: u32,
    /// Permits left in the current interval
    pub(super) available: u32,
    /// Start of the current interval
    pub(super) last_refill: Instant,
}

impl RateBucket {
    pub(super) fn full(capacity: u32, now: Instant) -> Self {
        Self {
            capacity,
            available: capacity,
            last_refill: now,
        }
    }

    /// Refill to capacity if a whole interval has passed. Returns whether it refilled.
    pub(super) fn refill(&mut self, now: Instant, interval: Duration) -> bool {
        if now.saturating_duration_since(self.last_refill) >= interval {
            self.available = self.capacity;
            self.last_refill = now;
            true
        } else {
            false
        }
    }

    /// Take one permit, failing instead of going negative
    pub(super) fn take(&mut self) -> bool {
        if self.available == 0 {
            return false;
        }
        self.available -= 1;
        true
    }

    pub(super) fn next_refill(&self, interval: Duration) -> Instant {
        self.last_refill + interval
    }
}
