//! Core rate limiter implementation

use super::types::RateBucket;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

const REFILL_INTERVAL: Duration = Duration::from_secs(1);

/// Token-bucket rate limiter bounding outbound calls per second
///
/// The bucket is refilled to capacity at most once per second. The lock is
/// held only for the refill-and-take step, never across an `.await`.
#[derive(Debug)]
pub struct RateLimiter {
    bucket: Mutex<RateBucket>,
    refill_interval: Duration,
}

impl RateLimiter {
    /// Create a new rate limiter granting `permits_per_second` permits per interval
    pub fn new(permits_per_second: u32) -> Self {
        let capacity = permits_per_second.max(1);
        Self {
            bucket: Mutex::new(RateBucket::full(capacity, Instant::now())),
            refill_interval: REFILL_INTERVAL,
        }
    }

    /// Wait until a permit is available and take it
    pub async fn acquire(&self) {
        loop {
            match self.poll_permit() {
                Ok(()) => return,
                Err(next_refill) => {
                    debug!("Rate limit reached, waiting for next refill");
                    tokio::time::sleep_until(next_refill).await;
                }
            }
        }
    }

    /// Take a permit if one is available right now
    pub fn try_acquire(&self) -> bool {
        self.poll_permit().is_ok()
    }

    /// Wait at most `timeout` for a permit. Returns whether one was taken.
    pub async fn try_acquire_timeout(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.acquire()).await.is_ok()
    }

    /// Permits left in the current interval
    pub fn available_permits(&self) -> u32 {
        let mut bucket = self.bucket.lock();
        bucket.refill(Instant::now(), self.refill_interval);
        bucket.available
    }

    pub fn capacity(&self) -> u32 {
        self.bucket.lock().capacity
    }

    /// Refill if due, then take a permit. On failure returns when the next refill happens.
    fn poll_permit(&self) -> std::result::Result<(), Instant> {
        let mut bucket = self.bucket.lock();
        bucket.refill(Instant::now(), self.refill_interval);
        if bucket.take() {
            Ok(())
        } else {
            Err(bucket.next_refill(self.refill_interval))
        }
    }
}
