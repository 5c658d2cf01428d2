//! Minimum delay between consecutive requests.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Enforces a minimum delay between the starts of consecutive requests.
///
/// One limiter is shared by every request a client makes, whatever search or
/// URL it is for. The lock is held while waiting, so concurrent callers take
/// turns instead of all waking at the same instant.
#[derive(Debug)]
pub struct RateLimiter {
    delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter that spaces requests at least `delay` apart
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_request: Mutex::new(None),
        }
    }

    /// Configured minimum delay
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait until `delay` has passed since the last request, then record a new
    /// request start. Returns how long it waited.
    ///
    /// The first request never waits, and neither does a zero delay.
    pub async fn await_turn(&self) -> Duration {
        let mut last = self.last_request.lock().await;

        let wait = match *last {
            Some(previous) if !self.delay.is_zero() => {
                self.delay.saturating_sub(previous.elapsed())
            }
            _ => Duration::ZERO,
        };

        if !wait.is_zero() {
            debug!("Rate limited, sleeping {:?} before next request", wait);
            sleep(wait).await;
        }

        record(&mut last, Instant::now());
        wait
    }

    /// Record a request starting now without waiting
    pub async fn record_now(&self) {
        let mut last = self.last_request.lock().await;
        record(&mut last, Instant::now());
    }

    /// Start time of the most recent request, if any
    pub async fn last_request(&self) -> Option<Instant> {
        *self.last_request.lock().await
    }

    /// Record a request that started at `at`. Earlier times than the one
    /// already recorded are ignored.
    pub async fn set_last_request(&self, at: Instant) {
        let mut last = self.last_request.lock().await;
        record(&mut last, at);
    }
}

fn record(last: &mut Option<Instant>, at: Instant) {
    *last = Some(match *last {
        Some(previous) => previous.max(at),
        None => at,
    });
}
