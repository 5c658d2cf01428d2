//! Page fetching with bounded retries.

use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use super::{ClientError, RateLimiter};
use crate::transport::{FeedTransport, Page};

/// Fetches one page, retrying failed attempts.
///
/// Every attempt, retries included, first takes its turn on the shared
/// [`RateLimiter`]; the rate-limit delay is the backoff between attempts.
#[derive(Debug, Clone)]
pub struct RetryingFetcher {
    transport: Arc<dyn FeedTransport>,
    limiter: Arc<RateLimiter>,
    num_retries: u32,
}

impl RetryingFetcher {
    /// Create a fetcher making at most `num_retries + 1` attempts per page
    pub fn new(
        transport: Arc<dyn FeedTransport>,
        limiter: Arc<RateLimiter>,
        num_retries: u32,
    ) -> Self {
        Self {
            transport,
            limiter,
            num_retries,
        }
    }

    /// Configured number of retries
    pub fn num_retries(&self) -> u32 {
        self.num_retries
    }

    /// Fetch `url`, returning the first successful page.
    ///
    /// # Errors
    ///
    /// Once every attempt has failed, returns the last failure as
    /// [`ClientError::Http`] (or `Network` / `Feed` when there was no
    /// status), with `retry` set to the configured retry count.
    pub async fn fetch_page(&self, url: &Url) -> Result<Page, ClientError> {
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);
            self.limiter.await_turn().await;
            debug!("Requesting page (attempt {}): {}", attempt, url);

            match self.transport.fetch_feed(url).await {
                Ok(page) => {
                    if attempt > 1 {
                        info!(
                            "Page request succeeded on attempt {} after {} failures",
                            attempt,
                            attempt - 1
                        );
                    }
                    debug!(
                        "Received {} entries (total results: {:?})",
                        page.len(),
                        page.total_results
                    );
                    return Ok(page);
                }
                Err(error) => {
                    if attempt > self.num_retries {
                        warn!(
                            "Page request failed after {} attempts: {}: {}",
                            attempt, url, error
                        );
                        return Err(ClientError::exhausted(url, error, self.num_retries));
                    }
                    warn!(
                        "Page request attempt {}/{} failed: {}",
                        attempt,
                        self.num_retries.saturating_add(1),
                        error
                    );
                }
            }
        }
    }
}
