//! Query execution: pagination, rate limiting, retries and result parsing.
//!
//! A [`Client`] turns a [`Search`] into a [`ResultStream`]:
//!
//! - [`PageCursor`] decides which `(start, size)` window to request next
//! - [`RetryingFetcher`] requests it, retrying failed attempts
//! - [`RateLimiter`] spaces every attempt at least `delay_seconds` apart
//! - [`ResultStream`] parses entries, drops malformed and duplicate ones, and
//!   stops at `max_results`
//!
//! ```rust,no_run
//! use arxiv_pager::client::Client;
//! use arxiv_pager::config::ClientConfig;
//! use arxiv_pager::models::Search;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(ClientConfig::default())?;
//! let mut results = client.results(&Search::new("quantum").max_results(25))?;
//! while let Some(result) = results.next().await {
//!     println!("{}", result?.title);
//! }
//! # Ok(())
//! # }
//! ```

mod cursor;
mod error;
mod fetcher;
mod rate_limit;
mod stream;

pub use cursor::{PageCursor, Window};
pub use error::{checked_offset, ClientError};
pub use fetcher::RetryingFetcher;
pub use rate_limit::RateLimiter;
pub use stream::{ResultStream, StreamState};

use std::sync::Arc;
use url::Url;

use crate::config::{ClientConfig, HttpConfig};
use crate::models::Search;
use crate::transport::{FeedTransport, HttpTransport, Page};

/// Client for the search API.
///
/// Cloning is cheap. Clones share one [`RateLimiter`], so the minimum delay
/// holds across every search issued through any of them.
#[derive(Debug, Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    base_url: Url,
    limiter: Arc<RateLimiter>,
    fetcher: RetryingFetcher,
}

impl Client {
    /// Create a client using HTTP with default transport settings
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_http_config(config, &HttpConfig::default())
    }

    /// Create a client using HTTP with explicit transport settings
    pub fn with_http_config(config: ClientConfig, http: &HttpConfig) -> Result<Self, ClientError> {
        let transport =
            HttpTransport::with_config(http).map_err(|e| ClientError::Setup(e.to_string()))?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client over any transport (for testing)
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn FeedTransport>,
    ) -> Result<Self, ClientError> {
        config.validate()?;
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ClientError::InvalidRequest(format!("invalid base_url {:?}: {}", config.base_url, e))
        })?;

        let limiter = Arc::new(RateLimiter::new(config.delay()));
        let fetcher = RetryingFetcher::new(transport, Arc::clone(&limiter), config.num_retries);

        Ok(Self {
            config: Arc::new(config),
            base_url,
            limiter,
            fetcher,
        })
    }

    /// Client settings
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The rate limiter shared by this client and its clones
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub(crate) fn fetcher(&self) -> &RetryingFetcher {
        &self.fetcher
    }

    /// Build the request URL for one page of `search`.
    ///
    /// Deterministic in its inputs: the same search and window always give
    /// the same URL.
    pub fn format_url(&self, search: &Search, start: usize, page_size: usize) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("search_query", search.query.as_str())
            .append_pair("id_list", &search.id_list.join(","))
            .append_pair("sortBy", search.sort_by.as_str())
            .append_pair("sortOrder", search.sort_order.as_str())
            .append_pair("start", &start.to_string())
            .append_pair("max_results", &page_size.to_string());
        url
    }

    /// Fetch a single page through the rate limiter, with retries.
    pub async fn fetch_page(&self, url: &Url) -> Result<Page, ClientError> {
        self.fetcher.fetch_page(url).await
    }

    /// Stream every result of `search`, up to its `max_results`.
    pub fn results(&self, search: &Search) -> Result<ResultStream, ClientError> {
        self.results_with_offset(search, 0)
    }

    /// Stream the results of `search` from position `offset` on.
    ///
    /// `offset` indexes the server's result ordering and is sent as the
    /// first page's `start`. With `max_results = n` at most `n - offset`
    /// results come back, and none once `offset >= n`. Over a feed where
    /// every entry parses, this is `results(search)` with its first `offset`
    /// results skipped. Entries dropped as malformed or duplicate still
    /// occupy their position, so when one lies before `offset` the two
    /// differ by that entry. Nothing is requested until the stream is polled.
    pub fn results_with_offset(
        &self,
        search: &Search,
        offset: usize,
    ) -> Result<ResultStream, ClientError> {
        search.validate()?;
        Ok(ResultStream::new(self.clone(), search.clone(), offset))
    }
}
