//! HTTP transport.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::{FeedTransport, Page, TransportError};
use crate::config::HttpConfig;

/// Shared HTTP client performing one GET per page
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Arc<Client>,
}

impl HttpTransport {
    /// Create a new transport with default settings
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(&HttpConfig::default())
    }

    /// Create a transport from explicit settings
    pub fn with_config(config: &HttpConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| TransportError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Create from an existing reqwest Client
    pub fn from_client(client: Arc<Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedTransport for HttpTransport {
    async fn fetch_feed(&self, url: &Url) -> Result<Page, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/atom+xml")
            .send()
            .await
            .map_err(|e| TransportError::Network(format!("Failed to fetch {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        Page::from_atom(bytes.as_ref())
    }
}
