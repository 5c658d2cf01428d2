//! Configuration management.
//!
//! The library takes [`ClientConfig`] and [`HttpConfig`] as plain values. Only
//! the binary reads them from a file and the environment, via [`load_config`].
//!
//! # Configuration File Format
//!
//! ```toml
//! [client]
//! page_size = 100
//! delay_seconds = 3.0
//! num_retries = 3
//! base_url = "https://export.arxiv.org/api/query"
//!
//! [http]
//! timeout_secs = 30
//! connect_timeout_secs = 10
//! user_agent = "arxiv-pager/0.1.0"
//! ```
//!
//! Every key can be overridden with an `ARXIV_PAGER__<SECTION>__<KEY>`
//! environment variable, e.g. `ARXIV_PAGER__CLIENT__PAGE_SIZE=50`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::ClientError;

/// Name of the configuration file looked up by [`find_config_file`]
pub const CONFIG_FILE_NAME: &str = "arxiv-pager.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Pagination, rate limiting and retry settings
    #[serde(default)]
    pub client: ClientConfig,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,
}

/// Tunables shared by every request a client issues
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Results requested per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Minimum seconds between two requests, retries included
    #[serde(default = "default_delay_seconds")]
    pub delay_seconds: f64,

    /// Retries after a failed first attempt
    #[serde(default = "default_num_retries")]
    pub num_retries: u32,

    /// Query endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            delay_seconds: default_delay_seconds(),
            num_retries: default_num_retries(),
            base_url: default_base_url(),
        }
    }
}

fn default_page_size() -> usize {
    100
}

fn default_delay_seconds() -> f64 {
    3.0
}

fn default_num_retries() -> u32 {
    3
}

fn default_base_url() -> String {
    "https://export.arxiv.org/api/query".to_string()
}

impl ClientConfig {
    /// Create a config with the given page size, delay and retry count
    pub fn new(page_size: usize, delay_seconds: f64, num_retries: u32) -> Self {
        Self {
            page_size,
            delay_seconds,
            num_retries,
            ..Default::default()
        }
    }

    /// Set the page size
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the delay between requests
    pub fn delay_seconds(mut self, delay_seconds: f64) -> Self {
        self.delay_seconds = delay_seconds;
        self
    }

    /// Set the retry count
    pub fn num_retries(mut self, num_retries: u32) -> Self {
        self.num_retries = num_retries;
        self
    }

    /// Set the query endpoint
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The delay as a [`Duration`]; zero if `delay_seconds` is not a valid delay.
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_seconds).unwrap_or(Duration::ZERO)
    }

    /// Reject settings no client can run with.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.page_size == 0 {
            return Err(ClientError::InvalidRequest(
                "page_size must be positive".to_string(),
            ));
        }
        if !self.delay_seconds.is_finite() || self.delay_seconds < 0.0 {
            return Err(ClientError::InvalidRequest(format!(
                "delay_seconds must be a non-negative number, got {}",
                self.delay_seconds
            )));
        }
        url::Url::parse(&self.base_url).map_err(|e| {
            ClientError::InvalidRequest(format!("invalid base_url {:?}: {}", self.base_url, e))
        })?;
        Ok(())
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// User-Agent header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<AppConfig, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix("ARXIV_PAGER").separator("__"))
        .build()?;

    settings.try_deserialize()
}

/// Load configuration from the environment only
pub fn get_config() -> Result<AppConfig, config::ConfigError> {
    config::Config::builder()
        .add_source(config::Environment::with_prefix("ARXIV_PAGER").separator("__"))
        .build()?
        .try_deserialize()
}

/// Look for a config file in the working directory, then the user config dir.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("arxiv-pager").join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}
