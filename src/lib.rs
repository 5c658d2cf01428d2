//! # arxiv-pager
//!
//! A client for the arXiv search API that pages through large result sets,
//! spaces requests apart, retries failed pages and parses feed entries into
//! typed results, skipping malformed entries.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Searches, composable queries and parsed results
//! - [`client`]: The query engine: rate limiter, retrying fetcher, page cursor and result stream
//! - [`transport`]: One-page fetching over HTTP, plus a mock for tests
//! - [`config`]: Configuration management
//! - [`utils`]: Result rendering for the command line

pub mod client;
pub mod config;
pub mod models;
pub mod transport;
pub mod utils;

// Re-export commonly used types
pub use client::{Client, ClientError, ResultStream};
pub use config::ClientConfig;
pub use models::{ArxivResult, Query, Search};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
