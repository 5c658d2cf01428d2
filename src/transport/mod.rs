//! Fetching and parsing result pages.
//!
//! A [`FeedTransport`] performs exactly one request for one page and reports
//! either the parsed [`Page`] or a [`TransportError`]. Retrying and rate
//! limiting happen above this layer, in [`crate::client`].
//!
//! - [`HttpTransport`]: the production transport (reqwest + feed-rs)
//! - [`MockTransport`]: an in-memory transport for tests

mod http;
pub mod mock;

pub use http::HttpTransport;
pub use mock::{MockEntry, MockTransport};

use async_trait::async_trait;
use feed_rs::model::Entry;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::collections::HashMap;
use url::Url;

use crate::models::ArxivFields;

const ATOM_NS: &[u8] = b"http://www.w3.org/2005/Atom";
const ARXIV_NS: &[u8] = b"http://arxiv.org/schemas/atom";
const OPENSEARCH_NS: &[u8] = b"http://a9.com/-/spec/opensearch/1.1/";

/// One response's worth of feed entries.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Raw entries, in feed order
    pub entries: Vec<Entry>,

    /// `opensearch:totalResults`, when the feed reports it
    pub total_results: Option<usize>,

    /// `arxiv:` extension elements, keyed by entry id
    pub arxiv_fields: HashMap<String, ArxivFields>,
}

impl Page {
    /// Parse an Atom document.
    pub fn from_atom(bytes: &[u8]) -> Result<Self, TransportError> {
        let feed = feed_rs::parser::parse(bytes)
            .map_err(|e| TransportError::Feed(format!("Failed to parse Atom feed: {}", e)))?;
        let extensions = scan_extensions(bytes);

        Ok(Self {
            entries: feed.entries,
            total_results: extensions.total_results,
            arxiv_fields: extensions.arxiv_fields,
        })
    }

    /// Number of raw entries on the page
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the page has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries paired with their `arxiv:` fields (empty when the entry had none).
    pub fn into_entries(self) -> impl Iterator<Item = (Entry, ArxivFields)> {
        let fields = self.arxiv_fields;
        self.entries.into_iter().map(move |entry| {
            let extra = fields.get(entry.id.trim()).cloned().unwrap_or_default();
            (entry, extra)
        })
    }
}

#[derive(Debug, Default)]
struct FeedExtensions {
    total_results: Option<usize>,
    arxiv_fields: HashMap<String, ArxivFields>,
}

#[derive(Debug, Clone, Copy)]
enum Capture {
    TotalResults,
    EntryId,
    Comment,
    JournalRef,
    Doi,
}

fn namespace<'a>(ns: &'a ResolveResult<'_>) -> &'a [u8] {
    match ns {
        ResolveResult::Bound(Namespace(ns)) => ns,
        _ => b"",
    }
}

fn term(e: &BytesStart<'_>) -> Option<String> {
    let attr = e.try_get_attribute("term").ok().flatten()?;
    let value = attr.unescape_value().ok()?;
    Some(value.trim().to_string()).filter(|v| !v.is_empty())
}

/// feed-rs drops the OpenSearch and arXiv extensions, so read them straight
/// from the XML.
fn scan_extensions(bytes: &[u8]) -> FeedExtensions {
    let mut reader = NsReader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut out = FeedExtensions::default();
    let mut entry: Option<(String, ArxivFields)> = None;
    let mut capture: Option<Capture> = None;
    let mut text = String::new();

    loop {
        match reader.read_resolved_event_into(&mut buf) {
            Ok((ns, Event::Start(e))) => {
                let in_entry = entry.is_some();
                capture = match (namespace(&ns), e.local_name().as_ref()) {
                    (ATOM_NS, b"entry") => {
                        entry = Some(Default::default());
                        None
                    }
                    (ATOM_NS, b"id") if in_entry => Some(Capture::EntryId),
                    (ARXIV_NS, b"comment") if in_entry => Some(Capture::Comment),
                    (ARXIV_NS, b"journal_ref") if in_entry => Some(Capture::JournalRef),
                    (ARXIV_NS, b"doi") if in_entry => Some(Capture::Doi),
                    (ARXIV_NS, b"primary_category") => {
                        if let Some((_, fields)) = entry.as_mut() {
                            fields.primary_category = term(&e);
                        }
                        None
                    }
                    (OPENSEARCH_NS, b"totalResults") => Some(Capture::TotalResults),
                    _ => None,
                };
                text.clear();
            }
            Ok((ns, Event::Empty(e))) => {
                if let ((ARXIV_NS, b"primary_category"), Some((_, fields))) =
                    ((namespace(&ns), e.local_name().as_ref()), entry.as_mut())
                {
                    fields.primary_category = term(&e);
                }
            }
            Ok((_, Event::Text(t))) if capture.is_some() => {
                if let Ok(s) = t.unescape() {
                    text.push_str(&s);
                }
            }
            Ok((_, Event::CData(c))) if capture.is_some() => {
                text.push_str(&String::from_utf8_lossy(&c));
            }
            Ok((_, Event::End(e))) => match capture.take() {
                Some(kind) => {
                    let value = text.trim().to_string();
                    match (kind, entry.as_mut()) {
                        (Capture::TotalResults, _) => out.total_results = value.parse().ok(),
                        (Capture::EntryId, Some((id, _))) => *id = value,
                        (Capture::Comment, Some((_, f))) => f.comment = Some(value),
                        (Capture::JournalRef, Some((_, f))) => f.journal_ref = Some(value),
                        (Capture::Doi, Some((_, f))) => f.doi = Some(value),
                        _ => {}
                    }
                }
                None if e.local_name().as_ref() == b"entry" => {
                    if let Some((id, fields)) = entry.take() {
                        if !id.is_empty() {
                            out.arxiv_fields.insert(id, fields);
                        }
                    }
                }
                None => {}
            },
            Ok((_, Event::Eof)) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    out
}

/// A single failed fetch attempt
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The server answered with a non-success status
    #[error("HTTP status {0}")]
    Status(u16),

    /// Connection, timeout or body read failure
    #[error("Network error: {0}")]
    Network(String),

    /// The body was not a usable feed
    #[error("Feed error: {0}")]
    Feed(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => TransportError::Status(status.as_u16()),
            None => TransportError::Network(err.to_string()),
        }
    }
}

/// Fetches and parses one page of results.
#[async_trait]
pub trait FeedTransport: Send + Sync + std::fmt::Debug {
    /// Perform a single request for `url`.
    async fn fetch_feed(&self, url: &Url) -> Result<Page, TransportError>;
}
