//! Mock transport for testing purposes.
//!
//! [`MockTransport::with_corpus`] serves a fixed, ordered corpus the way the
//! arXiv API does: `start` / `max_results` select a window, `id_list` selects
//! papers by ID, and unknown IDs come back as a placeholder entry that lacks
//! the required result fields. Every requested URL is recorded.

use async_trait::async_trait;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use url::Url;

use super::{FeedTransport, Page, TransportError};

type Handler = dyn Fn(&Url) -> Result<Page, TransportError> + Send + Sync;

/// An in-memory [`FeedTransport`]
pub struct MockTransport {
    handler: Box<Handler>,
    requests: Mutex<Vec<Url>>,
}

impl MockTransport {
    /// Answer every request with `handler`.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Url) -> Result<Page, TransportError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Serve `corpus` in order.
    pub fn with_corpus(corpus: Vec<MockEntry>) -> Self {
        Self::new(move |url| {
            let (start, max_results) = window(url);
            let ids = id_list(url);

            let selected: Vec<MockEntry> = if ids.is_empty() {
                corpus.clone()
            } else {
                ids.iter()
                    .map(|id| {
                        corpus
                            .iter()
                            .find(|e| &e.id == id)
                            .cloned()
                            .unwrap_or_else(|| MockEntry::malformed(id))
                    })
                    .collect()
            };

            let end = start.saturating_add(max_results).min(selected.len());
            let page = selected.get(start..end).unwrap_or_default();
            Page::from_atom(render_feed(page, selected.len()).as_bytes())
        })
    }

    /// Fail every request with `status`.
    pub fn failing(status: u16) -> Self {
        Self::new(move |_| Err(TransportError::Status(status)))
    }

    /// Every URL requested so far, in order
    pub fn requests(&self) -> Vec<Url> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests made so far
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransport")
            .field("requests", &self.request_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl FeedTransport for MockTransport {
    async fn fetch_feed(&self, url: &Url) -> Result<Page, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.clone());
        (self.handler)(url)
    }
}

/// A paper in a mock corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockEntry {
    /// Short ID without version, e.g. `2301.00001`
    pub id: String,
    /// `None` renders the entry without title or dates
    pub title: Option<String>,
}

impl MockEntry {
    /// A complete entry
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            title: Some(format!("Paper {}", id)),
            id,
        }
    }

    /// An entry missing its required fields
    pub fn malformed(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
        }
    }

    /// `n` complete entries with IDs `2301.00000`, `2301.00001`, ...
    pub fn corpus(n: usize) -> Vec<Self> {
        (0..n).map(|i| Self::new(format!("2301.{:05}", i))).collect()
    }

    /// The `entry_id` a parsed result for this entry carries
    pub fn entry_id(&self) -> String {
        format!("http://arxiv.org/abs/{}v1", self.id)
    }
}

/// `(start, max_results)` of a request URL; missing values read as `(0, 10)`.
pub fn window(url: &Url) -> (usize, usize) {
    let param = |name: &str, default: usize| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(default)
    };
    (param("start", 0), param("max_results", 10))
}

/// IDs in the `id_list` parameter of a request URL
pub fn id_list(url: &Url) -> Vec<String> {
    url.query_pairs()
        .find(|(k, _)| k == "id_list")
        .map(|(_, v)| {
            v.split(',')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Render entries as an arXiv-style Atom document.
pub fn render_feed(entries: &[MockEntry], total_results: usize) -> String {
    let mut xml = String::from(concat!(
        r#"<?xml version="1.0" encoding="UTF-8"?>"#,
        "\n",
        r#"<feed xmlns="http://www.w3.org/2005/Atom" xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/" xmlns:arxiv="http://arxiv.org/schemas/atom">"#,
        "\n<title>ArXiv Query</title>\n<id>http://arxiv.org/api/mock</id>\n",
        "<updated>2023-01-15T00:00:00Z</updated>\n",
    ));
    xml.push_str(&format!(
        "<opensearch:totalResults>{}</opensearch:totalResults>\n",
        total_results
    ));

    for entry in entries {
        match &entry.title {
            Some(title) => xml.push_str(&format!(
                concat!(
                    "<entry>\n",
                    "<id>{entry_id}</id>\n",
                    "<updated>2023-01-15T10:00:00Z</updated>\n",
                    "<published>2023-01-15T10:00:00Z</published>\n",
                    "<title>{title}</title>\n",
                    "<summary>Abstract of {id}</summary>\n",
                    "<author><name>Mock Author</name></author>\n",
                    "<arxiv:comment>Comment on {id}</arxiv:comment>\n",
                    r#"<link href="{entry_id}" rel="alternate" type="text/html"/>"#,
                    "\n",
                    r#"<link title="pdf" href="http://arxiv.org/pdf/{id}v1" rel="related" type="application/pdf"/>"#,
                    "\n",
                    r#"<arxiv:primary_category term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>"#,
                    "\n",
                    r#"<category term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>"#,
                    "\n</entry>\n",
                ),
                entry_id = entry.entry_id(),
                title = title,
                id = entry.id,
            )),
            None => xml.push_str(&format!(
                concat!(
                    "<entry>\n",
                    "<id>http://arxiv.org/api/errors#incorrect_id_format_for_{id}</id>\n",
                    "<summary>incorrect id format for {id}</summary>\n",
                    "</entry>\n",
                ),
                id = entry.id,
            )),
        }
    }

    xml.push_str("</feed>\n");
    xml
}
