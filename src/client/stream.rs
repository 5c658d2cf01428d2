//! Lazy, deduplicated stream of results across pages.

use feed_rs::model::Entry;
use futures_util::stream::Stream;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, warn};

use super::cursor::PageCursor;
use super::{Client, ClientError};
use crate::models::{ArxivFields, ArxivResult, Search};

/// Where a [`ResultStream`] is in its page cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// The buffer is drained; the next call requests a page
    Fetching,
    /// Entries from the last page are waiting to be parsed
    Parsing,
    /// No further results
    Exhausted,
    /// A page request failed; the error has been returned
    Failed,
}

/// Results of one search run, produced a page at a time.
///
/// Pages are only requested when the buffered entries run out, so dropping
/// the stream early stops all further requests. Each run starts from scratch:
/// create a new stream with [`Client::results`] to search again.
#[derive(Debug)]
pub struct ResultStream {
    client: Client,
    search: Search,
    cursor: PageCursor,
    state: StreamState,
    buffer: VecDeque<(Entry, ArxivFields)>,
    seen: HashSet<String>,
    yielded: usize,
    limit: Option<usize>,
    pages_fetched: usize,
    skipped: usize,
}

impl ResultStream {
    pub(crate) fn new(client: Client, search: Search, offset: usize) -> Self {
        let limit = search.limit_from(offset);
        let cursor = PageCursor::new(client.config().page_size, offset, limit);
        let state = if limit == Some(0) {
            StreamState::Exhausted
        } else {
            StreamState::Fetching
        };

        Self {
            client,
            search,
            cursor,
            state,
            buffer: VecDeque::new(),
            seen: HashSet::new(),
            yielded: 0,
            limit,
            pages_fetched: 0,
            skipped: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Results returned so far
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    /// Pages requested so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Entries dropped so far, malformed or duplicate
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Total results the server reported, once a page has said
    pub fn total_results(&self) -> Option<usize> {
        self.cursor.total_results()
    }

    /// Get the next result.
    ///
    /// Returns `None` when the stream is exhausted. A failed page request is
    /// returned once as `Some(Err(_))`, after which the stream is finished.
    pub async fn next(&mut self) -> Option<Result<ArxivResult, ClientError>> {
        loop {
            match self.state {
                StreamState::Exhausted | StreamState::Failed => return None,
                StreamState::Fetching => {
                    if let Err(error) = self.fetch_next_page().await {
                        self.state = StreamState::Failed;
                        return Some(Err(error));
                    }
                }
                StreamState::Parsing => {
                    if self.limit.is_some_and(|limit| self.yielded >= limit) {
                        self.finish();
                        continue;
                    }
                    let Some((entry, fields)) = self.buffer.pop_front() else {
                        self.state = StreamState::Fetching;
                        continue;
                    };
                    if let Some(result) = self.accept(&entry, &fields) {
                        self.yielded += 1;
                        return Some(Ok(result));
                    }
                }
            }
        }
    }

    /// Parse an entry, returning it only if it is new to this stream.
    fn accept(&mut self, entry: &Entry, fields: &ArxivFields) -> Option<ArxivResult> {
        match ArxivResult::from_arxiv_entry(entry, fields) {
            Ok(result) => {
                if self.seen.insert(result.entry_id.clone()) {
                    Some(result)
                } else {
                    debug!("Skipping duplicate result {}", result.entry_id);
                    self.skipped += 1;
                    None
                }
            }
            Err(e) => {
                warn!("Skipping partial result {:?}: {}", entry.id, e);
                self.skipped += 1;
                None
            }
        }
    }

    async fn fetch_next_page(&mut self) -> Result<(), ClientError> {
        let Some(window) = self.cursor.next_window(self.yielded) else {
            self.finish();
            return Ok(());
        };

        let url = self
            .client
            .format_url(&self.search, window.start, window.size);
        debug!(
            "Fetching page {} (start {}, size {})",
            self.pages_fetched + 1,
            window.start,
            window.size
        );

        let page = self.client.fetcher().fetch_page(&url).await?;
        self.pages_fetched += 1;
        self.cursor.advance(window, page.len(), page.total_results);

        if page.is_empty() {
            self.finish();
        } else {
            self.buffer.extend(page.into_entries());
            self.state = StreamState::Parsing;
        }
        Ok(())
    }

    fn finish(&mut self) {
        debug!(
            "Result stream finished: {} results from {} pages, {} skipped",
            self.yielded, self.pages_fetched, self.skipped
        );
        self.buffer.clear();
        self.state = StreamState::Exhausted;
    }

    /// Collect all remaining results into a Vec.
    ///
    /// Stops at the first request failure and returns it; results already
    /// yielded are lost in that case. Use [`ResultStream::next`] to keep them.
    pub async fn collect_all(mut self) -> Result<Vec<ArxivResult>, ClientError> {
        let mut results = Vec::new();
        while let Some(result) = self.next().await {
            results.push(result?);
        }
        Ok(results)
    }

    /// Adapt into a [`Stream`].
    pub fn into_stream(mut self) -> impl Stream<Item = Result<ArxivResult, ClientError>> {
        async_stream::stream! {
            while let Some(result) = self.next().await {
                yield result;
            }
        }
    }
}
