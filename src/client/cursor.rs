//! Pagination windows over a result set.

/// One page request: `size` results starting at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub size: usize,
}

/// Computes the page windows covering `[offset, offset + limit)`.
///
/// Windows advance by the number of entries each page actually returned, not
/// by the nominal page size. A page shorter than requested, an empty page, or
/// reaching the reported total ends the sequence.
#[derive(Debug, Clone)]
pub struct PageCursor {
    page_size: usize,
    next_start: usize,
    limit: Option<usize>,
    total_results: Option<usize>,
    finished: bool,
}

impl PageCursor {
    /// Start at `offset`, yielding at most `limit` results (`None` is unbounded).
    pub fn new(page_size: usize, offset: usize, limit: Option<usize>) -> Self {
        Self {
            page_size: page_size.max(1),
            next_start: offset,
            limit,
            total_results: None,
            finished: false,
        }
    }

    /// The next window to request, given how many results have been yielded
    /// so far; `None` when pagination is over.
    pub fn next_window(&self, yielded: usize) -> Option<Window> {
        if self.finished {
            return None;
        }
        if self
            .total_results
            .is_some_and(|total| self.next_start >= total)
        {
            return None;
        }

        let size = match self.limit {
            Some(limit) => match limit.saturating_sub(yielded) {
                0 => return None,
                remaining => remaining.min(self.page_size),
            },
            None => self.page_size,
        };

        Some(Window {
            start: self.next_start,
            size,
        })
    }

    /// Record the outcome of fetching `window`.
    pub fn advance(&mut self, window: Window, returned: usize, total_results: Option<usize>) {
        self.next_start = window.start.saturating_add(returned);
        if total_results.is_some() {
            self.total_results = total_results;
        }
        if returned == 0 || returned < window.size {
            self.finished = true;
        }
    }

    /// Whether an end-of-results signal has been seen
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Total reported by the most recent page that carried one
    pub fn total_results(&self) -> Option<usize> {
        self.total_results
    }
}
