//! Typed search results parsed from arXiv Atom entries.

use chrono::{DateTime, Utc};
use feed_rs::model::Entry;
use serde::{Deserialize, Serialize};

/// An entry lacked a field every result must carry.
///
/// Only the offending entry is dropped; the rest of its page is still used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("feed entry is missing required field `{field}`")]
pub struct MissingFieldError {
    pub field: &'static str,
}

impl MissingFieldError {
    fn new(field: &'static str) -> Self {
        Self { field }
    }
}

/// A paper author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
}

/// A link attached to a result (abstract page, PDF, DOI, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub title: Option<String>,
    pub rel: Option<String>,
    pub content_type: Option<String>,
}

/// Elements from the arXiv Atom extension namespace, which feed-rs does not
/// keep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArxivFields {
    pub comment: Option<String>,
    pub journal_ref: Option<String>,
    pub primary_category: Option<String>,
    pub doi: Option<String>,
}

/// One search result.
///
/// `entry_id` (the abstract URL including version, e.g.
/// `http://arxiv.org/abs/1707.08567v1`) identifies a result within a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArxivResult {
    pub entry_id: String,
    pub updated: DateTime<Utc>,
    pub published: DateTime<Utc>,
    pub title: String,
    pub authors: Vec<Author>,
    pub summary: String,
    pub comment: Option<String>,
    pub journal_ref: Option<String>,
    pub doi: Option<String>,
    pub primary_category: Option<String>,
    pub categories: Vec<String>,
    pub links: Vec<Link>,
    pub pdf_url: Option<String>,
}

impl ArxivResult {
    /// Parse a feed entry.
    ///
    /// The id, title and both timestamps are required. arXiv answers lookups
    /// of IDs it does not know with a placeholder entry that has none of them.
    /// Without the `arxiv:` elements the primary category is the first
    /// `<category>`; use [`ArxivResult::from_arxiv_entry`] when they are known.
    pub fn from_feed_entry(entry: &Entry) -> Result<Self, MissingFieldError> {
        if entry.id.trim().is_empty() {
            return Err(MissingFieldError::new("id"));
        }
        let title = entry
            .title
            .as_ref()
            .map(|t| collapse_whitespace(&t.content))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| MissingFieldError::new("title"))?;
        let updated = entry.updated.ok_or_else(|| MissingFieldError::new("updated"))?;
        let published = entry
            .published
            .ok_or_else(|| MissingFieldError::new("published"))?;

        let links: Vec<Link> = entry
            .links
            .iter()
            .map(|l| Link {
                href: l.href.clone(),
                title: l.title.clone(),
                rel: l.rel.clone(),
                content_type: l.media_type.clone(),
            })
            .collect();

        let pdf_url = links
            .iter()
            .find(|l| l.title.as_deref() == Some("pdf"))
            .map(|l| l.href.clone());

        let doi = links
            .iter()
            .find(|l| l.title.as_deref() == Some("doi"))
            .map(|l| {
                l.href
                    .split_once("doi.org/")
                    .map_or(l.href.as_str(), |(_, doi)| doi)
                    .to_string()
            });

        let categories: Vec<String> = entry.categories.iter().map(|c| c.term.clone()).collect();

        Ok(Self {
            entry_id: entry.id.trim().to_string(),
            updated,
            published,
            title,
            authors: entry
                .authors
                .iter()
                .map(|a| Author {
                    name: a.name.trim().to_string(),
                })
                .collect(),
            summary: entry
                .summary
                .as_ref()
                .map(|s| s.content.trim().to_string())
                .unwrap_or_default(),
            comment: None,
            journal_ref: None,
            doi,
            primary_category: categories.first().cloned(),
            categories,
            links,
            pdf_url,
        })
    }

    /// Parse a feed entry together with its `arxiv:` elements.
    ///
    /// `arxiv:primary_category` and `arxiv:doi` take precedence over the
    /// values derived from the plain Atom entry.
    pub fn from_arxiv_entry(entry: &Entry, fields: &ArxivFields) -> Result<Self, MissingFieldError> {
        let mut result = Self::from_feed_entry(entry)?;
        result.comment = fields.comment.clone();
        result.journal_ref = fields.journal_ref.clone();
        if fields.primary_category.is_some() {
            result.primary_category = fields.primary_category.clone();
        }
        if fields.doi.is_some() {
            result.doi = fields.doi.clone();
        }
        Ok(result)
    }

    /// The ID after `/abs/`, e.g. `1701.05517v1` or `quant-ph/0201082v1`.
    pub fn short_id(&self) -> &str {
        self.entry_id
            .split_once("/abs/")
            .map_or(self.entry_id.as_str(), |(_, id)| id)
    }

    /// Author names joined with `", "`.
    pub fn author_names(&self) -> String {
        self.authors
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
