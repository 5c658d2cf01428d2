//! Composable arXiv query strings.
//!
//! See <https://arxiv.org/help/api/user-manual#query_details> for the field
//! prefixes and boolean operators the API understands.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Field prefix used to scope a term to part of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Title,
    Author,
    Abstract,
    Comment,
    JournalReference,
    Category,
    ReportNumber,
    /// Prefer `Search::id_list` when looking up known papers.
    Id,
    All,
}

impl Attribute {
    /// Every attribute, in API documentation order.
    pub const ALL: [Attribute; 9] = [
        Attribute::Title,
        Attribute::Author,
        Attribute::Abstract,
        Attribute::Comment,
        Attribute::JournalReference,
        Attribute::Category,
        Attribute::ReportNumber,
        Attribute::Id,
        Attribute::All,
    ];

    /// The prefix the API expects, e.g. `ti` or `au`.
    pub fn prefix(&self) -> &'static str {
        match self {
            Attribute::Title => "ti",
            Attribute::Author => "au",
            Attribute::Abstract => "abs",
            Attribute::Comment => "co",
            Attribute::JournalReference => "jr",
            Attribute::Category => "cat",
            Attribute::ReportNumber => "rn",
            Attribute::Id => "id",
            Attribute::All => "all",
        }
    }
}

/// Boolean operator joining two queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
    AndNot,
}

impl Operator {
    fn keyword(&self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::AndNot => "ANDNOT",
        }
    }
}

/// A query string, built either from raw text or by composing other queries.
///
/// Composition always parenthesizes both sides, so operator precedence on the
/// server never changes the meaning of a composed query.
///
/// ```
/// use arxiv_pager::models::{Attribute, Query};
///
/// let q = Query::attribute(Attribute::Title, "quantum").and(Query::new("spin"));
/// assert_eq!(q.as_str(), r#"(ti:"quantum") AND (spin)"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query(String);

impl Query {
    /// Wrap raw query text as-is.
    pub fn new(query: impl Into<String>) -> Self {
        Self(query.into())
    }

    /// Scope a quoted value to a single field.
    pub fn attribute(attribute: Attribute, value: &str) -> Self {
        Self(format!("{}:\"{}\"", attribute.prefix(), value))
    }

    /// `(self) AND (other)`
    pub fn and(self, other: Query) -> Self {
        self.compose(other, Operator::And)
    }

    /// `(self) OR (other)`
    pub fn or(self, other: Query) -> Self {
        self.compose(other, Operator::Or)
    }

    /// `(self) ANDNOT (other)`; order matters.
    pub fn and_not(self, other: Query) -> Self {
        self.compose(other, Operator::AndNot)
    }

    fn compose(self, other: Query, operator: Operator) -> Self {
        Self(format!("({}) {} ({})", self.0, operator.keyword(), other.0))
    }

    /// The query text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the query has no text.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Query {
    fn from(query: &str) -> Self {
        Self::new(query)
    }
}

impl From<String> for Query {
    fn from(query: String) -> Self {
        Self(query)
    }
}

impl From<Query> for String {
    fn from(query: Query) -> Self {
        query.0
    }
}
