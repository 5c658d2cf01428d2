//! Search request models.

use serde::{Deserialize, Serialize};

use super::Query;
use crate::client::ClientError;

/// Sort order for search results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    /// Value of the `sortOrder` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        }
    }
}

/// Sort field for search results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortCriterion {
    #[default]
    Relevance,
    LastUpdatedDate,
    SubmittedDate,
}

impl SortCriterion {
    /// Value of the `sortBy` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            SortCriterion::Relevance => "relevance",
            SortCriterion::LastUpdatedDate => "lastUpdatedDate",
            SortCriterion::SubmittedDate => "submittedDate",
        }
    }
}

/// A logical search, independent of how it is paginated.
///
/// Either `query`, `id_list`, or both may be set. When both are set the API
/// returns the listed papers that also match the query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Search {
    /// Query string; empty when searching by ID only
    pub query: Query,

    /// Explicit arXiv IDs to fetch
    pub id_list: Vec<String>,

    /// Cap on the number of results ever yielded; `None` is unbounded
    pub max_results: Option<usize>,

    /// Sort by field
    pub sort_by: SortCriterion,

    /// Sort order
    pub sort_order: SortOrder,
}

impl Search {
    /// Create a new search for a query string
    pub fn new(query: impl Into<Query>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Create a search for explicit IDs
    pub fn by_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id_list: ids.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Set maximum results
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }

    /// Restrict to explicit IDs
    pub fn id_list<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.id_list = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Set sort by
    pub fn sort_by(mut self, sort: SortCriterion) -> Self {
        self.sort_by = sort;
        self
    }

    /// Set sort order
    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    /// Number of results a run starting at `offset` may yield, or `None` if
    /// the search is unbounded.
    pub fn limit_from(&self, offset: usize) -> Option<usize> {
        self.max_results.map(|max| max.saturating_sub(offset))
    }

    /// Reject searches the API cannot answer.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.query.is_empty() && self.id_list.is_empty() {
            return Err(ClientError::InvalidRequest(
                "search needs a query or at least one id".to_string(),
            ));
        }
        if let Some(id) = self.id_list.iter().find(|id| id.trim().is_empty()) {
            return Err(ClientError::InvalidRequest(format!(
                "invalid empty id in id_list: {id:?}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_defaults() {
        let search = Search::new("testing");
        assert_eq!(search.query.as_str(), "testing");
        assert!(search.id_list.is_empty());
        assert_eq!(search.max_results, None);
        assert_eq!(search.sort_by, SortCriterion::Relevance);
        assert_eq!(search.sort_order, SortOrder::Descending);
    }

    #[test]
    fn test_limit_from() {
        let search = Search::new("testing").max_results(10);
        assert_eq!(search.limit_from(0), Some(10));
        assert_eq!(search.limit_from(4), Some(6));
        assert_eq!(search.limit_from(10), Some(0));
        assert_eq!(search.limit_from(11), Some(0));
        assert_eq!(Search::new("testing").limit_from(50), None);
    }

    #[test]
    fn test_validate() {
        assert!(Search::new("testing").validate().is_ok());
        assert!(Search::by_ids(["1707.08567"]).validate().is_ok());
        assert!(matches!(
            Search::default().validate(),
            Err(ClientError::InvalidRequest(_))
        ));
        assert!(Search::by_ids(["1707.08567", " "]).validate().is_err());
    }

    #[test]
    fn test_sort_parameter_values() {
        assert_eq!(SortCriterion::SubmittedDate.as_str(), "submittedDate");
        assert_eq!(SortCriterion::LastUpdatedDate.as_str(), "lastUpdatedDate");
        assert_eq!(SortOrder::Ascending.as_str(), "ascending");
    }
}
