//! Core data models for searches, queries and results.

mod query;
mod result;
mod search;

pub use query::{Attribute, Operator, Query};
pub use result::{ArxivFields, ArxivResult, Author, Link, MissingFieldError};
pub use search::{Search, SortCriterion, SortOrder};
