use std::fmt::Debug;

use async_trait::async_trait;

use super::{Movie, MovieStatistics};
use crate::domain::DomainError;

/// Text fields that support pattern matching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieField {
    Title,
    Director,
    Genre,
    /// Matches when any star matches
    Stars,
    SearchableText,
}

/// Document filter
#[derive(Debug, Clone, PartialEq)]
pub enum MovieFilter {
    All,
    /// Case-insensitive regular expression match on a text field
    Matches { field: MovieField, pattern: String },
    /// Inclusive release year range
    YearBetween { start: i32, end: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Natural,
    /// Highest rating first, unrated movies last
    RatingDesc,
}

/// A filtered, sorted and limited lookup
#[derive(Debug, Clone, PartialEq)]
pub struct MovieQuery {
    pub filter: MovieFilter,
    pub sort: SortOrder,
    pub limit: Option<usize>,
}

impl MovieQuery {
    pub fn new(filter: MovieFilter) -> Self {
        Self {
            filter,
            sort: SortOrder::Natural,
            limit: None,
        }
    }

    pub fn matching(field: MovieField, pattern: impl Into<String>) -> Self {
        Self::new(MovieFilter::Matches {
            field,
            pattern: pattern.into(),
        })
    }

    pub fn sorted_by_rating(mut self) -> Self {
        self.sort = SortOrder::RatingDesc;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Document store holding the movie collection
#[async_trait]
pub trait MovieRepository: Send + Sync + Debug {
    /// Runs a query; an invalid pattern is a validation error
    async fn find(&self, query: &MovieQuery) -> Result<Vec<Movie>, DomainError>;

    /// Number of documents in the collection
    async fn count(&self) -> Result<usize, DomainError>;

    /// Aggregates over the whole collection
    async fn statistics(&self, top_directors: usize) -> Result<MovieStatistics, DomainError>;
}
