//! Movie domain - documents, projections and the document store contract

mod entity;
mod repository;

pub use entity::{
    DirectorStats, Movie, MovieStatistics, MovieSummary, Projection, YearRange,
};
pub use repository::{MovieField, MovieFilter, MovieQuery, MovieRepository, SortOrder};
