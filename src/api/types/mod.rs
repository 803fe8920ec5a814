//! REST API types

pub mod error;
pub mod extract;
pub mod movies;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use extract::{Json, Query};
pub use movies::{
    ClearParams, ClearResponse, GenreParams, HealthResponse, HealthStatus, MovieList,
    NameParams, QueryRequest, QueryResponse, TitleParams, TopParams, YearRangeParams,
};
