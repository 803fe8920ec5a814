//! Domain layer - Core business logic and entities

pub mod cache;
pub mod error;
pub mod llm;
pub mod movie;
pub mod tool;

pub use cache::{
    BackendInfo, Cache, CacheExt, CacheKeyParams, CacheStats, GlobPattern, KeyCodec,
    DEFAULT_NAMESPACE,
};
pub use error::DomainError;
pub use llm::{FinishReason, LlmProvider, LlmRequest, LlmResponse, Message, MessageRole, Usage};
pub use movie::{
    DirectorStats, Movie, MovieField, MovieFilter, MovieQuery, MovieRepository,
    MovieStatistics, MovieSummary, Projection, SortOrder, YearRange,
};
pub use tool::{clean_input, Tool};
