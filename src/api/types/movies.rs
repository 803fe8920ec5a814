//! Request and response shapes of the movie endpoints

use serde::{Deserialize, Serialize};

use crate::domain::CacheStats;

pub const MIN_YEAR: i32 = 1800;
pub const MAX_YEAR: i32 = 2100;
pub const DEFAULT_TOP_LIMIT: usize = 10;
pub const MAX_TOP_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct TitleParams {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct NameParams {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct GenreParams {
    pub genre: String,
}

#[derive(Debug, Deserialize)]
pub struct TopParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct YearRangeParams {
    pub start: i32,
    pub end: i32,
}

#[derive(Debug, Deserialize)]
pub struct ClearParams {
    pub pattern: Option<String>,
}

/// Either the matching documents or a "no movies" message
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MovieList<T> {
    Movies(Vec<T>),
    Empty { message: String },
}

impl<T> MovieList<T> {
    pub fn new(items: Vec<T>, empty_message: impl FnOnce() -> String) -> Self {
        if items.is_empty() {
            Self::Empty {
                message: empty_message(),
            }
        } else {
            Self::Movies(items)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearResponse {
    pub message: String,
    pub keys_deleted: usize,
    pub pattern: String,
}

/// `GET /api/health` body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    pub database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movies: Option<usize>,
    pub agent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub cache: CacheStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_list_serialization() {
        let empty: MovieList<String> = MovieList::new(vec![], || "No movies found".to_string());
        assert_eq!(
            serde_json::to_value(&empty).unwrap(),
            serde_json::json!({"message": "No movies found"})
        );

        let movies = MovieList::new(vec!["Heat"], || unreachable!());
        assert_eq!(
            serde_json::to_value(&movies).unwrap(),
            serde_json::json!(["Heat"])
        );
    }

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Unhealthy).unwrap(),
            "\"unhealthy\""
        );
    }
}
