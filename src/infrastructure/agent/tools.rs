//! Query service operations exposed as agent tools

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::domain::{clean_input, DomainError, Tool};
use crate::infrastructure::services::MovieQueryService;

/// Default for `get_top_rated_movies` when the input is not a number
const DEFAULT_TOP_RATED: usize = 10;

/// The eight movie operations the agent can call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieToolKind {
    SearchByTitle,
    ByDirector,
    TopRated,
    ByGenre,
    ByYearRange,
    WithActor,
    Statistics,
    AdvancedSearch,
}

impl MovieToolKind {
    pub const ALL: [MovieToolKind; 8] = [
        MovieToolKind::SearchByTitle,
        MovieToolKind::ByDirector,
        MovieToolKind::TopRated,
        MovieToolKind::ByGenre,
        MovieToolKind::ByYearRange,
        MovieToolKind::WithActor,
        MovieToolKind::Statistics,
        MovieToolKind::AdvancedSearch,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::SearchByTitle => "search_movies_by_title",
            Self::ByDirector => "get_movies_by_director",
            Self::TopRated => "get_top_rated_movies",
            Self::ByGenre => "get_movies_by_genre",
            Self::ByYearRange => "get_movies_by_year_range",
            Self::WithActor => "get_movies_with_actor",
            Self::Statistics => "get_movie_statistics",
            Self::AdvancedSearch => "advanced_search",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::SearchByTitle => {
                "Search for movies by title. Input should be a movie title or partial title."
            }
            Self::ByDirector => {
                "Get all movies by a specific director. Input should be the director's name."
            }
            Self::TopRated => {
                "Get top rated movies. Input should be the number of movies to return (default 10)."
            }
            Self::ByGenre => {
                "Get movies by genre. Input should be a genre like Action, Drama, Comedy, etc."
            }
            Self::ByYearRange => {
                "Get movies within a year range. Input should be start_year, end_year (e.g., 1990, 2000)."
            }
            Self::WithActor => {
                "Get movies featuring a specific actor. Input should be the actor's name."
            }
            Self::Statistics => {
                "Get statistical information about the movie database. No input required, just use 'stats' as input."
            }
            Self::AdvancedSearch => {
                "Advanced search across all movie fields. Use for complex queries about plot, themes, or combinations of criteria."
            }
        }
    }

    /// Text returned when a query matched nothing
    pub fn empty_message(&self, input: &str) -> String {
        match self {
            Self::SearchByTitle | Self::AdvancedSearch => {
                format!("No movies found matching '{}'", input)
            }
            Self::ByDirector => format!("No movies found for director '{}'", input),
            Self::ByGenre => format!("No movies found for genre '{}'", input),
            Self::WithActor => format!("No movies found with actor '{}'", input),
            Self::ByYearRange => match parse_year_range(input) {
                Ok((start, end)) => format!("No movies found between {} and {}", start, end),
                Err(_) => format!("No movies found between {}", input),
            },
            Self::TopRated | Self::Statistics => "No movies found".to_string(),
        }
    }

    /// Prefix of the text returned when a query failed
    pub fn error_message(&self, error: &DomainError) -> String {
        let action = match self {
            Self::SearchByTitle => "searching movies",
            Self::ByDirector => "getting movies by director",
            Self::TopRated => "getting top rated movies",
            Self::ByGenre => "getting movies by genre",
            Self::ByYearRange => "getting movies by year range",
            Self::WithActor => "getting movies with actor",
            Self::Statistics => "getting statistics",
            Self::AdvancedSearch => "in advanced search",
        };

        format!("Error {}: {}", action, error)
    }
}

/// Parses `"start, end"` as typed by the model
pub fn parse_year_range(input: &str) -> Result<(i32, i32), DomainError> {
    let years: Vec<&str> = clean_input(input).split(',').map(clean_input).collect();

    match years.as_slice() {
        [start, end] => {
            let parse = |year: &str| {
                year.parse::<i32>().map_err(|_| {
                    DomainError::validation(format!("'{}' is not a valid year", year))
                })
            };
            Ok((parse(start)?, parse(end)?))
        }
        _ => Err(DomainError::validation(format!(
            "expected 'start_year, end_year', got '{}'",
            input
        ))),
    }
}

/// One query service operation wrapped as a [`Tool`]
#[derive(Debug, Clone)]
pub struct MovieTool {
    kind: MovieToolKind,
    service: Arc<MovieQueryService>,
}

impl MovieTool {
    pub fn new(kind: MovieToolKind, service: Arc<MovieQueryService>) -> Self {
        Self { kind, service }
    }

    async fn run(&self, input: &str) -> Result<Option<String>, DomainError> {
        let service = &self.service;

        match self.kind {
            MovieToolKind::SearchByTitle => render(service.search_movies_by_title(input).await?),
            MovieToolKind::ByDirector => render(service.get_movies_by_director(input).await?),
            MovieToolKind::TopRated => {
                let limit = input.parse().unwrap_or(DEFAULT_TOP_RATED);
                render(service.get_top_rated_movies(limit).await?)
            }
            MovieToolKind::ByGenre => render(service.get_movies_by_genre(input).await?),
            MovieToolKind::ByYearRange => {
                let (start, end) = parse_year_range(input)?;
                render(service.get_movies_by_year_range(start, end).await?)
            }
            MovieToolKind::WithActor => render(service.get_movies_with_actor(input).await?),
            MovieToolKind::Statistics => pretty(&service.get_movie_statistics().await?).map(Some),
            MovieToolKind::AdvancedSearch => render(service.advanced_search(input).await?),
        }
    }
}

/// Pretty JSON for a non-empty list, `None` for an empty one
fn render<T: Serialize>(items: Vec<T>) -> Result<Option<String>, DomainError> {
    if items.is_empty() {
        return Ok(None);
    }
    pretty(&items).map(Some)
}

fn pretty<T: Serialize + ?Sized>(value: &T) -> Result<String, DomainError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| DomainError::internal(format!("Failed to render result: {}", e)))
}

#[async_trait]
impl Tool for MovieTool {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn description(&self) -> &str {
        self.kind.description()
    }

    async fn call(&self, input: &str) -> String {
        let input = clean_input(input);
        debug!(tool = self.kind.name(), input = %input, "Running movie tool");

        match self.run(input).await {
            Ok(Some(output)) => output,
            Ok(None) => self.kind.empty_message(input),
            Err(e) => self.kind.error_message(&e),
        }
    }
}

/// All movie tools over one query service
pub fn movie_tools(service: Arc<MovieQueryService>) -> Vec<Arc<dyn Tool>> {
    MovieToolKind::ALL
        .into_iter()
        .map(|kind| Arc::new(MovieTool::new(kind, service.clone())) as Arc<dyn Tool>)
        .collect()
}
