//! In-memory movie collection loaded from a JSON dataset

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use tracing::info;

use crate::domain::movie::{
    DirectorStats, Movie, MovieField, MovieFilter, MovieQuery, MovieRepository, MovieStatistics,
    SortOrder, YearRange,
};
use crate::domain::DomainError;

/// Read-only movie collection held in memory
///
/// The dataset is a JSON array of movie documents. Queries scan the whole
/// collection, which is fine for datasets of a few thousand documents.
#[derive(Debug, Default)]
pub struct InMemoryMovieRepository {
    movies: Vec<Movie>,
}

impl InMemoryMovieRepository {
    pub fn with_movies(movies: Vec<Movie>) -> Self {
        Self { movies }
    }

    /// Loads the dataset file
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DomainError::not_found(format!("Dataset '{}' not found", path.display()))
            } else {
                DomainError::storage(format!("Failed to read '{}': {}", path.display(), e))
            }
        })?;

        let movies: Vec<Movie> = serde_json::from_str(&content).map_err(|e| {
            DomainError::storage(format!("Invalid dataset '{}': {}", path.display(), e))
        })?;

        info!(path = %path.display(), movies = movies.len(), "Loaded movie dataset");
        Ok(Self::with_movies(movies))
    }

    fn compile(pattern: &str) -> Result<Regex, DomainError> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| DomainError::validation(format!("Invalid search pattern '{}': {}", pattern, e)))
    }

    fn field_matches(movie: &Movie, field: MovieField, regex: &Regex) -> bool {
        match field {
            MovieField::Title => movie.title.as_deref().is_some_and(|t| regex.is_match(t)),
            MovieField::Director => movie.director.as_deref().is_some_and(|d| regex.is_match(d)),
            MovieField::Genre => movie.genre.as_deref().is_some_and(|g| regex.is_match(g)),
            MovieField::Stars => movie.stars.iter().any(|s| regex.is_match(s)),
            MovieField::SearchableText => regex.is_match(&movie.searchable_text()),
        }
    }
}

/// Highest rating first; unrated movies sort last
fn by_rating_desc(a: &Movie, b: &Movie) -> Ordering {
    match (a.imdb_rating, b.imdb_rating) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| round2(sum / count as f64))
}

#[async_trait]
impl MovieRepository for InMemoryMovieRepository {
    async fn find(&self, query: &MovieQuery) -> Result<Vec<Movie>, DomainError> {
        let mut found: Vec<Movie> = match &query.filter {
            MovieFilter::All => self.movies.clone(),
            MovieFilter::Matches { field, pattern } => {
                let regex = Self::compile(pattern)?;
                self.movies
                    .iter()
                    .filter(|m| Self::field_matches(m, *field, &regex))
                    .cloned()
                    .collect()
            }
            MovieFilter::YearBetween { start, end } => self
                .movies
                .iter()
                .filter(|m| m.year.is_some_and(|y| y >= *start && y <= *end))
                .cloned()
                .collect(),
        };

        if query.sort == SortOrder::RatingDesc {
            found.sort_by(by_rating_desc);
        }

        if let Some(limit) = query.limit {
            found.truncate(limit);
        }

        Ok(found)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.movies.len())
    }

    async fn statistics(&self, top_directors: usize) -> Result<MovieStatistics, DomainError> {
        let years = self.movies.iter().filter_map(|m| m.year);
        let year_range = YearRange {
            earliest: years.clone().min(),
            latest: years.max(),
        };

        let mut groups: HashMap<Option<&str>, Vec<Option<f64>>> = HashMap::new();
        for movie in &self.movies {
            groups
                .entry(movie.director.as_deref())
                .or_default()
                .push(movie.imdb_rating);
        }

        let mut directors: Vec<DirectorStats> = groups
            .into_iter()
            .map(|(director, ratings)| DirectorStats {
                director: director.map(str::to_string),
                count: ratings.len(),
                avg_rating: average(ratings.into_iter().flatten()),
            })
            .collect();

        directors.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.director.cmp(&b.director)));
        directors.truncate(top_directors);

        Ok(MovieStatistics {
            total_movies: self.movies.len(),
            average_rating: average(self.movies.iter().filter_map(|m| m.imdb_rating)),
            year_range,
            top_directors: directors,
        })
    }
}
