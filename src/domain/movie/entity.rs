use serde::{Deserialize, Serialize};

/// A movie document as stored in the dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default)]
    pub stars: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub votes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searchable_text: Option<String>,
}

impl Movie {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.imdb_rating = Some(rating);
        self
    }

    pub fn with_director(mut self, director: impl Into<String>) -> Self {
        self.director = Some(director.into());
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_stars(mut self, stars: Vec<String>) -> Self {
        self.stars = stars;
        self
    }

    pub fn with_overview(mut self, overview: impl Into<String>) -> Self {
        self.overview = Some(overview.into());
        self
    }

    /// Text used by free-form search; built from the main fields when the
    /// dataset does not carry a precomputed value
    pub fn searchable_text(&self) -> String {
        if let Some(text) = &self.searchable_text {
            return text.clone();
        }

        [
            self.title.as_deref(),
            self.genre.as_deref(),
            self.director.as_deref(),
            self.overview.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// Which fields a list query returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// title, year, rating, genre
    Director,
    /// title, year, rating, director, genre
    Ranking,
    /// title, year, rating, director
    YearRange,
    /// title, year, rating, stars, director
    Actor,
}

/// Reduced view of a movie returned by list queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars: Option<Vec<String>>,
}

impl MovieSummary {
    pub fn project(movie: Movie, projection: Projection) -> Self {
        let (director, genre, stars) = match projection {
            Projection::Director => (None, movie.genre, None),
            Projection::Ranking => (movie.director, movie.genre, None),
            Projection::YearRange => (movie.director, None, None),
            Projection::Actor => (movie.director, None, Some(movie.stars)),
        };

        Self {
            title: movie.title,
            year: movie.year,
            imdb_rating: movie.imdb_rating,
            director,
            genre,
            stars,
        }
    }
}

/// Per-director aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectorStats {
    pub director: Option<String>,
    pub count: usize,
    pub avg_rating: Option<f64>,
}

/// Earliest and latest release years in the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRange {
    pub earliest: Option<i32>,
    pub latest: Option<i32>,
}

/// Aggregate figures over the whole dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieStatistics {
    pub total_movies: usize,
    pub average_rating: Option<f64>,
    pub year_range: YearRange,
    pub top_directors: Vec<DirectorStats>,
}
