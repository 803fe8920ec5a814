//! Movie lookup endpoints

use axum::extract::State;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::movies::{DEFAULT_TOP_LIMIT, MAX_TOP_LIMIT, MAX_YEAR, MIN_YEAR};
use crate::api::types::{
    ApiError, GenreParams, Json, MovieList, NameParams, Query, TitleParams, TopParams,
    YearRangeParams,
};
use crate::domain::{Movie, MovieStatistics, MovieSummary};
use crate::infrastructure::agent::MovieToolKind;

type ListResult<T> = Result<Json<MovieList<T>>, ApiError>;

fn required<'a>(value: &'a str, param: &str) -> Result<&'a str, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::bad_request(format!("'{}' must not be empty", param)).with_param(param));
    }
    Ok(value)
}

fn validate_year(year: i32, param: &str) -> Result<i32, ApiError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ApiError::bad_request(format!(
            "'{}' must be between {} and {}",
            param, MIN_YEAR, MAX_YEAR
        ))
        .with_param(param));
    }
    Ok(year)
}

/// GET /api/movies/search?title=
pub async fn search_by_title(
    State(state): State<AppState>,
    Query(params): Query<TitleParams>,
) -> ListResult<Movie> {
    let title = required(&params.title, "title")?;
    debug!(title = %title, "Searching movies by title");

    let movies = state.query_service.search_movies_by_title(title).await?;
    Ok(Json(MovieList::new(movies, || {
        MovieToolKind::SearchByTitle.empty_message(title)
    })))
}

/// GET /api/movies/director?name=
pub async fn by_director(
    State(state): State<AppState>,
    Query(params): Query<NameParams>,
) -> ListResult<MovieSummary> {
    let name = required(&params.name, "name")?;

    let movies = state.query_service.get_movies_by_director(name).await?;
    Ok(Json(MovieList::new(movies, || {
        MovieToolKind::ByDirector.empty_message(name)
    })))
}

/// GET /api/movies/top?limit=
pub async fn top_rated(
    State(state): State<AppState>,
    Query(params): Query<TopParams>,
) -> ListResult<MovieSummary> {
    let limit = params.limit.unwrap_or(DEFAULT_TOP_LIMIT);
    if !(1..=MAX_TOP_LIMIT).contains(&limit) {
        return Err(ApiError::bad_request(format!(
            "'limit' must be between 1 and {}",
            MAX_TOP_LIMIT
        ))
        .with_param("limit"));
    }

    let movies = state.query_service.get_top_rated_movies(limit).await?;
    Ok(Json(MovieList::new(movies, || "No movies found".to_string())))
}

/// GET /api/movies/genre?genre=
pub async fn by_genre(
    State(state): State<AppState>,
    Query(params): Query<GenreParams>,
) -> ListResult<MovieSummary> {
    let genre = required(&params.genre, "genre")?;

    let movies = state.query_service.get_movies_by_genre(genre).await?;
    Ok(Json(MovieList::new(movies, || {
        MovieToolKind::ByGenre.empty_message(genre)
    })))
}

/// GET /api/movies/year-range?start=&end=
pub async fn by_year_range(
    State(state): State<AppState>,
    Query(params): Query<YearRangeParams>,
) -> ListResult<MovieSummary> {
    let start = validate_year(params.start, "start")?;
    let end = validate_year(params.end, "end")?;

    let movies = state.query_service.get_movies_by_year_range(start, end).await?;
    Ok(Json(MovieList::new(movies, || {
        format!("No movies found between {} and {}", start, end)
    })))
}

/// GET /api/movies/actor?name=
pub async fn with_actor(
    State(state): State<AppState>,
    Query(params): Query<NameParams>,
) -> ListResult<MovieSummary> {
    let name = required(&params.name, "name")?;

    let movies = state.query_service.get_movies_with_actor(name).await?;
    Ok(Json(MovieList::new(movies, || {
        MovieToolKind::WithActor.empty_message(name)
    })))
}

/// GET /api/movies/statistics
pub async fn statistics(
    State(state): State<AppState>,
) -> Result<Json<MovieStatistics>, ApiError> {
    Ok(Json(state.query_service.get_movie_statistics().await?))
}
