//! Movie lookups served through the result cache

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::debug;

use crate::domain::movie::{
    Movie, MovieField, MovieFilter, MovieQuery, MovieRepository, MovieStatistics, MovieSummary,
    Projection,
};
use crate::domain::DomainError;
use crate::infrastructure::cache::{CacheContext, CacheStore, CacheTtlConfig, Memoized};

/// Maximum number of full documents returned by a title search
pub const TITLE_SEARCH_LIMIT: usize = 5;
/// Maximum number of results for every other list query
pub const LIST_LIMIT: usize = 10;
/// Upper bound for `get_top_rated_movies`
pub const MAX_TOP_RATED: usize = 50;
/// Directors listed in the statistics
pub const TOP_DIRECTORS: usize = 10;

type QueryFn<A, T> =
    for<'a> fn(&'a MovieQueryService, A) -> BoxFuture<'a, Result<T, DomainError>>;

/// The movie queries the agent and the REST API expose
///
/// Each operation runs through its own [`Memoized`] wrapper whose TTL comes
/// from configuration; a zero TTL leaves that operation uncached.
#[derive(Debug)]
pub struct MovieQueryService {
    repository: Arc<dyn MovieRepository>,
    cache: Option<Arc<CacheStore>>,
    title_search: Memoized<QueryFn<String, Vec<Movie>>>,
    director: Memoized<QueryFn<String, Vec<MovieSummary>>>,
    top_rated: Memoized<QueryFn<usize, Vec<MovieSummary>>>,
    genre: Memoized<QueryFn<String, Vec<MovieSummary>>>,
    year_range: Memoized<QueryFn<(i32, i32), Vec<MovieSummary>>>,
    actor: Memoized<QueryFn<String, Vec<MovieSummary>>>,
    statistics: Memoized<QueryFn<(), MovieStatistics>>,
    advanced_search: Memoized<QueryFn<String, Vec<Movie>>>,
}

impl CacheContext for MovieQueryService {
    fn cache(&self) -> Option<&CacheStore> {
        self.cache.as_deref()
    }
}

fn secs(value: u64) -> Duration {
    Duration::from_secs(value)
}

impl MovieQueryService {
    pub fn new(
        repository: Arc<dyn MovieRepository>,
        cache: Option<Arc<CacheStore>>,
        ttl: &CacheTtlConfig,
    ) -> Self {
        Self {
            repository,
            cache,
            title_search: Memoized::new(
                Self::run_title_search as QueryFn<_, _>,
                secs(ttl.title_search),
                "title_search",
            ),
            director: Memoized::new(
                Self::run_director as QueryFn<_, _>,
                secs(ttl.director),
                "director",
            ),
            top_rated: Memoized::new(
                Self::run_top_rated as QueryFn<_, _>,
                secs(ttl.top_rated),
                "top_rated",
            ),
            genre: Memoized::new(Self::run_genre as QueryFn<_, _>, secs(ttl.genre), "genre"),
            year_range: Memoized::new(
                Self::run_year_range as QueryFn<_, _>,
                secs(ttl.year_range),
                "year_range",
            ),
            actor: Memoized::new(Self::run_actor as QueryFn<_, _>, secs(ttl.actor), "actor"),
            statistics: Memoized::new(
                Self::run_statistics as QueryFn<_, _>,
                secs(ttl.statistics),
                "statistics",
            ),
            advanced_search: Memoized::new(
                Self::run_advanced_search as QueryFn<_, _>,
                secs(ttl.advanced_search),
                "advanced_search",
            ),
        }
    }

    /// Number of documents in the collection
    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }

    /// Title match, best rated first, at most five full documents
    pub async fn search_movies_by_title(&self, title: &str) -> Result<Vec<Movie>, DomainError> {
        self.title_search.try_call(self, title.to_string()).await
    }

    pub async fn get_movies_by_director(
        &self,
        director: &str,
    ) -> Result<Vec<MovieSummary>, DomainError> {
        self.director.try_call(self, director.to_string()).await
    }

    /// Best rated movies; `limit` is capped at [`MAX_TOP_RATED`]
    pub async fn get_top_rated_movies(&self, limit: usize) -> Result<Vec<MovieSummary>, DomainError> {
        self.top_rated.try_call(self, limit.min(MAX_TOP_RATED)).await
    }

    pub async fn get_movies_by_genre(&self, genre: &str) -> Result<Vec<MovieSummary>, DomainError> {
        self.genre.try_call(self, genre.to_string()).await
    }

    /// Movies released between `start` and `end`, both inclusive
    pub async fn get_movies_by_year_range(
        &self,
        start: i32,
        end: i32,
    ) -> Result<Vec<MovieSummary>, DomainError> {
        self.year_range.try_call(self, (start, end)).await
    }

    pub async fn get_movies_with_actor(
        &self,
        actor: &str,
    ) -> Result<Vec<MovieSummary>, DomainError> {
        self.actor.try_call(self, actor.to_string()).await
    }

    pub async fn get_movie_statistics(&self) -> Result<MovieStatistics, DomainError> {
        self.statistics.try_call(self, ()).await
    }

    /// Free-text match over the searchable text of each movie
    pub async fn advanced_search(&self, query: &str) -> Result<Vec<Movie>, DomainError> {
        self.advanced_search.try_call(self, query.to_string()).await
    }

    async fn summaries(
        &self,
        query: MovieQuery,
        projection: Projection,
    ) -> Result<Vec<MovieSummary>, DomainError> {
        let movies = self.repository.find(&query).await?;
        debug!(found = movies.len(), ?projection, "Movie query executed");

        Ok(movies
            .into_iter()
            .map(|movie| MovieSummary::project(movie, projection))
            .collect())
    }

    fn run_title_search(&self, title: String) -> BoxFuture<'_, Result<Vec<Movie>, DomainError>> {
        async move {
            let query = MovieQuery::matching(MovieField::Title, title)
                .sorted_by_rating()
                .limit(TITLE_SEARCH_LIMIT);
            self.repository.find(&query).await
        }
        .boxed()
    }

    fn run_director(
        &self,
        director: String,
    ) -> BoxFuture<'_, Result<Vec<MovieSummary>, DomainError>> {
        async move {
            let query = MovieQuery::matching(MovieField::Director, director).limit(LIST_LIMIT);
            self.summaries(query, Projection::Director).await
        }
        .boxed()
    }

    fn run_top_rated(&self, limit: usize) -> BoxFuture<'_, Result<Vec<MovieSummary>, DomainError>> {
        async move {
            let query = MovieQuery::new(MovieFilter::All)
                .sorted_by_rating()
                .limit(limit);
            self.summaries(query, Projection::Ranking).await
        }
        .boxed()
    }

    fn run_genre(&self, genre: String) -> BoxFuture<'_, Result<Vec<MovieSummary>, DomainError>> {
        async move {
            let query = MovieQuery::matching(MovieField::Genre, genre).limit(LIST_LIMIT);
            self.summaries(query, Projection::Ranking).await
        }
        .boxed()
    }

    fn run_year_range(
        &self,
        (start, end): (i32, i32),
    ) -> BoxFuture<'_, Result<Vec<MovieSummary>, DomainError>> {
        async move {
            let query = MovieQuery::new(MovieFilter::YearBetween { start, end })
                .sorted_by_rating()
                .limit(LIST_LIMIT);
            self.summaries(query, Projection::YearRange).await
        }
        .boxed()
    }

    fn run_actor(&self, actor: String) -> BoxFuture<'_, Result<Vec<MovieSummary>, DomainError>> {
        async move {
            let query = MovieQuery::matching(MovieField::Stars, actor).limit(LIST_LIMIT);
            self.summaries(query, Projection::Actor).await
        }
        .boxed()
    }

    fn run_statistics(&self, _: ()) -> BoxFuture<'_, Result<MovieStatistics, DomainError>> {
        async move { self.repository.statistics(TOP_DIRECTORS).await }.boxed()
    }

    fn run_advanced_search(&self, text: String) -> BoxFuture<'_, Result<Vec<Movie>, DomainError>> {
        async move {
            let query = MovieQuery::matching(MovieField::SearchableText, text)
                .sorted_by_rating()
                .limit(LIST_LIMIT);
            self.repository.find(&query).await
        }
        .boxed()
    }
}
