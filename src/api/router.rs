use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use super::{cache, health, movies, query};
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

fn movie_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(movies::search_by_title))
        .route("/director", get(movies::by_director))
        .route("/top", get(movies::top_rated))
        .route("/genre", get(movies::by_genre))
        .route("/year-range", get(movies::by_year_range))
        .route("/actor", get(movies::with_actor))
        .route("/statistics", get(movies::statistics))
}

fn cache_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(cache::stats))
        .route("/clear", delete(cache::clear))
}

/// Full router; `metrics` mounts the Prometheus endpoint when present
pub fn create_router(state: AppState, metrics: Option<PrometheusMetrics>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/", get(health::home))
        .route("/favicon.ico", get(health::favicon))
        .route("/api/health", get(health::health_check))
        .route("/api/query", post(query::ask))
        .nest("/api/movies", movie_routes())
        .nest("/api/cache", cache_routes())
        .with_state(state);

    if let Some(metrics) = metrics {
        router = router.merge(create_metrics_router(metrics));
    }

    router
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    use crate::domain::llm::MockLlmProvider;
    use crate::domain::{KeyCodec, Movie, Tool};
    use crate::infrastructure::agent::{movie_tools, ReactAgent};
    use crate::infrastructure::cache::{CacheStore, CacheTtlConfig, InMemoryCache};
    use crate::infrastructure::movie::InMemoryMovieRepository;
    use crate::infrastructure::services::MovieQueryService;

    fn movies() -> Vec<Movie> {
        vec![
            Movie::new("The Dark Knight")
                .with_year(2008)
                .with_rating(9.0)
                .with_director("Christopher Nolan")
                .with_genre("Action, Crime, Drama")
                .with_stars(vec!["Christian Bale".into(), "Heath Ledger".into()]),
            Movie::new("Inception")
                .with_year(2010)
                .with_rating(8.8)
                .with_director("Christopher Nolan")
                .with_genre("Action, Adventure, Sci-Fi")
                .with_stars(vec!["Leonardo DiCaprio".into()]),
            Movie::new("Pulp Fiction")
                .with_year(1994)
                .with_rating(8.9)
                .with_director("Quentin Tarantino")
                .with_genre("Crime, Drama"),
        ]
    }

    fn state(provider: Option<MockLlmProvider>) -> AppState {
        let cache = Arc::new(CacheStore::with_backend(
            Arc::new(InMemoryCache::default()),
            KeyCodec::default(),
        ));
        let service = Arc::new(MovieQueryService::new(
            Arc::new(InMemoryMovieRepository::with_movies(movies())),
            Some(cache.clone()),
            &CacheTtlConfig::default(),
        ));
        let agent = provider.map(|p| {
            let tools: Vec<Arc<dyn Tool>> = movie_tools(service.clone());
            Arc::new(ReactAgent::new(Arc::new(p), tools))
        });

        AppState::new(service, agent, cache)
    }

    fn app(provider: Option<MockLlmProvider>) -> Router {
        create_router(state(provider), None)
    }

    async fn send(router: Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        send(app(None), Method::GET, uri, None).await
    }

    #[tokio::test]
    async fn test_home_and_favicon() {
        let (status, body) = get_json("/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Movie AI Agent API");
        assert!(body["endpoints"]["query"].is_string());

        let (status, _) = get_json("/favicon.ico").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_search_by_title() {
        let (status, body) = get_json("/api/movies/search?title=knight").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["title"], "The Dark Knight");
    }

    #[tokio::test]
    async fn test_empty_result_is_message() {
        let (status, body) = get_json("/api/movies/director?name=Kubrick").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "No movies found for director 'Kubrick'");
    }

    #[tokio::test]
    async fn test_top_rated_limit_validation() {
        let (status, body) = get_json("/api/movies/top").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);

        let (status, body) = get_json("/api/movies/top?limit=51").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["param"], "limit");

        let (status, _) = get_json("/api/movies/top?limit=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = get_json("/api/movies/top?limit=ten").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "invalid_request_error");
    }

    #[tokio::test]
    async fn test_year_range() {
        let (status, body) = get_json("/api/movies/year-range?start=2000&end=2010").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["title"], "The Dark Knight");
        assert_eq!(body[1]["title"], "Inception");

        let (status, body) = get_json("/api/movies/year-range?start=1700&end=2010").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["param"], "start");

        let (status, _) = get_json("/api/movies/year-range?start=1990").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_pattern_is_bad_request() {
        let (status, _) = get_json("/api/movies/genre?genre=(").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_statistics() {
        let (status, body) = get_json("/api/movies/statistics").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_movies"], 3);
        assert_eq!(body["top_directors"][0]["director"], "Christopher Nolan");
    }

    #[tokio::test]
    async fn test_query_with_agent() {
        let provider = MockLlmProvider::new("mock")
            .with_reply("Action: get_movies_by_director\nAction Input: Christopher Nolan")
            .with_reply("Final Answer: The Dark Knight and Inception");

        let (status, body) = send(
            app(Some(provider)),
            Method::POST,
            "/api/query",
            Some(r#"{"question": "What did Nolan direct?"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["question"], "What did Nolan direct?");
        assert_eq!(body["answer"], "The Dark Knight and Inception");
    }

    #[tokio::test]
    async fn test_query_without_agent() {
        let (status, body) = send(
            app(None),
            Method::POST,
            "/api/query",
            Some(r#"{"question": "anything"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["type"], "service_unavailable_error");
    }

    #[tokio::test]
    async fn test_query_validation() {
        let (status, _) = send(
            app(Some(MockLlmProvider::new("mock"))),
            Method::POST,
            "/api/query",
            Some(r#"{"question": "   "}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(app(None), Method::POST, "/api/query", Some("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "json_parse_error");
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(
            app(Some(MockLlmProvider::new("mock"))),
            Method::GET,
            "/api/health",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
        assert_eq!(body["movies"], 3);
        assert_eq!(body["agent"], "ready");
        assert_eq!(body["model"], "mock-model");
        assert_eq!(body["cache"]["enabled"], true);
    }

    #[tokio::test]
    async fn test_cache_stats_and_clear() {
        let state = state(None);
        let router = create_router(state.clone(), None);

        let (status, _) = send(router.clone(), Method::GET, "/api/movies/search?title=inception", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, stats) = send(router.clone(), Method::GET, "/api/cache/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["keys_count"], 1);

        let (status, body) = send(router.clone(), Method::DELETE, "/api/cache/clear", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["keys_deleted"], 1);
        assert_eq!(body["pattern"], "movie_cache:*");

        let (_, body) = send(router, Method::DELETE, "/api/cache/clear?pattern=other:*", None).await;
        assert_eq!(body["keys_deleted"], 0);
        assert_eq!(body["pattern"], "other:*");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, _) = get_json("/api/nothing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
