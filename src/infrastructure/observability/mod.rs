//! Observability infrastructure - Logging, Tracing and Metrics

mod config;
mod metrics;
mod tracing_setup;

pub use config::{MetricsConfig, ObservabilityConfig, TracingConfig};
pub use self::metrics::{
    create_metrics_router, init_metrics, record_cache_lookup, record_http_request,
    record_llm_request, record_tool_call, PrometheusMetrics,
};
pub use tracing_setup::{init_tracing, shutdown_tracing};
