//! LLM provider implementations

mod factory;
mod http_client;
mod ollama;

pub use factory::LlmProviderFactory;
pub use http_client::{HttpClient, HttpClientTrait};
pub use ollama::{OllamaProvider, DEFAULT_OLLAMA_BASE_URL, FALLBACK_MODELS};
