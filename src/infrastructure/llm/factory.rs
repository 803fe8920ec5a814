use std::sync::Arc;
use std::time::Duration;

use super::http_client::HttpClient;
use super::OllamaProvider;
use crate::config::LlmConfig;
use crate::domain::{DomainError, LlmProvider};

/// Factory for creating LLM providers
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Connects to the configured Ollama server and selects a model
    pub async fn create(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, DomainError> {
        let http_client =
            HttpClient::with_timeout(Duration::from_secs(config.request_timeout_secs))?;

        let provider = OllamaProvider::connect(
            http_client,
            config.base_url.as_str(),
            config.model.as_deref(),
            config.temperature,
        )
        .await?;

        Ok(Arc::new(provider))
    }
}
