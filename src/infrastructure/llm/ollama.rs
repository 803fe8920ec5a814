use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use super::http_client::HttpClientTrait;
use crate::domain::{
    DomainError, FinishReason, LlmProvider, LlmRequest, LlmResponse, Message, Usage,
};
use crate::infrastructure::observability::record_llm_request;

pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Models tried, in order, after the preferred one
pub const FALLBACK_MODELS: [&str; 4] = ["mistral", "llama3.2", "llama3.1", "qwen2.5"];

/// Local Ollama server speaking the `/api/chat` protocol
#[derive(Debug)]
pub struct OllamaProvider<C: HttpClientTrait> {
    client: C,
    base_url: String,
    model: String,
    temperature: f32,
}

impl<C: HttpClientTrait> OllamaProvider<C> {
    pub fn new(
        client: C,
        base_url: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature,
        }
    }

    /// Picks the first candidate model the server has pulled
    ///
    /// Candidates are the preferred model followed by [`FALLBACK_MODELS`].
    pub async fn connect(
        client: C,
        base_url: impl Into<String>,
        preferred_model: Option<&str>,
        temperature: f32,
    ) -> Result<Self, DomainError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let candidates = candidate_models(preferred_model);

        let available = match client.get_json(&format!("{}/api/tags", base_url)).await {
            Ok(json) => parse_model_names(json)?,
            Err(e) => {
                return Err(DomainError::provider(
                    "ollama",
                    format!(
                        "Unable to reach Ollama at {}. Make sure Ollama is started. Tried models: {}. Cause: {}",
                        base_url,
                        candidates.join(", "),
                        e
                    ),
                ));
            }
        };

        let Some(model) = candidates
            .iter()
            .find(|candidate| is_available(candidate, &available))
        else {
            return Err(DomainError::provider(
                "ollama",
                format!(
                    "None of the models [{}] is available on {}. Pull one with `ollama pull mistral`",
                    candidates.join(", "),
                    base_url
                ),
            ));
        };

        info!(model = %model, base_url = %base_url, "Using Ollama model");
        Ok(Self::new(client, base_url, model.clone(), temperature))
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    fn build_request(&self, request: &LlmRequest) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = request
            .messages
            .iter()
            .map(|m| serde_json::json!({"role": m.role, "content": m.content}))
            .collect();

        let mut options = serde_json::json!({
            "temperature": request.temperature.unwrap_or(self.temperature),
        });

        if let Some(max_tokens) = request.max_tokens {
            options["num_predict"] = serde_json::json!(max_tokens);
        }

        if let Some(ref stop) = request.stop {
            options["stop"] = serde_json::json!(stop);
        }

        serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
            "options": options,
        })
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<LlmResponse, DomainError> {
        let response: OllamaChatResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("ollama", format!("Failed to parse response: {}", e))
        })?;

        let finish_reason = match response.done_reason.as_deref() {
            Some("length") => FinishReason::Length,
            _ => FinishReason::Stop,
        };

        let mut llm_response = LlmResponse::new(
            response.model.unwrap_or_else(|| self.model.clone()),
            Message::assistant(response.message.content),
        )
        .with_finish_reason(finish_reason);

        if let (Some(prompt), Some(completion)) = (response.prompt_eval_count, response.eval_count)
        {
            llm_response = llm_response.with_usage(Usage::new(prompt, completion));
        }

        Ok(llm_response)
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for OllamaProvider<C> {
    async fn chat(&self, request: LlmRequest) -> Result<LlmResponse, DomainError> {
        let body = self.build_request(&request);
        let started = Instant::now();

        debug!(model = %self.model, messages = request.messages.len(), "Sending chat request");

        let result = self
            .client
            .post_json(&self.chat_url(), &body)
            .await
            .and_then(|json| self.parse_response(json));

        record_llm_request("ollama", &self.model, started.elapsed(), result.is_ok());
        result
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn candidate_models(preferred: Option<&str>) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();

    for model in preferred.into_iter().chain(FALLBACK_MODELS) {
        let model = model.trim();
        if !model.is_empty() && !candidates.iter().any(|c| c == model) {
            candidates.push(model.to_string());
        }
    }

    candidates
}

/// `mistral` matches a pulled `mistral:latest`; an explicit tag must match exactly
fn is_available(candidate: &str, available: &[String]) -> bool {
    available.iter().any(|name| {
        name == candidate
            || name
                .strip_prefix(candidate)
                .is_some_and(|rest| rest.starts_with(':'))
    })
}

fn parse_model_names(json: serde_json::Value) -> Result<Vec<String>, DomainError> {
    let tags: OllamaTags = serde_json::from_value(json).map_err(|e| {
        DomainError::provider("ollama", format!("Failed to parse model list: {}", e))
    })?;

    Ok(tags.models.into_iter().map(|m| m.name).collect())
}

#[derive(Debug, Deserialize)]
struct OllamaTags {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    model: Option<String>,
    message: OllamaMessage,
    done_reason: Option<String>,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;
    use crate::infrastructure::llm::HttpClient;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BASE: &str = "http://ollama.test";

    fn tags(names: &[&str]) -> serde_json::Value {
        json!({"models": names.iter().map(|n| json!({"name": n})).collect::<Vec<_>>()})
    }

    #[test]
    fn test_candidate_models_order() {
        assert_eq!(
            candidate_models(Some("phi3")),
            vec!["phi3", "mistral", "llama3.2", "llama3.1", "qwen2.5"]
        );
        assert_eq!(candidate_models(None)[0], "mistral");
        assert_eq!(candidate_models(Some("mistral")).len(), 4);
        assert_eq!(candidate_models(Some("  ")).len(), 4);
    }

    #[test]
    fn test_is_available_matches_tags() {
        let available = vec!["mistral:latest".to_string(), "llama3.1:8b".to_string()];

        assert!(is_available("mistral", &available));
        assert!(is_available("llama3.1:8b", &available));
        assert!(!is_available("llama3.1:70b", &available));
        assert!(!is_available("llama3", &available));
    }

    #[tokio::test]
    async fn test_connect_prefers_configured_model() {
        let client = MockHttpClient::new()
            .with_response(format!("{}/api/tags", BASE), tags(&["mistral:latest", "phi3:latest"]));

        let provider = OllamaProvider::connect(client, BASE, Some("phi3"), 0.0)
            .await
            .unwrap();

        assert_eq!(provider.model(), "phi3");
    }

    #[tokio::test]
    async fn test_connect_falls_back() {
        let client = MockHttpClient::new()
            .with_response(format!("{}/api/tags", BASE), tags(&["qwen2.5:7b"]));

        let provider = OllamaProvider::connect(client, BASE, Some("phi3"), 0.0)
            .await
            .unwrap();

        assert_eq!(provider.model(), "qwen2.5");
    }

    #[tokio::test]
    async fn test_connect_without_models_lists_attempts() {
        let client = MockHttpClient::new().with_response(format!("{}/api/tags", BASE), tags(&[]));

        let error = OllamaProvider::connect(client, BASE, None, 0.0)
            .await
            .unwrap_err()
            .to_string();

        assert!(error.contains("mistral, llama3.2, llama3.1, qwen2.5"));
    }

    #[tokio::test]
    async fn test_connect_unreachable_server() {
        let client =
            MockHttpClient::new().with_error(format!("{}/api/tags", BASE), "connection refused");

        let error = OllamaProvider::connect(client, BASE, None, 0.0)
            .await
            .unwrap_err()
            .to_string();

        assert!(error.contains("Make sure Ollama is started"));
        assert!(error.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_chat_request_shape() {
        let client = MockHttpClient::new().with_response(
            format!("{}/api/chat", BASE),
            json!({
                "model": "mistral",
                "message": {"role": "assistant", "content": "Final Answer: 42"},
                "done": true,
                "done_reason": "stop",
                "prompt_eval_count": 12,
                "eval_count": 5
            }),
        );
        let provider = OllamaProvider::new(client, format!("{}/", BASE), "mistral", 0.0);

        let request = LlmRequest::builder()
            .user("question")
            .stop(vec!["\nObservation:".to_string()])
            .build();
        let response = provider.chat(request).await.unwrap();

        assert_eq!(response.content(), "Final Answer: 42");
        assert_eq!(response.usage.unwrap().total_tokens, 17);

        let body = &provider.client.posted_bodies()[0];
        assert_eq!(body["model"], "mistral");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["temperature"], 0.0);
        assert_eq!(body["options"]["stop"][0], "\nObservation:");
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[tokio::test]
    async fn test_chat_malformed_response() {
        let client = MockHttpClient::new()
            .with_response(format!("{}/api/chat", BASE), json!({"unexpected": true}));
        let provider = OllamaProvider::new(client, BASE, "mistral", 0.0);

        let result = provider.chat(LlmRequest::builder().user("hi").build()).await;
        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }

    #[tokio::test]
    async fn test_against_http_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tags(&["llama3.2:latest"])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({"model": "llama3.2", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3.2",
                "message": {"role": "assistant", "content": "Hello"},
                "done": true
            })))
            .mount(&server)
            .await;

        let provider = OllamaProvider::connect(HttpClient::new(), server.uri(), None, 0.0)
            .await
            .unwrap();
        let response = provider
            .chat(LlmRequest::builder().user("hi").build())
            .await
            .unwrap();

        assert_eq!(provider.model(), "llama3.2");
        assert_eq!(response.content(), "Hello");
        assert!(response.usage.is_none());
    }
}
