use serde::Deserialize;

use crate::infrastructure::cache::CacheConfig;
use crate::infrastructure::observability::ObservabilityConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Optional log file, rotated daily
    #[serde(default)]
    pub file: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Movie dataset location
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub dataset_path: String,
}

/// Language model settings
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    /// Preferred model; well-known fallbacks are tried after it
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_max_iterations() -> usize {
    5
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dataset_path: "data/movies.json".to_string(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: None,
            temperature: 0.0,
            max_iterations: default_max_iterations(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: Self = config.try_deserialize()?;
        app_config.apply_overrides(|name| std::env::var(name).ok());

        Ok(app_config)
    }

    /// Applies the short environment variable names (`REDIS_HOST`,
    /// `OLLAMA_MODEL`, ...) on top of the layered configuration
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("REDIS_HOST") {
            self.cache.host = host;
        }

        if let Some(port) = lookup("REDIS_PORT").and_then(|v| v.parse().ok()) {
            self.cache.port = port;
        }

        if let Some(password) = lookup("REDIS_PASSWORD") {
            self.cache.password = Some(password).filter(|p| !p.is_empty());
        }

        if let Some(db) = lookup("REDIS_DB").and_then(|v| v.parse().ok()) {
            self.cache.db = db;
        }

        if let Some(base_url) = lookup("OLLAMA_BASE_URL") {
            self.llm.base_url = base_url;
        }

        if let Some(model) = lookup("OLLAMA_MODEL") {
            self.llm.model = Some(model).filter(|m| !m.is_empty());
        }

        if let Some(path) = lookup("MOVIES_DATASET") {
            self.database.dataset_path = path;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.database.dataset_path, "data/movies.json");
        assert_eq!(config.llm.max_iterations, 5);
        assert_eq!(config.llm.temperature, 0.0);
        assert!(config.llm.model.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("REDIS_HOST", "cache.internal"),
            ("REDIS_PORT", "6380"),
            ("REDIS_PASSWORD", "secret"),
            ("REDIS_DB", "2"),
            ("OLLAMA_MODEL", "llama3.2"),
            ("MOVIES_DATASET", "/srv/movies.json"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.cache.host, "cache.internal");
        assert_eq!(config.cache.port, 6380);
        assert_eq!(config.cache.password.as_deref(), Some("secret"));
        assert_eq!(config.cache.db, 2);
        assert_eq!(config.llm.model.as_deref(), Some("llama3.2"));
        assert_eq!(config.database.dataset_path, "/srv/movies.json");
    }

    #[test]
    fn test_empty_password_means_none() {
        let mut config = AppConfig::default();
        config.apply_overrides(|name| (name == "REDIS_PASSWORD").then(String::new));

        assert!(config.cache.password.is_none());
    }

    #[test]
    fn test_invalid_port_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|name| (name == "REDIS_PORT").then(|| "not-a-port".to_string()));

        assert_eq!(config.cache.port, 6379);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "server": {"host": "127.0.0.1", "port": 9000},
            "cache": {"enabled": false}
        }))
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.ttl.title_search, 1800);
        assert_eq!(config.llm.base_url, "http://localhost:11434");
    }
}
