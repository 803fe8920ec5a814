//! Cache configuration

use std::time::Duration;

use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use serde::Deserialize;

use crate::domain::cache::DEFAULT_NAMESPACE;
use crate::domain::DomainError;

/// Supported cache backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheType {
    /// Process-local cache using moka
    #[serde(alias = "memory", alias = "inmemory")]
    InMemory,
    /// Redis cache
    #[default]
    Redis,
}

impl std::fmt::Display for CacheType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheType::InMemory => write!(f, "in_memory"),
            CacheType::Redis => write!(f, "redis"),
        }
    }
}

impl std::str::FromStr for CacheType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(CacheType::InMemory),
            "redis" => Ok(CacheType::Redis),
            _ => Err(DomainError::configuration(format!(
                "Unknown cache type: {}. Valid types: in_memory, redis",
                s
            ))),
        }
    }
}

/// Time-to-live per query kind, in seconds; 0 disables memoization
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheTtlConfig {
    pub title_search: u64,
    pub director: u64,
    pub genre: u64,
    pub top_rated: u64,
    pub actor: u64,
    pub year_range: u64,
    pub statistics: u64,
    pub advanced_search: u64,
}

impl Default for CacheTtlConfig {
    fn default() -> Self {
        Self {
            title_search: 1800,
            director: 3600,
            genre: 3600,
            top_rated: 3600,
            actor: 3600,
            year_range: 0,
            statistics: 0,
            advanced_search: 0,
        }
    }
}

/// Connection and policy settings for the result cache
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Turning this off yields a permanently disabled store
    pub enabled: bool,
    pub backend: CacheType,
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: i64,
    /// Prefix of every key written by this application
    pub namespace: String,
    pub connect_timeout_secs: u64,
    pub response_timeout_secs: u64,
    /// Capacity of the in-memory backend
    pub max_capacity: u64,
    pub ttl: CacheTtlConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: CacheType::Redis,
            host: "localhost".to_string(),
            port: 6379,
            password: None,
            db: 0,
            namespace: DEFAULT_NAMESPACE.to_string(),
            connect_timeout_secs: 5,
            response_timeout_secs: 5,
            max_capacity: 10_000,
            ttl: CacheTtlConfig::default(),
        }
    }
}

impl CacheConfig {
    /// Configuration for a process-local cache
    pub fn in_memory() -> Self {
        Self {
            backend: CacheType::InMemory,
            ..Default::default()
        }
    }

    /// Configuration for a Redis server
    pub fn redis(host: impl Into<String>, port: u16) -> Self {
        Self {
            backend: CacheType::Redis,
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_secs)
    }

    /// Printable endpoint without credentials
    pub fn endpoint(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.db)
    }

    pub fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: RedisConnectionInfo {
                db: self.db,
                username: None,
                password: self.password.clone(),
                ..Default::default()
            },
        }
    }
}
