//! Cache key generation

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Namespace used for every key written by this application
pub const DEFAULT_NAMESPACE: &str = "movie_cache";

/// Number of digest bytes kept in a key (128 bits)
const DIGEST_BYTES: usize = 16;

/// Arguments identifying one logical cached call
///
/// Positional arguments keep their order. Keyword arguments are stored in a
/// `BTreeMap`, so insertion order never changes the resulting key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheKeyParams {
    /// Logical operation name (e.g. "title_search")
    pub prefix: String,
    /// Positional arguments in call order
    pub positional: Vec<Value>,
    /// Keyword arguments sorted by name
    pub keyword: BTreeMap<String, Value>,
}

impl CacheKeyParams {
    /// Creates parameters for the given operation name with no arguments
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            positional: Vec::new(),
            keyword: BTreeMap::new(),
        }
    }

    /// Appends a single positional argument
    pub fn with_arg<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.positional.push(to_value(value));
        self
    }

    /// Appends an argument list.
    ///
    /// Tuples and sequences are spread into individual positional arguments,
    /// `()` adds nothing and any other value is added as one argument.
    pub fn with_args<T: Serialize + ?Sized>(mut self, args: &T) -> Self {
        match to_value(args) {
            Value::Array(items) => self.positional.extend(items),
            Value::Null => {}
            other => self.positional.push(other),
        }
        self
    }

    /// Adds a keyword argument, replacing an earlier one with the same name
    pub fn with_kwarg<T: Serialize + ?Sized>(mut self, name: impl Into<String>, value: &T) -> Self {
        self.keyword.insert(name.into(), to_value(value));
        self
    }

    fn key_material(&self) -> String {
        let positional = Value::Array(self.positional.clone());
        let keyword = serde_json::to_string(&self.keyword).unwrap_or_else(|_| "{}".to_string());

        format!("{}:{}:{}", self.prefix, positional, keyword)
    }
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Derives namespaced, fixed-length cache keys from call parameters
#[derive(Debug, Clone)]
pub struct KeyCodec {
    namespace: String,
}

impl Default for KeyCodec {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl KeyCodec {
    /// Creates a codec writing keys under the given namespace
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Glob pattern matching every key of this namespace
    pub fn namespace_pattern(&self) -> String {
        format!("{}:*", self.namespace)
    }

    /// Builds `<namespace>:<prefix>:<digest>` for the given parameters
    pub fn make_key(&self, params: &CacheKeyParams) -> String {
        format!(
            "{}:{}:{}",
            self.namespace,
            params.prefix,
            Self::digest(&params.key_material())
        )
    }

    fn digest(input: &str) -> String {
        let hash = Sha256::digest(input.as_bytes());
        hex::encode(&hash[..DIGEST_BYTES])
    }
}
