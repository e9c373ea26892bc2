//! Content-addressed, best-effort cache for query results and embeddings
//!
//! Keys are `namespace:hex(sha256(trim(lowercase(input))))`. Reads and writes
//! never fail: backend errors become misses and silent no-ops.

mod store;

pub use store::{CacheStore, MemoryCacheStore};

use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;

/// TTL for cached query embeddings
pub const EMBEDDING_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Cache key namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheNamespace {
    /// Complete query results
    Query,
    /// Query embeddings
    Embedding,
}

impl CacheNamespace {
    /// Key prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Embedding => "embedding",
        }
    }
}

/// Typed cache over a [`CacheStore`]
pub struct RagCache {
    store: Arc<dyn CacheStore>,
    query_ttl: Duration,
}

impl RagCache {
    /// Create a cache with the configured query TTL
    pub fn new(store: Arc<dyn CacheStore>, config: &CacheConfig) -> Self {
        Self {
            store,
            query_ttl: Duration::from_secs(config.ttl_secs),
        }
    }

    /// Build the key for `input` in `namespace`
    pub fn key(namespace: CacheNamespace, input: &str) -> String {
        let normalized = input.trim().to_lowercase();
        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        format!("{}:{}", namespace.as_str(), hex::encode(hasher.finalize()))
    }

    /// TTL applied to entries in `namespace`
    pub fn ttl(&self, namespace: CacheNamespace) -> Duration {
        match namespace {
            CacheNamespace::Query => self.query_ttl,
            CacheNamespace::Embedding => EMBEDDING_TTL,
        }
    }

    /// Look up a value; any backend or decode failure is a miss
    pub async fn get<T: DeserializeOwned>(&self, namespace: CacheNamespace, input: &str) -> Option<T> {
        let key = Self::key(namespace, input);
        let raw = match self.store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!("Cache read failed ({}): {}", self.store.name(), e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                tracing::debug!("Cache hit: {}", &key[..key.len().min(20)]);
                Some(value)
            }
            Err(e) => {
                tracing::debug!("Discarding undecodable cache entry: {}", e);
                None
            }
        }
    }

    /// Store a value with the namespace TTL; failures are logged and ignored
    pub async fn set<T: Serialize>(&self, namespace: CacheNamespace, input: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Cache value not serializable: {}", e);
                return;
            }
        };

        let key = Self::key(namespace, input);
        if let Err(e) = self.store.set(&key, raw, self.ttl(namespace)).await {
            tracing::warn!("Cache write failed ({}): {}", self.store.name(), e);
        }
    }

    /// Whether the backend answers a ping
    pub async fn is_connected(&self) -> bool {
        self.store.ping().await.unwrap_or(false)
    }
}
