//! Cache backends

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::time::Duration;

use crate::error::Result;

/// Key/value backend holding JSON strings with a per-entry TTL
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a live value
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value that expires after `ttl`
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Liveness probe
    async fn ping(&self) -> Result<bool>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

struct Entry {
    value: String,
    inserted_at: DateTime<Utc>,
    /// `None` when the TTL does not fit a timestamp
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| now >= at).unwrap_or(false)
    }
}

/// In-process TTL map
///
/// Expired entries are dropped lazily on read. At capacity the oldest entry
/// is evicted.
pub struct MemoryCacheStore {
    entries: DashMap<String, Entry>,
    max_entries: usize,
}

impl MemoryCacheStore {
    /// Create a store bounded to `max_entries`
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Number of stored entries, including expired ones not yet dropped
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|e| e.inserted_at)
            .map(|e| e.key().clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Utc::now();
        if self.entries.remove_if(key, |_, e| e.is_expired(now)).is_some() {
            return Ok(None);
        }
        Ok(self.entries.get(key).map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let now = Utc::now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl));

        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            self.evict_oldest();
        }
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                inserted_at: now,
                expires_at,
            },
        );
        Ok(())
    }

    async fn ping(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
