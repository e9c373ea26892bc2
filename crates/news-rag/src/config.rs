//! Configuration for the news RAG system
//!
//! Loaded from a TOML file with every field defaulted; API keys are read from
//! the environment when the file leaves them unset.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable holding the embedding API key
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable holding the generation API key
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Main RAG system configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Filesystem locations
    pub paths: PathsConfig,
    /// Embedding backend configuration
    pub embeddings: EmbeddingConfig,
    /// Generation backend configuration
    pub generation: GenerationConfig,
    /// Vector database configuration
    pub vector_db: VectorDbConfig,
    /// Cache configuration
    pub cache: CacheConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Search configuration
    pub search: SearchConfig,
    /// Auto-ingest watcher configuration
    pub watcher: WatcherConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file, then apply environment overrides
    ///
    /// A missing file is a configuration error, not a silent fallback.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Config file not found: {} ({})", path.display(), e))
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load from an optional path, using defaults plus environment when absent
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let mut config = Self::default();
                config.apply_env();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Parse configuration from TOML text without touching the environment
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Fill unset API keys from the environment
    pub fn apply_env(&mut self) {
        if self.embeddings.api_key.is_none() {
            self.embeddings.api_key = non_empty_env(OPENAI_API_KEY_ENV);
        }
        if self.generation.api_key.is_none() {
            self.generation.api_key = non_empty_env(GOOGLE_API_KEY_ENV);
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.paths.crawled_dir.as_os_str().is_empty() {
            return Err(Error::Config("paths.crawled_dir must be set".to_string()));
        }
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be > 0".to_string()));
        }
        if self.embeddings.dimensions == 0 {
            return Err(Error::Config("embeddings.dimensions must be > 0".to_string()));
        }
        if self.embeddings.max_batch == 0 {
            return Err(Error::Config("embeddings.max_batch must be > 0".to_string()));
        }
        if !(1..=MAX_RESULTS_LIMIT).contains(&self.search.max_results) {
            return Err(Error::Config(format!(
                "search.max_results must be between 1 and {}",
                MAX_RESULTS_LIMIT
            )));
        }
        if !(0.0..=1.0).contains(&self.search.score_threshold) {
            return Err(Error::Config(
                "search.score_threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(Error::Config(
                "generation.temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        if self.watcher.interval_secs == 0 {
            return Err(Error::Config("watcher.interval_secs must be > 0".to_string()));
        }
        if self.vector_db.backend == VectorBackend::Qdrant && self.vector_db.url.trim().is_empty() {
            return Err(Error::Config("vector_db.url is required for qdrant".to_string()));
        }
        Ok(())
    }

    /// Embedding API key, or a configuration error naming the variable
    pub fn require_embedding_key(&self) -> Result<&str> {
        self.embeddings.api_key.as_deref().ok_or_else(|| {
            Error::Config(format!("{} is not set", OPENAI_API_KEY_ENV))
        })
    }

    /// Generation API key, or a configuration error naming the variable
    pub fn require_generation_key(&self) -> Result<&str> {
        self.generation.api_key.as_deref().ok_or_else(|| {
            Error::Config(format!("{} is not set", GOOGLE_API_KEY_ENV))
        })
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Upper bound for `max_results` on a single query
pub const MAX_RESULTS_LIMIT: usize = 20;

/// Filesystem locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory of crawled article JSON files
    pub crawled_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            crawled_dir: PathBuf::from("data/crawled"),
        }
    }
}

/// Embedding backend configuration (OpenAI-compatible API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// API base URL
    pub base_url: String,
    /// API key (falls back to `OPENAI_API_KEY`)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// Embedding dimensions, also the collection vector size
    pub dimensions: usize,
    /// Maximum number of texts per embedding call
    pub max_batch: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "text-embedding-ada-002".to_string(),
            dimensions: 1536,
            max_batch: 100,
            timeout_secs: 30,
        }
    }
}

/// Generation backend configuration (Gemini API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// API base URL
    pub base_url: String,
    /// API key (falls back to `GOOGLE_API_KEY`)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// Maximum output tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: None,
            model: "gemini-2.0-flash-lite".to_string(),
            max_tokens: 1000,
            temperature: 0.3, // Lower for more factual answers
            timeout_secs: 60,
        }
    }
}

/// Vector index backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackend {
    /// Qdrant over its REST API
    #[default]
    Qdrant,
    /// In-process index (nothing persisted)
    Memory,
}

/// Vector database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    /// Backend selection
    pub backend: VectorBackend,
    /// Qdrant URL
    pub url: String,
    /// Optional Qdrant API key
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Collection name
    pub collection_name: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            backend: VectorBackend::Qdrant,
            url: "http://localhost:6333".to_string(),
            api_key: None,
            collection_name: "crypto_articles".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL for cached query results in seconds
    pub ttl_secs: u64,
    /// Serve and store `answer_question` results through the cache
    pub cache_queries: bool,
    /// Maximum entries held by the in-process store
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            cache_queries: false,
            max_entries: 10_000,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks (unused: chunks never overlap)
    pub chunk_overlap: usize,
    /// Minimum chunk size (configured, not enforced)
    pub min_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            min_chunk_size: 100,
        }
    }
}

/// Similarity search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Default number of hits per query
    pub max_results: usize,
    /// Minimum similarity enforced by the index
    pub score_threshold: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            score_threshold: 0.5,
        }
    }
}

/// Auto-ingest watcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Start the watcher with the service
    pub enabled: bool,
    /// Poll interval in seconds
    pub interval_secs: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 300, // 5 minutes
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RagConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.vector_db.collection_name, "crypto_articles");
        assert_eq!(config.search.max_results, 5);
        assert!(!config.cache.cache_queries);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = RagConfig::from_toml_str(
            r#"
            [chunking]
            chunk_size = 500

            [vector_db]
            backend = "memory"
            collection_name = "test_articles"
            "#,
        )
        .unwrap();

        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.min_chunk_size, 100);
        assert_eq!(config.vector_db.backend, VectorBackend::Memory);
        assert_eq!(config.vector_db.collection_name, "test_articles");
        assert_eq!(config.embeddings.dimensions, 1536);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = RagConfig::default();
        config.search.max_results = 0;
        assert!(config.validate().unwrap_err().is_config());

        let mut config = RagConfig::default();
        config.search.score_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = RagConfig::default();
        config.chunking.chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_example_config_parses() {
        let config =
            RagConfig::from_toml_str(include_str!("../../../config/news-rag.example.toml")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.watcher.interval_secs, 300);
        assert_eq!(config.vector_db.backend, VectorBackend::Qdrant);
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = RagConfig::from_toml_str("[chunking\nchunk_size = ").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = RagConfig::load(Path::new("/nonexistent/news-rag.toml")).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_missing_keys_reported() {
        let config = RagConfig::default();
        if config.embeddings.api_key.is_none() {
            assert!(config.require_embedding_key().unwrap_err().is_config());
        }
        let mut config = RagConfig::default();
        config.generation.api_key = Some("key".to_string());
        assert_eq!(config.require_generation_key().unwrap(), "key");
    }
}
