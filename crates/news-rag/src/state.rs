//! Service container built once at startup

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheStore, MemoryCacheStore, RagCache};
use crate::config::{RagConfig, VectorBackend};
use crate::error::Result;
use crate::ingestion::{list_article_files, Ingestor};
use crate::providers::{
    EmbeddingProvider, GeminiClient, LlmProvider, MemoryVectorStore, OpenAiEmbedder, QdrantStore,
    VectorStoreProvider,
};
use crate::retrieval::RagEngine;
use crate::types::{HealthReport, IngestReport, SystemStats};
use crate::watcher::AutoIngest;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Embedding provider (also used by the engine and ingestor)
    embedder: Arc<dyn EmbeddingProvider>,
    /// Generation provider
    llm: Arc<dyn LlmProvider>,
    /// Query and embedding cache
    cache: Arc<RagCache>,
    ingestor: Arc<Ingestor>,
    engine: Arc<RagEngine>,
    watcher: Arc<AutoIngest>,
}

impl AppState {
    /// Create application state with the configured remote backends
    ///
    /// Missing API keys are not fatal here: the affected provider fails each
    /// call with a configuration error and `health` reports it.
    pub fn new(config: RagConfig) -> Result<Self> {
        tracing::info!(
            "Initializing news RAG (vector backend: {:?})...",
            config.vector_db.backend
        );

        std::fs::create_dir_all(&config.paths.crawled_dir)?;

        if let Err(e) = config.require_embedding_key() {
            tracing::warn!("Embeddings unavailable: {}", e);
        }
        if let Err(e) = config.require_generation_key() {
            tracing::warn!("Generation unavailable: {}", e);
        }

        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OpenAiEmbedder::new(
            &config.embeddings,
            config.embeddings.api_key.clone(),
        )?);
        let llm: Arc<dyn LlmProvider> = Arc::new(GeminiClient::new(
            &config.generation,
            config.generation.api_key.clone(),
        )?);
        let store: Arc<dyn VectorStoreProvider> = match config.vector_db.backend {
            VectorBackend::Qdrant => Arc::new(QdrantStore::new(&config.vector_db)?),
            VectorBackend::Memory => {
                tracing::warn!("Using in-memory vector store; nothing is persisted");
                Arc::new(MemoryVectorStore::new(config.vector_db.collection_name.clone()))
            }
        };
        let cache_store = Arc::new(MemoryCacheStore::new(config.cache.max_entries));

        tracing::info!(
            "Providers initialized (embedding: {}, generation: {}, vectors: {} '{}')",
            embedder.model(),
            llm.model(),
            store.name(),
            store.collection()
        );

        Ok(Self::from_providers(config, embedder, llm, store, cache_store))
    }

    /// Create application state from explicit providers
    pub fn from_providers(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        store: Arc<dyn VectorStoreProvider>,
        cache_store: Arc<dyn CacheStore>,
    ) -> Self {
        let cache = Arc::new(RagCache::new(cache_store, &config.cache));
        let ingestor = Arc::new(Ingestor::new(&config, embedder.clone(), store.clone()));

        let mut engine = RagEngine::new(&config, embedder.clone(), llm.clone(), store);
        if config.cache.cache_queries {
            tracing::info!("Query cache enabled (ttl {}s)", config.cache.ttl_secs);
            engine = engine.with_cache(cache.clone());
        }

        let watcher = Arc::new(AutoIngest::new(ingestor.clone()));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                embedder,
                llm,
                cache,
                ingestor,
                engine: Arc::new(engine),
                watcher,
            }),
        }
    }

    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    pub fn ingestor(&self) -> &Arc<Ingestor> {
        &self.inner.ingestor
    }

    pub fn engine(&self) -> &Arc<RagEngine> {
        &self.inner.engine
    }

    pub fn watcher(&self) -> &Arc<AutoIngest> {
        &self.inner.watcher
    }

    pub fn cache(&self) -> &Arc<RagCache> {
        &self.inner.cache
    }

    /// Cold-start ingest when the index is empty, then start the watcher
    ///
    /// Returns the cold-start report when one ran.
    pub async fn start_background(&self) -> Option<IngestReport> {
        let ingestor = self.ingestor();
        ingestor.ensure_collection().await;

        let report = if ingestor.has_vectors().await {
            tracing::info!("Existing vectors found, skipping initial ingest");
            None
        } else {
            tracing::info!("No vectors found, running initial ingest");
            Some(ingestor.ingest_all(false).await)
        };

        let watcher_config = &self.config().watcher;
        if watcher_config.enabled {
            self.watcher()
                .start(Duration::from_secs(watcher_config.interval_secs));
        }
        report
    }

    /// Stop background work
    pub async fn shutdown(&self) {
        self.watcher().stop().await;
    }

    /// Health of the vector index, cache and embedding credentials
    pub async fn health(&self) -> HealthReport {
        let stats = self.engine().get_collection_stats().await;
        let vector_db_connected = stats.is_healthy();
        let embedding_configured = self.config().embeddings.api_key.is_some();

        let status = if vector_db_connected && embedding_configured {
            "healthy"
        } else {
            "partial"
        };

        HealthReport {
            status: status.to_string(),
            vector_db_connected,
            cache_connected: self.cache().is_connected().await,
            embedding_configured,
            articles_count: stats.total_vectors,
            timestamp: Utc::now(),
        }
    }

    /// Crawled file count, collection statistics and model names
    pub async fn stats(&self) -> SystemStats {
        let stats = self.engine().get_collection_stats().await;
        SystemStats {
            crawled_files: list_article_files(&self.config().paths.crawled_dir).len(),
            total_vectors: stats.total_vectors,
            vector_size: stats.vector_size,
            collection_status: stats.status,
            embedding_model: self.inner.embedder.model().to_string(),
            generation_model: self.inner.llm.model().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_config, write_article, EchoLlm, FlakyStore, HashEmbedder};
    use tempfile::TempDir;

    fn state(config: RagConfig) -> AppState {
        AppState::from_providers(
            config,
            Arc::new(HashEmbedder::new(16)),
            Arc::new(EchoLlm::replying("Bitcoin rallied.")),
            Arc::new(MemoryVectorStore::new("articles")),
            Arc::new(MemoryCacheStore::new(100)),
        )
    }

    #[tokio::test]
    async fn test_missing_keys_reported_by_health() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(dir.path());
        config.embeddings.api_key = None;
        config.generation.api_key = None;
        let state = AppState::new(config).unwrap();
        state.ingestor().ensure_collection().await;

        let health = state.health().await;
        assert!(health.vector_db_connected);
        assert!(!health.embedding_configured);
        assert_eq!(health.status, "partial");

        let stats = state.stats().await;
        assert_eq!(stats.collection_status, "healthy");
        assert_eq!(stats.total_vectors, 0);
    }

    #[tokio::test]
    async fn test_unconfigured_providers_degrade() {
        let dir = TempDir::new().unwrap();
        write_article(dir.path(), "a.json", "A", "https://news.example/a", "Bitcoin rallied.");
        let mut config = test_config(dir.path());
        config.embeddings.api_key = None;
        config.generation.api_key = None;
        let state = AppState::new(config).unwrap();

        let report = state.ingestor().ingest_all(false).await;
        assert_eq!(report.vectors_created, 0);

        let result = state.engine().answer_question("bitcoin?", None).await;
        assert_eq!(result.answer, crate::retrieval::GENERATION_ERROR_ANSWER);
        assert_eq!(result.chunks_found, 0);
    }

    #[test]
    fn test_new_with_memory_backend() {
        let dir = TempDir::new().unwrap();
        let crawled = dir.path().join("crawled");
        let state = AppState::new(test_config(&crawled)).unwrap();
        assert!(crawled.is_dir());
        assert!(!state.engine().has_cache());
    }

    #[tokio::test]
    async fn test_cold_start_ingests_then_skips() {
        let dir = TempDir::new().unwrap();
        write_article(dir.path(), "a.json", "A", "https://news.example/a", "Bitcoin rallied.");
        let mut config = test_config(dir.path());
        config.watcher.enabled = false;
        let state = state(config);

        let report = state.start_background().await.unwrap();
        assert!(report.success);
        assert_eq!(report.vectors_created, 1);
        assert!(!state.watcher().is_running());

        assert!(state.start_background().await.is_none());
    }

    #[tokio::test]
    async fn test_watcher_started_and_stopped() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(dir.path());
        config.watcher.interval_secs = 3600;
        let state = state(config);

        state.start_background().await;
        assert!(state.watcher().is_running());
        state.shutdown().await;
        assert!(!state.watcher().is_running());
    }

    #[tokio::test]
    async fn test_health_and_stats() {
        let dir = TempDir::new().unwrap();
        write_article(dir.path(), "a.json", "A", "https://news.example/a", "Bitcoin rallied.");
        let mut config = test_config(dir.path());
        config.watcher.enabled = false;
        let state = state(config);

        let health = state.health().await;
        assert_eq!(health.status, "partial");
        assert!(!health.vector_db_connected);

        state.start_background().await;
        let health = state.health().await;
        assert_eq!(health.status, "healthy");
        assert!(health.cache_connected);
        assert_eq!(health.articles_count, 1);

        let stats = state.stats().await;
        assert_eq!(stats.crawled_files, 1);
        assert_eq!(stats.total_vectors, 1);
        assert_eq!(stats.vector_size, 16);
        assert_eq!(stats.collection_status, "healthy");
        assert_eq!(stats.embedding_model, "hash-bow");
        assert_eq!(stats.generation_model, "echo-1");
    }

    #[tokio::test]
    async fn test_unreachable_store_reports_partial() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FlakyStore::new("articles"));
        store.set_unreachable(true);
        let state = AppState::from_providers(
            test_config(dir.path()),
            Arc::new(HashEmbedder::new(16)),
            Arc::new(EchoLlm::replying("ok")),
            store,
            Arc::new(MemoryCacheStore::new(10)),
        );

        let health = state.health().await;
        assert_eq!(health.status, "partial");
        assert_eq!(health.articles_count, 0);
        assert!(state.stats().await.collection_status.starts_with("error: "));
    }

    #[tokio::test]
    async fn test_query_cache_opt_in() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(dir.path());
        config.cache.cache_queries = true;
        let state = state(config);
        assert!(state.engine().has_cache());
    }
}
