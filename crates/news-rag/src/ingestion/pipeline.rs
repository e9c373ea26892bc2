//! Ingestion pipeline: articles to chunks to stored vectors

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::RagConfig;
use crate::providers::{DistanceMetric, EmbeddingProvider, VectorStoreProvider};
use crate::types::{Article, Chunk, IngestReport, Point};

use super::chunker::ParagraphChunker;
use super::loader::{list_article_files, load_articles};

/// Loads raw articles, chunks them, embeds the chunks and upserts the points
///
/// Never returns an error: backend failures are logged and count as zero
/// stored vectors for the affected batch.
pub struct Ingestor {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    chunker: ParagraphChunker,
    crawled_dir: PathBuf,
    dimensions: usize,
    max_batch: usize,
}

impl Ingestor {
    /// Create an ingestor over the configured crawled directory
    pub fn new(
        config: &RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
    ) -> Self {
        Self {
            embedder,
            store,
            chunker: ParagraphChunker::from_config(&config.chunking),
            crawled_dir: config.paths.crawled_dir.clone(),
            dimensions: config.embeddings.dimensions,
            max_batch: config.embeddings.max_batch.max(1),
        }
    }

    /// Directory scanned for raw articles
    pub fn crawled_dir(&self) -> &Path {
        &self.crawled_dir
    }

    /// Create the collection if absent
    ///
    /// Failures are logged and treated as "already exists".
    pub async fn ensure_collection(&self) {
        if let Err(e) = self
            .store
            .ensure_collection(self.dimensions, DistanceMetric::Cosine)
            .await
        {
            tracing::warn!(
                "Could not ensure collection '{}', assuming it exists: {}",
                self.store.collection(),
                e
            );
        }
    }

    /// Ingest every article in the crawled directory
    pub async fn ingest_all(&self, force_refresh: bool) -> IngestReport {
        if force_refresh {
            tracing::info!("Force refresh: dropping collection '{}'", self.store.collection());
            if let Err(e) = self.store.delete_collection().await {
                tracing::warn!("Failed to delete collection: {}", e);
            }
        }
        self.ensure_collection().await;

        let files = list_article_files(&self.crawled_dir);
        let articles = load_articles(&files).await;
        if articles.is_empty() {
            tracing::warn!("No articles found in {}", self.crawled_dir.display());
            return IngestReport::failed("No articles found");
        }

        let vectors = self.store_articles(&articles).await;
        let message = format!("Processed {} articles into {} vectors", articles.len(), vectors);
        tracing::info!("{}", message);
        IngestReport::completed(articles.len(), vectors, message)
    }

    /// Ingest only the given files
    pub async fn ingest_files(&self, paths: &[PathBuf]) -> IngestReport {
        if paths.is_empty() {
            return IngestReport::failed("No files provided");
        }
        self.ensure_collection().await;

        let articles = load_articles(paths).await;
        if articles.is_empty() {
            tracing::warn!("None of {} files parsed into articles", paths.len());
            return IngestReport::failed("No valid articles found");
        }

        let vectors = self.store_articles(&articles).await;
        let message = format!("Processed {} new files into {} vectors", articles.len(), vectors);
        tracing::info!("{}", message);
        IngestReport::completed(articles.len(), vectors, message)
    }

    /// Whether the collection exists and holds at least one point
    pub async fn has_vectors(&self) -> bool {
        match self.store.stats().await {
            Ok(info) => info.count > 0,
            Err(e) => {
                tracing::debug!("Collection stats unavailable: {}", e);
                false
            }
        }
    }

    async fn store_articles(&self, articles: &[Article]) -> usize {
        let mut total = 0;
        for article in articles {
            let chunks = self.chunker.chunk(article);
            tracing::debug!("{}: {} chunks", article.url, chunks.len());
            for batch in chunks.chunks(self.max_batch) {
                total += self.store_batch(batch).await;
            }
        }
        total
    }

    /// Embed and upsert one batch, returning the number of stored vectors
    async fn store_batch(&self, chunks: &[Chunk]) -> usize {
        if chunks.is_empty() {
            return 0;
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = match self.embedder.embed_batch(&texts).await {
            Ok(vectors) if vectors.len() == texts.len() => vectors,
            Ok(vectors) => {
                tracing::warn!(
                    "Embedding returned {} vectors for {} texts, skipping batch",
                    vectors.len(),
                    texts.len()
                );
                return 0;
            }
            Err(e) => {
                tracing::warn!("Embedding failed for {} chunks: {}", chunks.len(), e);
                return 0;
            }
        };

        let points: Vec<Point> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| Point {
                id: chunk.point_id(),
                vector,
                payload: chunk.to_payload(),
            })
            .collect();

        match self.store.upsert(&points).await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("Upsert of {} points failed: {}", points.len(), e);
                0
            }
        }
    }
}
