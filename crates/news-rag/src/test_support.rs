//! In-process fakes shared by unit tests

use async_trait::async_trait;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::config::{RagConfig, VectorBackend};
use crate::error::{Error, Result};
use crate::providers::{
    CollectionInfo, DistanceMetric, EmbeddingProvider, GenerationParams, LlmProvider,
    MemoryVectorStore, VectorHit, VectorStoreProvider,
};
use crate::types::{Article, Point};

/// Config pointing at `crawled_dir` with small vectors and no score floor
pub fn test_config(crawled_dir: &Path) -> RagConfig {
    let mut config = RagConfig::default();
    config.paths.crawled_dir = crawled_dir.to_path_buf();
    config.embeddings.dimensions = 16;
    config.embeddings.api_key = Some("test-key".to_string());
    config.generation.api_key = Some("test-key".to_string());
    config.vector_db.backend = VectorBackend::Memory;
    config.search.score_threshold = 0.0;
    config
}

/// Write an article JSON file into `dir`
pub fn write_article(dir: &Path, file: &str, title: &str, url: &str, content: &str) -> PathBuf {
    let article = Article {
        title: title.to_string(),
        url: url.to_string(),
        content: content.to_string(),
        timestamp: "2025-01-15T10:30:00Z".to_string(),
    };
    let path = dir.join(file);
    std::fs::write(&path, serde_json::to_string_pretty(&article).unwrap()).unwrap();
    path
}

/// Bag-of-words embedder: each token adds 1 to a hashed bucket, then normalize
pub struct HashEmbedder {
    dimensions: usize,
    failing: AtomicBool,
    calls: AtomicUsize,
    max_batch_seen: AtomicUsize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            max_batch_seen: AtomicUsize::new(0),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `embed_batch` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_batch_seen(&self) -> usize {
        self.max_batch_seen.load(Ordering::SeqCst)
    }

    pub fn vector(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lower = text.to_lowercase();
        for token in lower.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let digest = Sha256::digest(token.as_bytes());
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_be_bytes(bytes) % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm == 0.0 {
            vector[0] = 1.0;
            return vector;
        }
        vector.iter().map(|x| x / norm).collect()
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.max_batch_seen.fetch_max(texts.len(), Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::embedding("rate limited"));
        }
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hash"
    }

    fn model(&self) -> &str {
        "hash-bow"
    }
}

/// Generation fake that records prompts and returns a fixed reply
pub struct EchoLlm {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl EchoLlm {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl LlmProvider for EchoLlm {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        assert_eq!(params.candidate_count, 1);
        self.prompts.lock().push(prompt.to_string());
        self.reply
            .clone()
            .ok_or_else(|| Error::llm("503 Service Unavailable"))
    }

    fn name(&self) -> &str {
        "echo"
    }

    fn model(&self) -> &str {
        "echo-1"
    }
}

/// Memory store whose operations can be switched to fail
pub struct FlakyStore {
    inner: MemoryVectorStore,
    failing_upserts: AtomicBool,
    unreachable: AtomicBool,
}

impl FlakyStore {
    pub fn new(name: &str) -> Self {
        Self {
            inner: MemoryVectorStore::new(name),
            failing_upserts: AtomicBool::new(false),
            unreachable: AtomicBool::new(false),
        }
    }

    pub fn set_failing_upserts(&self, failing: bool) {
        self.failing_upserts.store(failing, Ordering::SeqCst);
    }

    /// Fail every operation
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(Error::vector_db("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStoreProvider for FlakyStore {
    async fn ensure_collection(&self, dimensions: usize, metric: DistanceMetric) -> Result<()> {
        self.check()?;
        self.inner.ensure_collection(dimensions, metric).await
    }

    async fn upsert(&self, points: &[Point]) -> Result<usize> {
        self.check()?;
        if self.failing_upserts.load(Ordering::SeqCst) {
            return Err(Error::vector_db("upsert timed out"));
        }
        self.inner.upsert(points).await
    }

    async fn search(&self, vector: &[f32], top_k: usize, score_threshold: f32) -> Result<Vec<VectorHit>> {
        self.check()?;
        self.inner.search(vector, top_k, score_threshold).await
    }

    async fn delete_collection(&self) -> Result<()> {
        self.check()?;
        self.inner.delete_collection().await
    }

    async fn stats(&self) -> Result<CollectionInfo> {
        self.check()?;
        self.inner.stats().await
    }

    fn collection(&self) -> &str {
        self.inner.collection()
    }

    fn name(&self) -> &str {
        "flaky"
    }
}
