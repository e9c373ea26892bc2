//! Vector store provider trait for storing and searching embeddings

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::types::{Point, PointPayload};

/// Similarity metric of a collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DistanceMetric {
    #[default]
    Cosine,
}

impl DistanceMetric {
    /// Name used by the Qdrant API
    pub fn as_qdrant(&self) -> &'static str {
        match self {
            Self::Cosine => "Cosine",
        }
    }
}

/// Search result from vector store
#[derive(Debug, Clone)]
pub struct VectorHit {
    pub id: Uuid,
    /// Similarity score (higher is more similar)
    pub score: f32,
    pub payload: PointPayload,
}

/// Collection introspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInfo {
    /// Number of stored points
    pub count: usize,
    /// Vector dimensionality
    pub dimensions: usize,
    pub healthy: bool,
}

/// Trait for vector storage and similarity search over one named collection
///
/// Implementations:
/// - `QdrantStore`: Qdrant REST API
/// - `MemoryVectorStore`: in-process exact search
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Create the collection if it does not exist
    async fn ensure_collection(&self, dimensions: usize, metric: DistanceMetric) -> Result<()>;

    /// Insert or overwrite points by id, returning the number written
    async fn upsert(&self, points: &[Point]) -> Result<usize>;

    /// Search for similar points
    ///
    /// Hits scoring below `score_threshold` are never returned; results are
    /// ordered by non-increasing score.
    async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        score_threshold: f32,
    ) -> Result<Vec<VectorHit>>;

    /// Drop the whole collection
    async fn delete_collection(&self) -> Result<()>;

    /// Collection statistics; fails if the collection does not exist
    async fn stats(&self) -> Result<CollectionInfo>;

    /// Collection name
    fn collection(&self) -> &str;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
