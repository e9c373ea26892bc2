//! In-process vector store with exact cosine search
//!
//! Holds a single collection in memory. Used when no Qdrant server is
//! configured and as the index for tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::providers::vector_store::{
    CollectionInfo, DistanceMetric, VectorHit, VectorStoreProvider,
};
use crate::types::{Point, PointPayload};

struct Collection {
    dimensions: usize,
    points: HashMap<Uuid, (Vec<f32>, PointPayload)>,
}

/// In-memory vector store
pub struct MemoryVectorStore {
    name: String,
    collection: RwLock<Option<Collection>>,
}

impl MemoryVectorStore {
    /// Create an empty store; the collection does not exist until ensured
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collection: RwLock::new(None),
        }
    }

    /// Ids of all stored points
    pub fn point_ids(&self) -> Vec<Uuid> {
        self.collection
            .read()
            .as_ref()
            .map(|c| c.points.keys().copied().collect())
            .unwrap_or_default()
    }

    fn missing(&self) -> Error {
        Error::vector_db(format!("Collection '{}' not found", self.name))
    }
}

/// Cosine similarity; zero vectors score 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[async_trait]
impl VectorStoreProvider for MemoryVectorStore {
    async fn ensure_collection(&self, dimensions: usize, _metric: DistanceMetric) -> Result<()> {
        let mut collection = self.collection.write();
        if collection.is_none() {
            tracing::debug!("Creating in-memory collection '{}' ({} dims)", self.name, dimensions);
            *collection = Some(Collection {
                dimensions,
                points: HashMap::new(),
            });
        }
        Ok(())
    }

    async fn upsert(&self, points: &[Point]) -> Result<usize> {
        let mut guard = self.collection.write();
        let collection = guard.as_mut().ok_or_else(|| self.missing())?;

        if let Some(bad) = points.iter().find(|p| p.vector.len() != collection.dimensions) {
            return Err(Error::vector_db(format!(
                "Vector dimension mismatch: expected {}, got {}",
                collection.dimensions,
                bad.vector.len()
            )));
        }

        for point in points {
            collection
                .points
                .insert(point.id, (point.vector.clone(), point.payload.clone()));
        }
        Ok(points.len())
    }

    async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        score_threshold: f32,
    ) -> Result<Vec<VectorHit>> {
        let guard = self.collection.read();
        let collection = guard.as_ref().ok_or_else(|| self.missing())?;

        let mut hits: Vec<VectorHit> = collection
            .points
            .iter()
            .map(|(id, (stored, payload))| VectorHit {
                id: *id,
                score: cosine_similarity(vector, stored),
                payload: payload.clone(),
            })
            .filter(|hit| hit.score >= score_threshold)
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn delete_collection(&self) -> Result<()> {
        self.collection
            .write()
            .take()
            .map(|_| ())
            .ok_or_else(|| self.missing())
    }

    async fn stats(&self) -> Result<CollectionInfo> {
        let guard = self.collection.read();
        let collection = guard.as_ref().ok_or_else(|| self.missing())?;
        Ok(CollectionInfo {
            count: collection.points.len(),
            dimensions: collection.dimensions,
            healthy: true,
        })
    }

    fn collection(&self) -> &str {
        &self.name
    }

    fn name(&self) -> &str {
        "memory"
    }
}
