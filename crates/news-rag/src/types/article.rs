//! Article, chunk and vector point types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A crawled article, one per raw JSON document
///
/// Identity is the `url`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub content: String,
    /// ISO-8601 timestamp as written by the crawler
    pub timestamp: String,
}

/// Metadata copied from the parent article onto every chunk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    pub title: String,
    pub timestamp: String,
    /// Number of non-empty paragraphs in the parent article
    pub total_paragraphs: usize,
}

/// A bounded slice of one article's text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Chunk text
    pub text: String,
    /// Source article URL
    pub source: String,
    /// Position within the article, starting at 0
    pub chunk_id: u32,
    /// Article metadata
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Character length of the chunk text
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Payload stored alongside this chunk's vector
    pub fn to_payload(&self) -> PointPayload {
        PointPayload {
            text: self.text.clone(),
            source: self.source.clone(),
            chunk_id: self.chunk_id,
            title: self.metadata.title.clone(),
            timestamp: self.metadata.timestamp.clone(),
            total_paragraphs: self.metadata.total_paragraphs,
        }
    }
}

/// Payload of a stored point
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PointPayload {
    pub text: String,
    pub source: String,
    pub chunk_id: u32,
    pub title: String,
    pub timestamp: String,
    pub total_paragraphs: usize,
}

/// A stored `(id, vector, payload)` triple in the vector index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: PointPayload,
}
