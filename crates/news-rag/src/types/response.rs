//! Result types returned by ingestion and query operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::article::PointPayload;

/// A single similarity hit, produced per query and never persisted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub text: String,
    pub source: String,
    pub title: String,
    /// Similarity score reported by the index
    pub score: f32,
    pub timestamp: String,
}

impl SearchHit {
    /// Build a hit from a stored payload and its score
    pub fn from_payload(payload: PointPayload, score: f32) -> Self {
        Self {
            text: payload.text,
            source: payload.source,
            title: payload.title,
            score,
            timestamp: payload.timestamp,
        }
    }
}

/// Answer to a question with its sources
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    /// Generated answer
    pub answer: String,
    /// Unique source URLs, in order of first appearance
    pub sources: Vec<String>,
    /// Retrieval-based confidence in `[0, 1]`
    pub confidence: f32,
    /// Wall-clock seconds, rounded to 2 decimals
    pub response_time: f64,
    /// Served from the query cache
    #[serde(default)]
    pub cached: bool,
    /// Number of chunks used as context
    #[serde(default)]
    pub chunks_found: usize,
}

/// Outcome of an ingestion run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestReport {
    pub success: bool,
    pub files_processed: usize,
    pub vectors_created: usize,
    pub message: String,
}

impl IngestReport {
    /// A run that found nothing to ingest
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            files_processed: 0,
            vectors_created: 0,
            message: message.into(),
        }
    }

    /// A run that processed `files_processed` articles
    pub fn completed(files_processed: usize, vectors_created: usize, message: String) -> Self {
        Self {
            success: true,
            files_processed,
            vectors_created,
            message,
        }
    }
}

/// Vector collection statistics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionStats {
    pub total_vectors: usize,
    pub vector_size: usize,
    /// `"healthy"` or `"error: …"`
    pub status: String,
}

impl CollectionStats {
    /// Whether the collection answered the stats call
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Service health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// `"healthy"` or `"partial"`
    pub status: String,
    pub vector_db_connected: bool,
    pub cache_connected: bool,
    pub embedding_configured: bool,
    /// Number of stored vectors
    pub articles_count: usize,
    pub timestamp: DateTime<Utc>,
}

/// Quick system statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStats {
    /// Raw documents currently in the crawled directory
    pub crawled_files: usize,
    pub total_vectors: usize,
    pub vector_size: usize,
    pub collection_status: String,
    pub embedding_model: String,
    pub generation_model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_report_has_zero_counts() {
        let report = IngestReport::failed("No articles found");
        assert!(!report.success);
        assert_eq!(report.files_processed, 0);
        assert_eq!(report.vectors_created, 0);
    }

    #[test]
    fn test_hit_from_payload() {
        let payload = PointPayload {
            text: "ETH upgrade".to_string(),
            source: "https://news.example/eth".to_string(),
            chunk_id: 0,
            title: "ETH".to_string(),
            timestamp: "2025-02-01T00:00:00Z".to_string(),
            total_paragraphs: 1,
        };
        let hit = SearchHit::from_payload(payload, 0.82);
        assert_eq!(hit.source, "https://news.example/eth");
        assert_eq!(hit.score, 0.82);
    }
}
