//! news-rag: question answering over a corpus of crawled news articles
//!
//! Articles are split into paragraph-bounded chunks, embedded, and upserted
//! into a vector index under deterministic ids, so re-ingesting unchanged
//! content never duplicates points. Questions are answered by retrieving the
//! most similar chunks and asking a generation backend for a grounded answer.
//! A background watcher ingests newly crawled files as they appear.

pub mod cache;
pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod state;
pub mod types;
pub mod watcher;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use ingestion::Ingestor;
pub use retrieval::RagEngine;
pub use state::AppState;
pub use types::{
    article::{Article, Chunk, Point},
    query::QueryRequest,
    response::{CollectionStats, HealthReport, IngestReport, QueryResult, SearchHit, SystemStats},
};
pub use watcher::AutoIngest;
