//! Error types for the news RAG system

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG system errors
///
/// Backend variants are produced by providers and are downgraded to
/// empty/zero/fallback results at the core boundary. Only `Config` is
/// meant to reach the process entry point.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Raw article file could not be read or deserialized
    #[error("Failed to parse article '{}': {message}", path.display())]
    ArticleParse { path: PathBuf, message: String },

    /// Invalid request input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Embedding backend error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Vector index error
    #[error("Vector database error: {0}")]
    VectorDb(String),

    /// Generation backend error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Cache backend error
    #[error("Cache error: {0}")]
    Cache(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create an article parse error
    pub fn article_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ArticleParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a vector db error
    pub fn vector_db(message: impl Into<String>) -> Self {
        Self::VectorDb(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create a cache error
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache(message.into())
    }

    /// Whether this error is fatal at startup
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
