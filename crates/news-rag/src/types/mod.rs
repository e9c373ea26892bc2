//! Core types for articles, chunks, stored points and query results

pub mod article;
pub mod query;
pub mod response;

pub use article::{Article, Chunk, ChunkMetadata, Point, PointPayload};
pub use query::QueryRequest;
pub use response::{
    CollectionStats, HealthReport, IngestReport, QueryResult, SearchHit, SystemStats,
};
