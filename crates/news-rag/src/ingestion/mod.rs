//! Article ingestion: loading, paragraph chunking, identity and vector upsert

mod chunker;
pub mod identity;
pub mod loader;
mod pipeline;

pub use chunker::ParagraphChunker;
pub use identity::{content_hash, point_id};
pub use loader::{list_article_files, load_article, load_articles};
pub use pipeline::Ingestor;
