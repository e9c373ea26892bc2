//! Provider abstractions for embeddings, generation and vector storage
//!
//! Remote implementations talk to an OpenAI-compatible embedding API, the
//! Gemini API and Qdrant; the in-process vector store needs no services.

pub mod embedding;
pub mod gemini;
pub mod llm;
pub mod memory;
pub mod openai;
pub mod qdrant;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use gemini::GeminiClient;
pub use llm::{GenerationParams, LlmProvider};
pub use memory::MemoryVectorStore;
pub use openai::OpenAiEmbedder;
pub use qdrant::QdrantStore;
pub use vector_store::{CollectionInfo, DistanceMetric, VectorHit, VectorStoreProvider};
