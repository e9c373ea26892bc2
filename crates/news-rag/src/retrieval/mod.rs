//! Query embedding, similarity search and answer composition

mod engine;

pub use engine::{confidence, unique_sources, RagEngine, EMPTY_ANSWER, GENERATION_ERROR_ANSWER};
