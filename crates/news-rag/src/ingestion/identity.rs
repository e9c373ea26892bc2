//! Deterministic point identity
//!
//! A point id depends only on the chunk's source URL, its position within
//! the article and a hash of its text, so re-ingesting unchanged content
//! overwrites the same points.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::types::Chunk;

/// Hex SHA-256 of a text
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Point id for `(source, chunk_id, text)`
pub fn point_id(source: &str, chunk_id: u32, text: &str) -> Uuid {
    let key = format!("{}_{}_{}", source, chunk_id, content_hash(text));
    let digest = Sha256::digest(key.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(bytes)
}

impl Chunk {
    /// Deterministic id of the point storing this chunk
    pub fn point_id(&self) -> Uuid {
        point_id(&self.source, self.chunk_id, &self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_content_hash_known_value() {
        assert_eq!(
            content_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_id_depends_on_every_component() {
        let base = point_id("https://a", 0, "text");
        assert_ne!(base, point_id("https://b", 0, "text"));
        assert_ne!(base, point_id("https://a", 1, "text"));
        assert_ne!(base, point_id("https://a", 0, "text!"));
    }

    #[test]
    fn test_id_is_stable_across_processes() {
        // Pinned: stored ids must not change between releases.
        let id = point_id("https://news.example/btc", 0, "Bitcoin rallies.");
        assert_eq!(id.to_string(), "71d38c8b-5bd7-cb86-7941-9ee79b850312");
    }

    proptest! {
        #[test]
        fn id_is_deterministic(source in ".{0,40}", chunk_id in 0u32..1000, text in ".{0,200}") {
            prop_assert_eq!(point_id(&source, chunk_id, &text), point_id(&source, chunk_id, &text));
        }
    }
}
