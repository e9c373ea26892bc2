//! Paragraph chunking with a character bound

use crate::config::ChunkingConfig;
use crate::types::{Article, Chunk, ChunkMetadata};

/// Separator placed between paragraphs inside a chunk
const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Greedy paragraph chunker
///
/// Paragraphs are never split: one longer than `max_chunk_size` becomes its
/// own oversized chunk. Chunks do not overlap.
#[derive(Debug, Clone)]
pub struct ParagraphChunker {
    /// Maximum chunk size in characters
    max_chunk_size: usize,
}

impl ParagraphChunker {
    /// Create a new chunker
    pub fn new(max_chunk_size: usize) -> Self {
        Self { max_chunk_size }
    }

    /// Create from chunking config
    ///
    /// `min_chunk_size` is not applied: undersized chunks are kept as is.
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size)
    }

    /// Maximum chunk size in characters
    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Chunk an article into ordered chunks with ids `0..n`
    pub fn chunk(&self, article: &Article) -> Vec<Chunk> {
        let paragraphs = split_paragraphs(&article.content);
        let metadata = ChunkMetadata {
            title: article.title.clone(),
            timestamp: article.timestamp.clone(),
            total_paragraphs: paragraphs.len(),
        };

        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for paragraph in paragraphs {
            let paragraph_len = paragraph.chars().count();

            if current.is_empty() {
                current.push_str(&paragraph);
                current_len = paragraph_len;
                continue;
            }

            let joined_len = current_len + PARAGRAPH_SEPARATOR.len() + paragraph_len;
            if joined_len <= self.max_chunk_size {
                current.push_str(PARAGRAPH_SEPARATOR);
                current.push_str(&paragraph);
                current_len = joined_len;
            } else {
                let text = std::mem::replace(&mut current, paragraph);
                current_len = paragraph_len;
                chunks.push(self.make_chunk(article, &metadata, text, chunks.len()));
            }
        }

        // Final buffer is always flushed
        if !current.is_empty() {
            chunks.push(self.make_chunk(article, &metadata, current, chunks.len()));
        }

        chunks
    }

    fn make_chunk(
        &self,
        article: &Article,
        metadata: &ChunkMetadata,
        text: String,
        index: usize,
    ) -> Chunk {
        Chunk {
            text,
            source: article.url.clone(),
            chunk_id: index as u32,
            metadata: metadata.clone(),
        }
    }
}

/// Split text on blank lines into trimmed, non-empty paragraphs
///
/// Paragraphs are slices of the input, so line endings inside a paragraph
/// (including `\r\n`) are kept as written.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut start: Option<usize> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            if let Some(begin) = start.take() {
                paragraphs.push(&text[begin..offset]);
            }
        } else if start.is_none() {
            start = Some(offset);
        }
        offset += line.len();
    }
    if let Some(begin) = start {
        paragraphs.push(&text[begin..]);
    }

    paragraphs
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
