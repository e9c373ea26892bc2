//! Retrieval and grounded answer generation

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::cache::{CacheNamespace, RagCache};
use crate::config::RagConfig;
use crate::generation::PromptBuilder;
use crate::providers::{EmbeddingProvider, GenerationParams, LlmProvider, VectorStoreProvider};
use crate::types::{CollectionStats, QueryResult, SearchHit};

/// Answer returned when the generation backend fails
pub const GENERATION_ERROR_ANSWER: &str = "Sorry, I encountered an error generating the response.";
/// Answer returned when the generation backend produces no text
pub const EMPTY_ANSWER: &str =
    "I couldn't generate a proper response. Please try rephrasing your question.";

/// Scale applied to the mean hit score
const CONFIDENCE_FACTOR: f64 = 1.5;

/// Embeds queries, searches the index and composes grounded answers
///
/// No method returns an error. Embedding and search failures give an empty
/// hit list; generation failures give a fixed answer with zero confidence.
pub struct RagEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    store: Arc<dyn VectorStoreProvider>,
    cache: Option<Arc<RagCache>>,
    params: GenerationParams,
    default_max_results: usize,
    score_threshold: f32,
}

impl RagEngine {
    /// Create an engine without a query cache
    pub fn new(
        config: &RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        store: Arc<dyn VectorStoreProvider>,
    ) -> Self {
        Self {
            embedder,
            llm,
            store,
            cache: None,
            params: GenerationParams::from_config(&config.generation),
            default_max_results: config.search.max_results,
            score_threshold: config.search.score_threshold,
        }
    }

    /// Serve and store query results and query embeddings through `cache`
    pub fn with_cache(mut self, cache: Arc<RagCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Whether a query cache is attached
    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }

    /// Find the chunks most similar to `query`, best first
    ///
    /// Hits come back in index order; the threshold is applied by the index.
    pub async fn search_similar(&self, query: &str, max_results: Option<usize>) -> Vec<SearchHit> {
        let limit = max_results.unwrap_or(self.default_max_results);

        let vector = match self.embed_query(query).await {
            Some(vector) => vector,
            None => return Vec::new(),
        };

        match self.store.search(&vector, limit, self.score_threshold).await {
            Ok(hits) => hits
                .into_iter()
                .map(|hit| SearchHit::from_payload(hit.payload, hit.score))
                .collect(),
            Err(e) => {
                tracing::warn!("Vector search failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn embed_query(&self, query: &str) -> Option<Vec<f32>> {
        if let Some(cache) = &self.cache {
            if let Some(vector) = cache.get::<Vec<f32>>(CacheNamespace::Embedding, query).await {
                return Some(vector);
            }
        }

        let vector = match self.embedder.embed(query).await {
            Ok(vector) if !vector.is_empty() => vector,
            Ok(_) => {
                tracing::warn!("Empty query embedding from {}", self.embedder.name());
                return None;
            }
            Err(e) => {
                tracing::warn!("Query embedding failed: {}", e);
                return None;
            }
        };

        if let Some(cache) = &self.cache {
            cache.set(CacheNamespace::Embedding, query, &vector).await;
        }
        Some(vector)
    }

    /// Generate an answer grounded in `hits`, with a retrieval confidence
    ///
    /// The generation backend is called even when `hits` is empty.
    pub async fn generate_answer(&self, query: &str, hits: &[SearchHit]) -> (String, f32) {
        let prompt = PromptBuilder::build(query, hits);

        match self.llm.generate(&prompt, &self.params).await {
            Ok(text) => {
                let answer = text.trim();
                if answer.is_empty() {
                    tracing::warn!("{} returned no text", self.llm.name());
                    return (EMPTY_ANSWER.to_string(), 0.0);
                }
                (answer.to_string(), confidence(hits))
            }
            Err(e) => {
                tracing::error!("Answer generation failed: {}", e);
                (GENERATION_ERROR_ANSWER.to_string(), 0.0)
            }
        }
    }

    /// Search, then generate, timing the whole call
    pub async fn answer_question(&self, query: &str, max_results: Option<usize>) -> QueryResult {
        let start = Instant::now();
        let limit = max_results.unwrap_or(self.default_max_results);
        let cache_input = format!("{}|{}", limit, query.trim());

        if let Some(cache) = &self.cache {
            if let Some(mut result) = cache
                .get::<QueryResult>(CacheNamespace::Query, &cache_input)
                .await
            {
                result.cached = true;
                result.response_time = round2(start.elapsed().as_secs_f64());
                return result;
            }
        }

        let hits = self.search_similar(query, Some(limit)).await;
        let (answer, confidence) = self.generate_answer(query, &hits).await;

        let result = QueryResult {
            sources: unique_sources(&hits),
            chunks_found: hits.len(),
            answer,
            confidence,
            response_time: round2(start.elapsed().as_secs_f64()),
            cached: false,
        };

        tracing::info!(
            "Answered in {:.2}s from {} chunks (confidence {:.2})",
            result.response_time,
            result.chunks_found,
            result.confidence
        );

        if let Some(cache) = &self.cache {
            if !is_fallback_answer(&result.answer) {
                cache.set(CacheNamespace::Query, &cache_input, &result).await;
            }
        }
        result
    }

    /// Collection size and status, or zero counts with the error text
    pub async fn get_collection_stats(&self) -> CollectionStats {
        match self.store.stats().await {
            Ok(info) => CollectionStats {
                total_vectors: info.count,
                vector_size: info.dimensions,
                status: "healthy".to_string(),
            },
            Err(e) => CollectionStats {
                total_vectors: 0,
                vector_size: 0,
                status: format!("error: {}", e),
            },
        }
    }
}

fn is_fallback_answer(answer: &str) -> bool {
    answer == GENERATION_ERROR_ANSWER || answer == EMPTY_ANSWER
}

/// `min(mean(score) * 1.5, 1.0)` rounded to 2 decimals; 0 without hits
pub fn confidence(hits: &[SearchHit]) -> f32 {
    if hits.is_empty() {
        return 0.0;
    }
    let mean = hits.iter().map(|h| h.score as f64).sum::<f64>() / hits.len() as f64;
    round2((mean * CONFIDENCE_FACTOR).clamp(0.0, 1.0)) as f32
}

/// Non-empty sources in order of first appearance
pub fn unique_sources(hits: &[SearchHit]) -> Vec<String> {
    let mut seen = HashSet::new();
    hits.iter()
        .filter(|h| !h.source.is_empty())
        .filter(|h| seen.insert(h.source.as_str()))
        .map(|h| h.source.clone())
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
