//! Qdrant vector store over the REST API

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

use crate::config::VectorDbConfig;
use crate::error::{Error, Result};
use crate::providers::vector_store::{
    CollectionInfo, DistanceMetric, VectorHit, VectorStoreProvider,
};
use crate::types::{Point, PointPayload};

/// Qdrant collection client
pub struct QdrantStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    collection: String,
}

impl QdrantStore {
    /// Create a client bound to the configured collection
    pub fn new(config: &VectorDbConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            collection: config.collection_name.clone(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.collection)
    }

    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("api-key", key),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Value> {
        let response = self
            .with_auth(request)
            .send()
            .await
            .map_err(|e| Error::vector_db(format!("{} request failed: {}", what, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::vector_db(format!("{} failed ({}): {}", what, status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| Error::vector_db(format!("Failed to parse {} response: {}", what, e)))
    }
}

/// Qdrant ids may be UUID strings or unsigned integers
fn parse_point_id(id: &Value) -> Uuid {
    match id {
        Value::String(s) => Uuid::parse_str(s).unwrap_or_else(|_| Uuid::nil()),
        Value::Number(n) => n
            .as_u64()
            .map(|n| Uuid::from_u128(n as u128))
            .unwrap_or_else(Uuid::nil),
        _ => Uuid::nil(),
    }
}

fn parse_search_hits(body: &Value) -> Result<Vec<VectorHit>> {
    let results = body
        .get("result")
        .and_then(|r| r.as_array())
        .ok_or_else(|| Error::vector_db("search response has no result array"))?;

    Ok(results
        .iter()
        .map(|hit| {
            let payload = hit
                .get("payload")
                .cloned()
                .and_then(|p| serde_json::from_value::<PointPayload>(p).ok())
                .unwrap_or_default();
            VectorHit {
                id: hit.get("id").map(parse_point_id).unwrap_or_else(Uuid::nil),
                score: hit.get("score").and_then(|s| s.as_f64()).unwrap_or(0.0) as f32,
                payload,
            }
        })
        .collect())
}

fn parse_collection_info(body: &Value) -> CollectionInfo {
    let result = &body["result"];
    // `points_count` is null on some server versions while indexing
    let count = result["points_count"]
        .as_u64()
        .or_else(|| result["vectors_count"].as_u64())
        .unwrap_or(0) as usize;
    let dimensions = result["config"]["params"]["vectors"]["size"]
        .as_u64()
        .unwrap_or(0) as usize;
    let healthy = matches!(result["status"].as_str(), Some("green") | Some("yellow"));

    CollectionInfo {
        count,
        dimensions,
        healthy,
    }
}

#[async_trait]
impl VectorStoreProvider for QdrantStore {
    async fn ensure_collection(&self, dimensions: usize, metric: DistanceMetric) -> Result<()> {
        let response = self
            .with_auth(self.client.get(self.collection_url()))
            .send()
            .await
            .map_err(|e| Error::vector_db(format!("Get collection request failed: {}", e)))?;

        if response.status().is_success() {
            return Ok(());
        }
        if response.status() != StatusCode::NOT_FOUND {
            return Err(Error::vector_db(format!(
                "Get collection failed ({})",
                response.status()
            )));
        }

        tracing::info!(
            "Creating collection '{}' ({} dims, {})",
            self.collection,
            dimensions,
            metric.as_qdrant()
        );
        let body = json!({
            "vectors": { "size": dimensions, "distance": metric.as_qdrant() }
        });
        self.send(self.client.put(self.collection_url()).json(&body), "Create collection")
            .await?;
        Ok(())
    }

    async fn upsert(&self, points: &[Point]) -> Result<usize> {
        if points.is_empty() {
            return Ok(0);
        }

        let body = json!({
            "points": points
                .iter()
                .map(|p| json!({ "id": p.id.to_string(), "vector": p.vector, "payload": p.payload }))
                .collect::<Vec<_>>()
        });
        let url = format!("{}/points?wait=true", self.collection_url());
        self.send(self.client.put(url).json(&body), "Upsert").await?;
        Ok(points.len())
    }

    async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        score_threshold: f32,
    ) -> Result<Vec<VectorHit>> {
        let body = json!({
            "vector": vector,
            "limit": top_k,
            "score_threshold": score_threshold,
            "with_payload": true,
        });
        let url = format!("{}/points/search", self.collection_url());
        let response = self.send(self.client.post(url).json(&body), "Search").await?;
        parse_search_hits(&response)
    }

    async fn delete_collection(&self) -> Result<()> {
        self.send(self.client.delete(self.collection_url()), "Delete collection")
            .await?;
        Ok(())
    }

    async fn stats(&self) -> Result<CollectionInfo> {
        let response = self
            .send(self.client.get(self.collection_url()), "Get collection")
            .await?;
        Ok(parse_collection_info(&response))
    }

    fn collection(&self) -> &str {
        &self.collection
    }

    fn name(&self) -> &str {
        "qdrant"
    }
}
