//! HTTP client for sending chunks to the embedding service.

use std::time::Duration;

use anyhow::{bail, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use uuid::Uuid;

use super::retry::RetryPolicy;
use crate::types::{ReviewChunk, ServiceConfig};
use crate::DEFAULT_HIGH_WATERMARK;

/// Client for sending chunks to the embedding service.
pub struct EmbeddingClient {
    client: Client,
    base_url: String,
    batch_size: usize,
    max_input_chars: usize,
    retry: RetryPolicy,
}

/// Request payload for embedding chunks.
#[derive(Debug, Serialize)]
struct EmbedChunksRequest<'a> {
    chunks: Vec<ChunkForEmbedding<'a>>,
}

/// Chunk data sent to embedding service.
#[derive(Debug, Serialize)]
struct ChunkForEmbedding<'a> {
    id: String,
    content: &'a str,
    metadata: ChunkTags<'a>,
}

/// Metadata the index can filter on.
#[derive(Debug, Serialize)]
struct ChunkTags<'a> {
    game: &'a str,
    chunk_index: usize,
    token_count: usize,
}

/// Response from embedding service.
#[derive(Debug, Deserialize)]
struct EmbedChunksResponse {
    embedded_count: usize,
    #[serde(default)]
    errors: Vec<String>,
}

impl EmbeddingClient {
    /// Create a new embedding client.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            batch_size: 50,
            max_input_chars: DEFAULT_HIGH_WATERMARK,
            retry: RetryPolicy::default(),
        })
    }

    /// Create a client from service configuration, if an embedding URL is set.
    pub fn from_config(config: &ServiceConfig) -> Result<Option<Self>> {
        let Some(url) = config.embedding_service_url.as_deref() else {
            return Ok(None);
        };
        Ok(Some(
            Self::new(url)?
                .with_batch_size(config.embedding_batch_size)
                .with_max_input_chars(config.embedding_max_input_chars)
                .with_retry(RetryPolicy::from(config)),
        ))
    }

    /// Set the batch size for sending chunks.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Set the largest chunk the service accepts.
    pub fn with_max_input_chars(mut self, max: usize) -> Self {
        self.max_input_chars = max;
        self
    }

    /// Set the retry policy for failed batches.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Largest chunk the service accepts, in characters.
    pub fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }

    /// Send chunks to the embedding service.
    ///
    /// Every chunk is checked against the input limit before anything is
    /// sent. Batches that still fail after retrying are logged and skipped.
    pub async fn send_chunks(&self, chunks: &[ReviewChunk]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        if let Some(oversized) = chunks.iter().find(|c| c.char_count > self.max_input_chars) {
            bail!(
                "chunk {} of {} has {} characters, service limit is {}",
                oversized.chunk_index,
                oversized.game,
                oversized.char_count,
                self.max_input_chars
            );
        }

        info!(chunk_count = chunks.len(), "Sending chunks to embedding service");

        let mut total_embedded = 0;

        for batch in chunks.chunks(self.batch_size) {
            match self.retry.run("embed batch", || self.send_batch(batch)).await {
                Ok(count) => {
                    total_embedded += count;
                    debug!(batch_size = batch.len(), embedded = count, "Batch sent successfully");
                }
                Err(e) => {
                    error!(error = %e, "Failed to send batch to embedding service");
                }
            }
        }

        info!(total_embedded, "Finished sending chunks to embedding service");
        Ok(total_embedded)
    }

    /// Send a single batch of chunks.
    async fn send_batch(&self, chunks: &[ReviewChunk]) -> Result<usize> {
        let request = EmbedChunksRequest {
            chunks: chunks
                .iter()
                .map(|c| ChunkForEmbedding {
                    id: Uuid::new_v4().to_string(),
                    content: &c.content,
                    metadata: ChunkTags {
                        game: &c.game,
                        chunk_index: c.chunk_index,
                        token_count: c.token_count,
                    },
                })
                .collect(),
        };

        let url = format!("{}/embed/chunks", self.base_url);
        let response = self.client.post(&url).json(&request).send().await?;

        if response.status().is_success() {
            let result: EmbedChunksResponse = response.json().await?;
            for error in &result.errors {
                error!(error, "Embedding service reported error");
            }
            Ok(result.embedded_count)
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            bail!("Embedding service returned {}: {}", status, text)
        }
    }

    /// Check if the embedding service is healthy.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn spawn_embedding_service() -> String {
        let app = Router::new().route(
            "/embed/chunks",
            post(|Json(body): Json<Value>| async move {
                let count = body["chunks"].as_array().map_or(0, |c| c.len());
                Json(json!({ "embedded_count": count }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn chunks(count: usize) -> Vec<ReviewChunk> {
        (0..count)
            .map(|i| ReviewChunk::new("Terraria", format!("review {i}"), i, 2))
            .collect()
    }

    #[test]
    fn test_client_creation() {
        let client = EmbeddingClient::new("http://localhost:3018/").unwrap();
        assert_eq!(client.batch_size, 50);
        assert_eq!(client.base_url, "http://localhost:3018");
    }

    #[test]
    fn test_from_config_without_url() {
        let client = EmbeddingClient::from_config(&ServiceConfig::default()).unwrap();
        assert!(client.is_none());
    }

    #[tokio::test]
    async fn test_oversized_chunk_rejected_before_sending() {
        let client = EmbeddingClient::new("http://127.0.0.1:9")
            .unwrap()
            .with_max_input_chars(5);
        let result = client.send_chunks(&chunks(1)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_sends_in_batches() {
        let url = spawn_embedding_service().await;
        let client = EmbeddingClient::new(&url).unwrap().with_batch_size(3);
        let embedded = client.send_chunks(&chunks(7)).await.unwrap();
        assert_eq!(embedded, 7);
    }

    #[tokio::test]
    async fn test_unreachable_service_skips_batches() {
        let client = EmbeddingClient::new("http://127.0.0.1:9")
            .unwrap()
            .with_retry(RetryPolicy::none());
        let embedded = client.send_chunks(&chunks(2)).await.unwrap();
        assert_eq!(embedded, 0);
        assert!(!client.health_check().await);
    }
}
