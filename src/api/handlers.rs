//! HTTP request handlers for the chunking service.

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use super::error::ApiError;
use crate::chunkers::{prefixed_documents, ReviewChunker};
use crate::output::{EmbeddingClient, KeywordClient};
use crate::types::{
    ChunkConfig, ChunkRequest, ChunkResponse, ChunkSetIndex, IndexResponse, KeywordsResponse,
    OutputMode, ServiceConfig,
};

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServiceConfig,
    pub embedding_client: Option<Arc<EmbeddingClient>>,
    pub keyword_client: Option<Arc<KeywordClient>>,
}

impl AppState {
    pub fn new(config: ServiceConfig, embedding_client: Option<EmbeddingClient>) -> Self {
        Self {
            config,
            embedding_client: embedding_client.map(Arc::new),
            keyword_client: None,
        }
    }

    /// Enable the keywords endpoint.
    pub fn with_keyword_client(mut self, keyword_client: Option<KeywordClient>) -> Self {
        self.keyword_client = keyword_client.map(Arc::new);
        self
    }

    /// Build the chunker a request asks for, falling back to service defaults.
    fn chunker(&self, request: &ChunkRequest) -> Result<ReviewChunker, ApiError> {
        let config = request.config.unwrap_or_else(|| self.config.chunk_config());
        let strategy = request.strategy.as_deref().unwrap_or("watermark");
        let chunker = ReviewChunker::chunker_by_name(strategy)
            .ok_or_else(|| ApiError::BadRequest(format!("unknown chunking strategy: {strategy}")))?;
        Ok(ReviewChunker::with_chunker(chunker, config))
    }
}

/// Reject limits a downstream service cannot accept, before any chunking.
fn check_ceiling(chunker: &ReviewChunker, limit: usize, service: &str) -> Result<(), ApiError> {
    let high = chunker.config().high_watermark;
    if high > limit {
        return Err(ApiError::BadRequest(format!(
            "high watermark ({high}) exceeds the {service} limit ({limit})"
        )));
    }
    Ok(())
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Chunker description for the config endpoint.
#[derive(Debug, Serialize)]
pub struct ChunkerInfo {
    name: String,
    description: String,
}

/// Active configuration response.
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    config: ChunkConfig,
    chunkers: Vec<ChunkerInfo>,
    embedding_enabled: bool,
    keywords_enabled: bool,
}

/// Get the default chunk configuration.
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        config: state.config.chunk_config(),
        chunkers: ReviewChunker::list_chunkers()
            .into_iter()
            .map(|(name, desc)| ChunkerInfo {
                name: name.to_string(),
                description: desc.to_string(),
            })
            .collect(),
        embedding_enabled: state.embedding_client.is_some(),
        keywords_enabled: state.keyword_client.is_some(),
    })
}

/// Chunk a review index.
pub async fn chunk(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChunkRequest>,
) -> Result<Json<ChunkResponse>, ApiError> {
    let chunker = state.chunker(&request)?;
    let games = request.reviews.len();
    let mode = request.mode;

    info!(games, mode = ?mode, strategy = chunker.strategy(), "Received chunk request");

    let reviews = request.reviews;
    let sets = tokio::task::spawn_blocking(move || chunker.chunk_sets(&reviews)).await??;
    let chunk_sets: ChunkSetIndex = sets
        .into_iter()
        .map(|(game, chunks)| (game, chunks.into_iter().map(|c| c.content).collect()))
        .collect();
    let total_chunks = chunk_sets.values().map(Vec::len).sum();

    let (chunks, documents) = match mode {
        OutputMode::Keyed => (Some(chunk_sets), None),
        OutputMode::Prefixed => (None, Some(prefixed_documents(&chunk_sets))),
    };

    Ok(Json(ChunkResponse {
        games,
        total_chunks,
        chunks,
        documents,
        generated_at: Utc::now(),
    }))
}

/// Chunk a review index and push the chunks to the embedding service.
pub async fn index(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChunkRequest>,
) -> Result<Json<IndexResponse>, ApiError> {
    let client = state.embedding_client.clone().ok_or_else(|| {
        ApiError::ServiceUnavailable("no embedding service configured".to_string())
    })?;

    let chunker = state.chunker(&request)?;
    check_ceiling(&chunker, client.max_input_chars(), "embedding service")?;

    let games = request.reviews.len();
    let reviews = request.reviews;
    let chunks = tokio::task::spawn_blocking(move || chunker.chunk_index(&reviews)).await??;

    let embedded = client.send_chunks(&chunks).await?;
    info!(games, chunks = chunks.len(), embedded, "Indexed review chunks");

    Ok(Json(IndexResponse {
        games,
        total_chunks: chunks.len(),
        embedded,
    }))
}

/// Chunk a review index and ask the chat service for keywords per game.
pub async fn keywords(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChunkRequest>,
) -> Result<Json<KeywordsResponse>, ApiError> {
    let client = state.keyword_client.clone().ok_or_else(|| {
        ApiError::ServiceUnavailable("no chat service configured".to_string())
    })?;

    let chunker = state.chunker(&request)?;
    check_ceiling(&chunker, client.max_input_chars(), "chat model")?;

    let games = request.reviews.len();
    let reviews = request.reviews;
    let chunks = tokio::task::spawn_blocking(move || chunker.chunk_index(&reviews)).await??;

    let keywords = client.keywords_by_game(&chunks).await?;
    info!(games, chunks = chunks.len(), "Extracted review keywords");

    Ok(Json(KeywordsResponse {
        games,
        total_chunks: chunks.len(),
        keywords,
    }))
}
