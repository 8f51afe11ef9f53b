//! Review collections and request/response definitions.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChunkConfig, OutputMode};

/// Game name -> reviews in scrape order.
///
/// Ordered by game name so every run over the same input is identical.
pub type GameReviewIndex = BTreeMap<String, Vec<String>>;

/// Game name -> chunks in review order.
pub type ChunkSetIndex = BTreeMap<String, Vec<String>>;

/// Request to chunk a review index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRequest {
    /// Reviews keyed by game name
    pub reviews: GameReviewIndex,

    /// Overrides the service's default limits
    #[serde(default)]
    pub config: Option<ChunkConfig>,

    /// Output shape
    #[serde(default)]
    pub mode: OutputMode,

    /// Chunking strategy by name; the watermark strategy when absent
    #[serde(default)]
    pub strategy: Option<String>,
}

/// Response from a chunk request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkResponse {
    /// Number of games in the request
    pub games: usize,

    /// Chunks produced across all games
    pub total_chunks: usize,

    /// Present in keyed mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks: Option<ChunkSetIndex>,

    /// Present in prefixed mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<String>>,

    pub generated_at: DateTime<Utc>,
}

/// Response from an index request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResponse {
    pub games: usize,
    pub total_chunks: usize,
    /// Chunks the embedding service acknowledged
    pub embedded: usize,
}

/// Response from a keywords request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordsResponse {
    pub games: usize,
    pub total_chunks: usize,
    /// Keywords found across each game's chunks
    pub keywords: BTreeMap<String, BTreeSet<String>>,
}
