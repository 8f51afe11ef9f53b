//! Core types for review chunking.

mod chunk;
pub(crate) mod config;
mod review;

pub use chunk::ReviewChunk;
pub use config::{ChunkConfig, OutputMode, ServiceConfig};
pub use review::{
    ChunkRequest, ChunkResponse, ChunkSetIndex, GameReviewIndex, IndexResponse, KeywordsResponse,
};
