//! Review Chunker Library
//!
//! Splits game reviews into bounded-size chunks and recombines small
//! fragments so downstream embedding and LLM calls stay under their
//! input-size limits.

pub mod api;
pub mod chunkers;
pub mod error;
pub mod output;
pub mod source;
pub mod types;

pub use chunkers::{
    aggregate, chunk_reviews, prefixed_documents, split_oversized, Chunker, FixedSizeChunker,
    ReviewChunker, WatermarkChunker,
};
pub use error::ChunkError;
pub use types::{ChunkConfig, ChunkSetIndex, GameReviewIndex, OutputMode, ReviewChunk};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::chunkers::*;
    pub use crate::error::ChunkError;
    pub use crate::types::*;
}

/// Maximum characters in a single split piece
pub const DEFAULT_MAX_LEN: usize = 2000;

/// A running chunk above this size closes; at or above it, it stops absorbing pieces
pub const DEFAULT_LOW_WATERMARK: usize = 1500;

/// Hard ceiling on combined chunk length
pub const DEFAULT_HIGH_WATERMARK: usize = 2000;

/// Separator between the game name and the chunk in prefixed output
pub const PREFIX_SEPARATOR: &str = ": ";

/// Chat model asked for keywords when none is configured
pub const DEFAULT_KEYWORD_MODEL: &str = "gpt-3.5-turbo";
