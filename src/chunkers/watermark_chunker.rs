//! Split-then-aggregate chunker.

use super::base::{to_review_chunks, Chunker};
use super::split::{aggregate, split_oversized};
use crate::error::Result;
use crate::types::{ChunkConfig, ReviewChunk};

/// Chunker that splits oversized reviews and merges small pieces between
/// the low and high watermarks.
///
/// This is the default strategy: it minimises the number of chunks sent
/// downstream while keeping each one under the high watermark.
#[derive(Debug, Default, Clone, Copy)]
pub struct WatermarkChunker;

impl WatermarkChunker {
    /// Create a new watermark chunker.
    pub fn new() -> Self {
        Self
    }
}

impl Chunker for WatermarkChunker {
    fn name(&self) -> &'static str {
        "watermark"
    }

    fn description(&self) -> &'static str {
        "Splits oversized reviews and merges small pieces up to a size ceiling"
    }

    fn chunk(&self, game: &str, reviews: &[String], config: &ChunkConfig) -> Result<Vec<ReviewChunk>> {
        config.validate()?;
        let pieces = split_oversized(reviews, config.max_len)?;
        let texts = aggregate(pieces, config.low_watermark, config.high_watermark)?;
        Ok(to_review_chunks(game, texts))
    }
}
