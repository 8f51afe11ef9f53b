//! Fixed-size chunker that never merges reviews.

use super::base::{to_review_chunks, Chunker};
use super::split::split_oversized;
use crate::error::Result;
use crate::types::{ChunkConfig, ReviewChunk};

/// Chunker that only splits oversized reviews.
///
/// Each piece becomes its own chunk, so no chunk mixes text from two
/// reviews. Watermarks are still validated but otherwise unused.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedSizeChunker;

impl FixedSizeChunker {
    /// Create a new fixed-size chunker.
    pub fn new() -> Self {
        Self
    }
}

impl Chunker for FixedSizeChunker {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn description(&self) -> &'static str {
        "Splits oversized reviews into fixed-size pieces without merging"
    }

    fn chunk(&self, game: &str, reviews: &[String], config: &ChunkConfig) -> Result<Vec<ReviewChunk>> {
        config.validate()?;
        let pieces = split_oversized(reviews, config.max_len)?;
        Ok(to_review_chunks(game, pieces))
    }
}
