//! Base trait for all chunkers.

use anyhow::Result as AnyResult;

use crate::error::Result;
use crate::types::{ChunkConfig, ReviewChunk};

/// The core trait that all chunkers must implement.
///
/// A chunker takes one game's reviews and turns them into chunks that fit
/// the limits in [`ChunkConfig`].
pub trait Chunker: Send + Sync {
    /// Get the name of this chunker.
    fn name(&self) -> &'static str;

    /// Chunk one game's reviews with the provided configuration.
    ///
    /// Fails before consuming any review if the configuration is invalid.
    fn chunk(&self, game: &str, reviews: &[String], config: &ChunkConfig)
        -> Result<Vec<ReviewChunk>>;

    /// Get the description of this chunker.
    fn description(&self) -> &'static str {
        "A review chunker"
    }
}

/// Token counter using tiktoken (cl100k_base encoding).
pub struct TiktokenCounter {
    bpe: tiktoken_rs::CoreBPE,
}

impl TiktokenCounter {
    /// Create a new token counter with the cl100k_base encoding.
    pub fn new() -> AnyResult<Self> {
        Ok(Self {
            bpe: tiktoken_rs::cl100k_base()?,
        })
    }

    /// Count the number of tokens in the given text.
    pub fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

/// Estimate token count using the ~4 chars per token heuristic.
pub fn estimate_tokens(text: &str) -> usize {
    (text.chars().count() + 3) / 4
}

/// Count tokens with the shared cl100k_base counter, falling back to the
/// character estimate if the encoding could not be loaded.
pub fn count_tokens(text: &str) -> usize {
    lazy_static::lazy_static! {
        static ref COUNTER: Option<TiktokenCounter> = TiktokenCounter::new().ok();
    }
    match COUNTER.as_ref() {
        Some(counter) => counter.count_tokens(text),
        None => estimate_tokens(text),
    }
}

/// Wrap chunk texts as [`ReviewChunk`]s for one game.
pub(crate) fn to_review_chunks(game: &str, texts: Vec<String>) -> Vec<ReviewChunk> {
    texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| {
            let tokens = count_tokens(&text);
            ReviewChunk::new(game, text, index, tokens)
        })
        .collect()
}
