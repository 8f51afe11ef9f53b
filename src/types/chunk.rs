//! Chunk type definitions.

use serde::{Deserialize, Serialize};

use crate::PREFIX_SEPARATOR;

/// A chunk of review text ready for embedding or summarization.
///
/// Chunks have no identity beyond the call that produced them; the game
/// name and position are carried so downstream stores can tag documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewChunk {
    /// Game the reviews belong to
    pub game: String,

    /// The chunk text, one or more review fragments concatenated
    pub content: String,

    /// Order of this chunk within its game's chunk set (0-indexed)
    pub chunk_index: usize,

    /// Length of `content` in characters
    pub char_count: usize,

    /// Estimated tokens in `content` (cl100k_base)
    pub token_count: usize,
}

impl ReviewChunk {
    /// Create a new chunk, measuring its character length.
    pub fn new(game: &str, content: String, chunk_index: usize, token_count: usize) -> Self {
        Self {
            game: game.to_string(),
            char_count: content.chars().count(),
            content,
            chunk_index,
            token_count,
        }
    }

    /// Render as a flat document: `"<game>: <content>"`.
    pub fn to_document(&self) -> String {
        format!("{}{}{}", self.game, PREFIX_SEPARATOR, self.content)
    }

    /// Get the length of the chunk content in characters.
    pub fn len(&self) -> usize {
        self.char_count
    }

    /// Check if the chunk is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
