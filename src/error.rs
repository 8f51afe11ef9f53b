//! Error types for the chunking core.

use thiserror::Error;

/// Errors intrinsic to chunking.
///
/// Everything else (network, malformed files, rate limits) belongs to the
/// sources and outputs at the boundary and is reported there with `anyhow`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// Watermark or piece-size values that cannot produce valid chunks.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, ChunkError>;
