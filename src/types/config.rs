//! Configuration types for chunking.

use serde::{Deserialize, Serialize};

use crate::error::{ChunkError, Result};
use crate::{
    DEFAULT_HIGH_WATERMARK, DEFAULT_KEYWORD_MODEL, DEFAULT_LOW_WATERMARK, DEFAULT_MAX_LEN,
};

/// Size limits for a single chunking call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    /// Maximum characters per split piece
    pub max_len: usize,

    /// A running chunk at or above this many characters stops absorbing pieces
    pub low_watermark: usize,

    /// Hard ceiling on chunk length in characters
    pub high_watermark: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_LEN,
            low_watermark: DEFAULT_LOW_WATERMARK,
            high_watermark: DEFAULT_HIGH_WATERMARK,
        }
    }
}

impl ChunkConfig {
    /// Create a config with the given watermarks and a matching piece size.
    pub fn with_watermarks(low_watermark: usize, high_watermark: usize) -> Self {
        Self {
            max_len: high_watermark,
            low_watermark,
            high_watermark,
        }
    }

    /// Set the maximum piece size.
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Reject values that cannot produce chunks inside the ceiling.
    pub fn validate(&self) -> Result<()> {
        validate_max_len(self.max_len)?;
        validate_watermarks(self.low_watermark, self.high_watermark)?;
        if self.max_len > self.high_watermark {
            return Err(ChunkError::InvalidConfiguration(format!(
                "max_len ({}) exceeds high watermark ({})",
                self.max_len, self.high_watermark
            )));
        }
        Ok(())
    }
}

pub(crate) fn validate_max_len(max_len: usize) -> Result<()> {
    if max_len == 0 {
        return Err(ChunkError::InvalidConfiguration(
            "max_len must be positive".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_watermarks(low: usize, high: usize) -> Result<()> {
    if low == 0 || high == 0 {
        return Err(ChunkError::InvalidConfiguration(
            "watermarks must be positive".to_string(),
        ));
    }
    if low >= high {
        return Err(ChunkError::InvalidConfiguration(format!(
            "low watermark ({low}) must be below high watermark ({high})"
        )));
    }
    Ok(())
}

/// How chunk output is shaped for the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Game name -> ordered chunks
    #[default]
    Keyed,
    /// Flat list of `"<game>: <chunk>"` documents
    Prefixed,
}

/// Service configuration, read from defaults and `REVIEW_CHUNKER_*` variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub max_len: usize,
    pub low_watermark: usize,
    pub high_watermark: usize,

    /// Port the HTTP server binds to
    pub port: u16,

    /// URL of the embedding service
    #[serde(default)]
    pub embedding_service_url: Option<String>,

    /// Chunks per request to the embedding service
    pub embedding_batch_size: usize,

    /// Largest chunk the embedding service accepts, in characters
    pub embedding_max_input_chars: usize,

    /// Base URL of the chat-completion service used for keywords
    #[serde(default)]
    pub llm_api_url: Option<String>,

    /// Bearer token for the chat-completion service
    #[serde(default)]
    pub llm_api_key: Option<String>,

    /// Chat model asked for keywords
    pub llm_model: String,

    /// Largest chunk the chat model accepts, in characters
    pub llm_max_input_chars: usize,

    /// Retries after the first failed request to an external service
    pub max_retries: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_LEN,
            low_watermark: DEFAULT_LOW_WATERMARK,
            high_watermark: DEFAULT_HIGH_WATERMARK,
            port: 3017,
            embedding_service_url: None,
            embedding_batch_size: 50,
            embedding_max_input_chars: DEFAULT_HIGH_WATERMARK,
            llm_api_url: None,
            llm_api_key: None,
            llm_model: DEFAULT_KEYWORD_MODEL.to_string(),
            llm_max_input_chars: DEFAULT_HIGH_WATERMARK,
            max_retries: 3,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let settings = config::Config::builder()
            .set_default("max_len", defaults.max_len as i64)?
            .set_default("low_watermark", defaults.low_watermark as i64)?
            .set_default("high_watermark", defaults.high_watermark as i64)?
            .set_default("port", defaults.port as i64)?
            .set_default("embedding_batch_size", defaults.embedding_batch_size as i64)?
            .set_default(
                "embedding_max_input_chars",
                defaults.embedding_max_input_chars as i64,
            )?
            .set_default("llm_model", defaults.llm_model.clone())?
            .set_default("llm_max_input_chars", defaults.llm_max_input_chars as i64)?
            .set_default("max_retries", defaults.max_retries as i64)?
            .add_source(config::Environment::with_prefix("REVIEW_CHUNKER"))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.chunk_config().validate()?;
        Ok(config)
    }

    /// The chunk limits this service applies by default.
    pub fn chunk_config(&self) -> ChunkConfig {
        ChunkConfig {
            max_len: self.max_len,
            low_watermark: self.low_watermark,
            high_watermark: self.high_watermark,
        }
    }
}
