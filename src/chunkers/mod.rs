//! Chunking strategies for review text.

mod base;
mod fixed_chunker;
mod review_chunker;
mod split;
mod watermark_chunker;

pub use base::{count_tokens, estimate_tokens, Chunker, TiktokenCounter};
pub use fixed_chunker::FixedSizeChunker;
pub use review_chunker::{chunk_reviews, prefixed_documents, ReviewChunker};
pub use split::{aggregate, split_oversized};
pub use watermark_chunker::WatermarkChunker;
