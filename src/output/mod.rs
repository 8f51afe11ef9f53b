//! Output module for writing chunks and sending them downstream.

mod document_writer;
mod embedding_client;
mod keyword_client;
mod retry;

pub use document_writer::{write_chunk_sets, write_documents};
pub use embedding_client::EmbeddingClient;
pub use keyword_client::{parse_keywords, KeywordClient};
pub use retry::RetryPolicy;
