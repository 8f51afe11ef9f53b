//! Plain-text and JSON chunk files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::types::ChunkSetIndex;

/// Write one document per line.
pub fn write_documents<P: AsRef<Path>>(path: P, documents: &[String]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for document in documents {
        writeln!(writer, "{document}")?;
    }
    writer.flush()?;

    info!(path = %path.display(), documents = documents.len(), "Wrote chunk documents");
    Ok(())
}

/// Write chunk sets as pretty-printed JSON keyed by game.
pub fn write_chunk_sets<P: AsRef<Path>>(path: P, chunk_sets: &ChunkSetIndex) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), chunk_sets)?;

    info!(path = %path.display(), games = chunk_sets.len(), "Wrote chunk sets");
    Ok(())
}
