//! Index-level chunking across all games.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::base::Chunker;
use super::split::{aggregate, split_oversized};
use super::{FixedSizeChunker, WatermarkChunker};
use crate::error::Result;
use crate::types::{ChunkConfig, ChunkSetIndex, GameReviewIndex, ReviewChunk};
use crate::PREFIX_SEPARATOR;

/// Chunk every game in `index`, keyed by game name.
///
/// The configuration is checked once up front, so an invalid configuration
/// fails before any game is touched. Games with no reviews map to an empty
/// chunk list.
pub fn chunk_reviews(index: &GameReviewIndex, config: &ChunkConfig) -> Result<ChunkSetIndex> {
    config.validate()?;

    let mut chunk_sets = ChunkSetIndex::new();
    for (game, reviews) in index {
        let pieces = split_oversized(reviews, config.max_len)?;
        let chunks = aggregate(pieces, config.low_watermark, config.high_watermark)?;
        chunk_sets.insert(game.clone(), chunks);
    }
    Ok(chunk_sets)
}

/// Flatten chunk sets into `"<game>: <chunk>"` documents for a flat
/// document store.
pub fn prefixed_documents(chunk_sets: &ChunkSetIndex) -> Vec<String> {
    chunk_sets
        .iter()
        .flat_map(|(game, chunks)| {
            chunks
                .iter()
                .map(move |chunk| format!("{game}{PREFIX_SEPARATOR}{chunk}"))
        })
        .collect()
}

/// Applies a [`Chunker`] strategy to a whole review index.
#[derive(Clone)]
pub struct ReviewChunker {
    chunker: Arc<dyn Chunker>,
    config: ChunkConfig,
}

impl ReviewChunker {
    /// Create a review chunker using the watermark strategy.
    pub fn new(config: ChunkConfig) -> Self {
        Self::with_chunker(Arc::new(WatermarkChunker::new()), config)
    }

    /// Create a review chunker with a specific strategy.
    pub fn with_chunker(chunker: Arc<dyn Chunker>, config: ChunkConfig) -> Self {
        Self { chunker, config }
    }

    /// Get a chunker by name.
    pub fn chunker_by_name(name: &str) -> Option<Arc<dyn Chunker>> {
        match name.to_lowercase().as_str() {
            "watermark" | "default" => Some(Arc::new(WatermarkChunker::new()) as Arc<dyn Chunker>),
            "fixed" | "split" => Some(Arc::new(FixedSizeChunker::new()) as Arc<dyn Chunker>),
            _ => None,
        }
    }

    /// List all available chunkers.
    pub fn list_chunkers() -> Vec<(&'static str, &'static str)> {
        let watermark = WatermarkChunker::new();
        let fixed = FixedSizeChunker::new();
        vec![
            (watermark.name(), watermark.description()),
            (fixed.name(), fixed.description()),
        ]
    }

    /// The active configuration.
    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Name of the active strategy.
    pub fn strategy(&self) -> &'static str {
        self.chunker.name()
    }

    /// Chunk every game, keeping chunks grouped by game.
    pub fn chunk_sets(&self, index: &GameReviewIndex) -> Result<BTreeMap<String, Vec<ReviewChunk>>> {
        self.config.validate()?;

        let mut sets = BTreeMap::new();
        let mut total = 0;
        for (game, reviews) in index {
            let chunks = self.chunker.chunk(game, reviews, &self.config)?;
            debug!(game = %game, reviews = reviews.len(), chunks = chunks.len(), "Chunked game");
            total += chunks.len();
            sets.insert(game.clone(), chunks);
        }

        info!(
            strategy = self.chunker.name(),
            games = index.len(),
            chunks = total,
            "Chunked review index"
        );
        Ok(sets)
    }

    /// Chunk every game into one flat list, in game then chunk order.
    pub fn chunk_index(&self, index: &GameReviewIndex) -> Result<Vec<ReviewChunk>> {
        Ok(self.chunk_sets(index)?.into_values().flatten().collect())
    }
}

impl Default for ReviewChunker {
    fn default() -> Self {
        Self::new(ChunkConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChunkError;
    use pretty_assertions::assert_eq;

    fn index(entries: &[(&str, Vec<String>)]) -> GameReviewIndex {
        entries
            .iter()
            .map(|(game, reviews)| (game.to_string(), reviews.clone()))
            .collect()
    }

    #[test]
    fn test_chunk_reviews_per_game() {
        let index = index(&[
            ("Terraria", vec!["you can fish".into(), "10/10".into()]),
            ("Half-Life 2", vec!["h".repeat(4500)]),
            ("Empty", vec![]),
        ]);

        let sets = chunk_reviews(&index, &ChunkConfig::default()).unwrap();
        assert_eq!(sets["Terraria"], vec!["you can fish10/10".to_string()]);
        assert_eq!(sets["Half-Life 2"].len(), 3);
        assert!(sets["Empty"].is_empty());
    }

    #[test]
    fn test_invalid_config_produces_nothing() {
        let index = index(&[("Terraria", vec!["fun".into()])]);
        let config = ChunkConfig::with_watermarks(2000, 1500);
        assert!(matches!(
            chunk_reviews(&index, &config),
            Err(ChunkError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_prefixed_documents() {
        let index = index(&[
            ("Portal", vec!["short".into()]),
            ("Celeste", vec!["hard".into(), "fair".into()]),
        ]);
        let sets = chunk_reviews(&index, &ChunkConfig::default()).unwrap();
        let docs = prefixed_documents(&sets);
        assert_eq!(docs, vec!["Celeste: hardfair".to_string(), "Portal: short".to_string()]);
    }

    #[test]
    fn test_prefix_mode_accounts_for_prefix_only() {
        let reviews: Vec<String> = vec!["r".repeat(50); 40];
        let index = index(&[("Stardew Valley", reviews.clone())]);
        let sets = chunk_reviews(&index, &ChunkConfig::default()).unwrap();
        let docs = prefixed_documents(&sets);

        let prefix = "Stardew Valley: ";
        let stripped: String = docs
            .iter()
            .map(|d| d.strip_prefix(prefix).unwrap())
            .collect();
        assert_eq!(stripped, reviews.concat());
    }

    #[test]
    fn test_review_chunker_matches_free_function() {
        let index = index(&[("Hades", vec!["a".repeat(1200), "b".repeat(900), "c".repeat(30)])]);
        let chunker = ReviewChunker::default();
        let chunks = chunker.chunk_index(&index).unwrap();
        let expected = chunk_reviews(&index, chunker.config()).unwrap();

        let contents: Vec<String> = chunks.into_iter().map(|c| c.content).collect();
        assert_eq!(contents, expected["Hades"]);
    }

    #[test]
    fn test_fixed_strategy_by_name() {
        let chunker = ReviewChunker::chunker_by_name("fixed").unwrap();
        let review_chunker = ReviewChunker::with_chunker(chunker, ChunkConfig::default());
        let index = index(&[("Hades", vec!["a".into(), "b".into()])]);
        assert_eq!(review_chunker.chunk_index(&index).unwrap().len(), 2);
        assert_eq!(review_chunker.strategy(), "fixed");
        assert!(ReviewChunker::chunker_by_name("semantic").is_none());
    }
}
