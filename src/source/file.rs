//! File-backed review sources.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use tracing::info;

use super::ReviewSource;
use crate::types::GameReviewIndex;

lazy_static::lazy_static! {
    static ref REVIEW_END: Regex =
        Regex::new(r"\r?\n__review_end__(?:\r?\n|$)").expect("review delimiter pattern");
}

/// Reads `{"game": ["review", ...]}` from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ReviewSource for JsonFileSource {
    fn name(&self) -> &'static str {
        "json_file"
    }

    async fn load(&self) -> Result<GameReviewIndex> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))?;
        let index: GameReviewIndex = serde_json::from_str(&raw)
            .with_context(|| format!("parsing review index {}", self.path.display()))?;

        info!(path = %self.path.display(), games = index.len(), "Loaded review index");
        Ok(index)
    }
}

/// Reads a plain-text dump where each review is followed by a
/// `__review_end__` line, attributing every review to one game.
#[derive(Debug, Clone)]
pub struct TextDumpSource {
    path: PathBuf,
    game: String,
}

impl TextDumpSource {
    pub fn new(path: impl Into<PathBuf>, game: &str) -> Self {
        Self {
            path: path.into(),
            game: game.to_string(),
        }
    }
}

#[async_trait]
impl ReviewSource for TextDumpSource {
    fn name(&self) -> &'static str {
        "text_dump"
    }

    async fn load(&self) -> Result<GameReviewIndex> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))?;
        let reviews = parse_review_dump(&raw);

        info!(path = %self.path.display(), game = %self.game, reviews = reviews.len(), "Loaded review dump");
        Ok(GameReviewIndex::from([(self.game.clone(), reviews)]))
    }
}

/// Split a review dump on its `__review_end__` delimiter lines.
///
/// Review text is kept verbatim, including inner newlines. Blank entries
/// (such as the one after the final delimiter) are dropped.
pub fn parse_review_dump(raw: &str) -> Vec<String> {
    REVIEW_END
        .split(raw)
        .filter(|review| !review.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_review_dump() {
        let raw = "got my friends terraria 4-pack\n\nnever played with any of them\n__review_end__\nyou can fish\n__review_end__\n";
        assert_eq!(
            parse_review_dump(raw),
            vec![
                "got my friends terraria 4-pack\n\nnever played with any of them".to_string(),
                "you can fish".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_review_dump_crlf_and_missing_tail() {
        let raw = "first\r\n__review_end__\r\nsecond\n__review_end__";
        assert_eq!(parse_review_dump(raw), vec!["first".to_string(), "second".to_string()]);
    }

    #[tokio::test]
    async fn test_json_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.json");
        std::fs::write(&path, r#"{"Terraria": ["you can fish", "10/10"], "Portal": []}"#).unwrap();

        let index = JsonFileSource::new(&path).load().await.unwrap();
        assert_eq!(index["Terraria"], vec!["you can fish".to_string(), "10/10".to_string()]);
        assert!(index["Portal"].is_empty());
    }

    #[tokio::test]
    async fn test_json_file_source_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(JsonFileSource::new(&path).load().await.is_err());
    }

    #[tokio::test]
    async fn test_text_dump_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.txt");
        std::fs::write(&path, "a\n__review_end__\nb\n__review_end__\n").unwrap();

        let index = TextDumpSource::new(&path, "Half-Life").load().await.unwrap();
        assert_eq!(index["Half-Life"], vec!["a".to_string(), "b".to_string()]);
    }
}
