//! Chunk a review file into a chunk file.
//!
//! Reads `reviews.json` (game -> reviews) by default, a `__review_end__`
//! text dump when `--dump-game` names the game it belongs to, or the Steam
//! store when one or more `--steam-app NAME=APPID` are given.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use review_chunker::output::{write_chunk_sets, write_documents};
use review_chunker::source::{JsonFileSource, ReviewSource, SteamReviewSource, TextDumpSource};
use review_chunker::{chunk_reviews, prefixed_documents, ChunkConfig};
use review_chunker::{DEFAULT_HIGH_WATERMARK, DEFAULT_LOW_WATERMARK, DEFAULT_MAX_LEN};

#[derive(Debug, Parser)]
#[command(name = "chunk-reviews", version, about = "Chunk game reviews for embedding")]
struct Args {
    /// Review file to read
    #[arg(short, long, default_value = "reviews.json")]
    input: PathBuf,

    /// Chunk file to write
    #[arg(short, long, default_value = "chunks.txt")]
    output: PathBuf,

    /// Treat the input as a plain-text review dump for this game
    #[arg(long, conflicts_with = "steam_app")]
    dump_game: Option<String>,

    /// Fetch reviews from Steam instead, as `NAME=APPID` (repeatable)
    #[arg(long, value_parser = parse_steam_app)]
    steam_app: Vec<(String, String)>,

    /// Reviews to fetch per Steam game
    #[arg(long, default_value_t = 100)]
    steam_limit: usize,

    /// Maximum characters per split piece
    #[arg(long, default_value_t = DEFAULT_MAX_LEN)]
    max_len: usize,

    /// Low watermark in characters
    #[arg(long, default_value_t = DEFAULT_LOW_WATERMARK)]
    low: usize,

    /// High watermark in characters
    #[arg(long, default_value_t = DEFAULT_HIGH_WATERMARK)]
    high: usize,

    /// Write chunks as JSON keyed by game instead of prefixed lines
    #[arg(long)]
    keyed: bool,
}

fn parse_steam_app(value: &str) -> std::result::Result<(String, String), String> {
    let (name, app_id) = value
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=APPID, got `{value}`"))?;
    let (name, app_id) = (name.trim(), app_id.trim());
    if name.is_empty() || app_id.is_empty() || !app_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("expected NAME=APPID, got `{value}`"));
    }
    Ok((name.to_string(), app_id.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "review_chunker=info,chunk_reviews=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = ChunkConfig {
        max_len: args.max_len,
        low_watermark: args.low,
        high_watermark: args.high,
    };
    config.validate()?;

    let source: Box<dyn ReviewSource> = if !args.steam_app.is_empty() {
        Box::new(
            SteamReviewSource::new(args.steam_app.clone(), args.steam_limit)
                .context("failed to build Steam client")?,
        )
    } else if let Some(game) = &args.dump_game {
        Box::new(TextDumpSource::new(&args.input, game))
    } else {
        Box::new(JsonFileSource::new(&args.input))
    };
    let index = source.load().await?;

    let chunk_sets = chunk_reviews(&index, &config)?;
    let total: usize = chunk_sets.values().map(Vec::len).sum();
    info!(source = source.name(), games = chunk_sets.len(), chunks = total, "Chunked reviews");

    if args.keyed {
        write_chunk_sets(&args.output, &chunk_sets)?;
    } else {
        write_documents(&args.output, &prefixed_documents(&chunk_sets))?;
    }

    Ok(())
}
