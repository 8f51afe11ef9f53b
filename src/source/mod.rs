//! Review sources that produce a [`GameReviewIndex`].
//!
//! Sources sit at the I/O boundary: they read files or call the Steam
//! store, and report failures with `anyhow`. The chunker only ever sees
//! the in-memory index they return.

mod file;
mod steam;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::GameReviewIndex;

pub use file::{parse_review_dump, JsonFileSource, TextDumpSource};
pub use steam::{SteamReviewSource, STEAM_PAGE_SIZE};

/// Every review source implements this trait.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Load reviews for every game this source knows about.
    async fn load(&self) -> Result<GameReviewIndex>;
}
