//! Steam store review source.

use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::ReviewSource;
use crate::output::RetryPolicy;
use crate::types::GameReviewIndex;

/// Most reviews the endpoint returns per page.
pub const STEAM_PAGE_SIZE: usize = 100;

const STEAM_BASE_URL: &str = "https://store.steampowered.com";
const USER_AGENT: &str = "Mozilla/5.0";

/// One page of the `appreviews` endpoint.
#[derive(Debug, Deserialize)]
struct ReviewPage {
    #[serde(default)]
    success: i32,
    #[serde(default)]
    cursor: String,
    #[serde(default)]
    reviews: Vec<SteamReview>,
}

#[derive(Debug, Deserialize)]
struct SteamReview {
    review: String,
}

/// Fetches recent English reviews for a list of Steam apps.
pub struct SteamReviewSource {
    client: Client,
    base_url: String,
    /// (game name, app id)
    games: Vec<(String, String)>,
    limit: usize,
    retry: RetryPolicy,
}

impl SteamReviewSource {
    /// Create a source fetching up to `limit` reviews per game.
    pub fn new(games: Vec<(String, String)>, limit: usize) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(30))
                .build()?,
            base_url: STEAM_BASE_URL.to_string(),
            games,
            limit,
            retry: RetryPolicy::default(),
        })
    }

    /// Point the source at a different host.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Set the retry policy for failed page requests.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch up to `limit` reviews for one app, following the cursor.
    pub async fn fetch_reviews(&self, app_id: &str, limit: usize) -> Result<Vec<String>> {
        let mut reviews = Vec::new();
        let mut cursor = "*".to_string();
        let mut remaining = limit;

        while remaining > 0 {
            let per_page = remaining.min(STEAM_PAGE_SIZE);
            let page = self
                .retry
                .run("fetch steam reviews", || self.fetch_page(app_id, &cursor, per_page))
                .await?;

            let fetched = page.reviews.len();
            debug!(app_id, fetched, cursor = %page.cursor, "Fetched review page");
            reviews.extend(page.reviews.into_iter().map(|r| r.review));
            remaining = remaining.saturating_sub(per_page);

            if fetched < STEAM_PAGE_SIZE || page.cursor.is_empty() || page.cursor == cursor {
                break;
            }
            cursor = page.cursor;
        }

        reviews.truncate(limit);
        Ok(reviews)
    }

    async fn fetch_page(&self, app_id: &str, cursor: &str, per_page: usize) -> Result<ReviewPage> {
        let url = format!("{}/appreviews/{}", self.base_url, app_id);
        let per_page = per_page.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("json", "1"),
                ("filter", "all"),
                ("language", "english"),
                ("day_range", "365"),
                ("review_type", "all"),
                ("purchase_type", "all"),
                ("cursor", cursor),
                ("num_per_page", per_page.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Steam returned {} for app {}", response.status(), app_id);
        }
        let page: ReviewPage = response.json().await?;
        if page.success != 1 {
            bail!("Steam reported failure for app {}", app_id);
        }
        Ok(page)
    }
}

#[async_trait]
impl ReviewSource for SteamReviewSource {
    fn name(&self) -> &'static str {
        "steam"
    }

    async fn load(&self) -> Result<GameReviewIndex> {
        let mut index = GameReviewIndex::new();
        for (game, app_id) in &self.games {
            let reviews = self.fetch_reviews(app_id, self.limit).await?;
            info!(game = %game, app_id = %app_id, reviews = reviews.len(), "Fetched Steam reviews");
            index.insert(game.clone(), reviews);
        }
        Ok(index)
    }
}
