//! HTTP client that asks a chat-completion service for chunk keywords.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::retry::RetryPolicy;
use crate::types::{ReviewChunk, ServiceConfig};
use crate::{DEFAULT_HIGH_WATERMARK, DEFAULT_KEYWORD_MODEL};

/// Client for extracting keywords from review chunks, one chunk per request.
pub struct KeywordClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    system_prompt: Option<String>,
    max_input_chars: usize,
    retry: RetryPolicy,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: String,
}

/// Turn a comma-separated model reply into a keyword set.
///
/// Periods are dropped, keywords are lowercased and trimmed, and blanks and
/// duplicates disappear.
pub fn parse_keywords(reply: &str) -> BTreeSet<String> {
    reply
        .replace('.', "")
        .to_lowercase()
        .split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
        .collect()
}

impl KeywordClient {
    /// Create a new keyword client.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(60)).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: DEFAULT_KEYWORD_MODEL.to_string(),
            system_prompt: None,
            max_input_chars: DEFAULT_HIGH_WATERMARK,
            retry: RetryPolicy::default(),
        })
    }

    /// Create a client from service configuration, if both an LLM URL and key are set.
    pub fn from_config(config: &ServiceConfig) -> Result<Option<Self>> {
        let (Some(url), Some(key)) = (config.llm_api_url.as_deref(), config.llm_api_key.as_deref())
        else {
            return Ok(None);
        };
        Ok(Some(
            Self::new(url, key)?
                .with_model(&config.llm_model)
                .with_max_input_chars(config.llm_max_input_chars)
                .with_retry(RetryPolicy::from(config)),
        ))
    }

    /// Set the chat model.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Set the system message sent ahead of every chunk.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set the largest chunk the model accepts.
    pub fn with_max_input_chars(mut self, max: usize) -> Self {
        self.max_input_chars = max;
        self
    }

    /// Set the retry policy for failed requests.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Largest chunk the model accepts, in characters.
    pub fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }

    /// Keywords for one chunk of review text.
    pub async fn keywords(&self, content: &str) -> Result<BTreeSet<String>> {
        let len = content.chars().count();
        if len > self.max_input_chars {
            bail!(
                "chunk has {} characters, model limit is {}",
                len,
                self.max_input_chars
            );
        }
        let reply = self.retry.run("keyword request", || self.complete(content)).await?;
        Ok(parse_keywords(&reply))
    }

    /// Keywords for every chunk, merged per game.
    ///
    /// Every chunk is checked against the input limit before anything is
    /// sent. Chunks that still fail after retrying are logged and skipped.
    pub async fn keywords_by_game(
        &self,
        chunks: &[ReviewChunk],
    ) -> Result<BTreeMap<String, BTreeSet<String>>> {
        if let Some(oversized) = chunks.iter().find(|c| c.char_count > self.max_input_chars) {
            bail!(
                "chunk {} of {} has {} characters, model limit is {}",
                oversized.chunk_index,
                oversized.game,
                oversized.char_count,
                self.max_input_chars
            );
        }

        info!(chunk_count = chunks.len(), model = %self.model, "Requesting keywords");

        let mut by_game: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for chunk in chunks {
            let keywords = by_game.entry(chunk.game.clone()).or_default();
            match self.keywords(&chunk.content).await {
                Ok(found) => {
                    debug!(game = %chunk.game, chunk_index = chunk.chunk_index, keywords = found.len(), "Got keywords");
                    keywords.extend(found);
                }
                Err(e) => {
                    error!(game = %chunk.game, chunk_index = chunk.chunk_index, error = %e, "Keyword request failed");
                }
            }
        }
        Ok(by_game)
    }

    async fn complete(&self, content: &str) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(prompt) = &self.system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: prompt,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content,
        });

        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: 0.0,
        };

        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            bail!("Chat service returned {}: {}", status, text);
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .context("chat response has no choices")
    }
}
