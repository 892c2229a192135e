//! Content fetching: download a recipe page and reduce it to plain text.
//!
//! Markup removal is a blunt strip: every `<...>` span becomes a single
//! space and whitespace runs collapse to one space. Scripts and styles are
//! not treated specially. The model does the real reading, and it copes
//! with the leftover noise.

use crate::error::RecipeError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

/// Source of plain page text for URL imports.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its text content with markup removed.
    async fn fetch_text(&self, url: &str) -> Result<String, RecipeError>;
}

/// [`PageFetcher`] backed by a `reqwest` client.
///
/// One GET per call, no retry, transport-default timeouts.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher that identifies itself with `user_agent`.
    pub fn new(user_agent: &str) -> Result<Self, RecipeError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| RecipeError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, RecipeError> {
        info!("Fetching recipe page: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RecipeError::FetchFailed {
                url: url.to_string(),
                status: None,
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecipeError::FetchFailed {
                url: url.to_string(),
                status: Some(status.as_u16()),
                reason: format!(
                    "{} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                )
                .trim_end()
                .to_string(),
            });
        }

        let html = response.text().await.map_err(|e| RecipeError::FetchFailed {
            url: url.to_string(),
            status: Some(status.as_u16()),
            reason: e.to_string(),
        })?;

        let text = strip_markup(&html);
        debug!("Fetched {} bytes of markup → {} chars of text", html.len(), text.chars().count());
        Ok(text)
    }
}

static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Replace markup tags with spaces and collapse whitespace.
pub fn strip_markup(html: &str) -> String {
    let no_tags = RE_TAG.replace_all(html, " ");
    RE_WHITESPACE.replace_all(&no_tags, " ").trim().to_string()
}
