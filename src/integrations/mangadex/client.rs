// src/integrations/mangadex/client.rs
//
// Catalog Integration (MangaDex)
//
// ARCHITECTURE:
// - REST client for chapter feeds and cover metadata
// - Async rate limiting: requests are spaced by a minimum interval
// - Maps external data → domain chapters (unlinked; the sequence links them)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use parking_lot::Mutex;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use tokio::time::Instant;

#[cfg(test)]
use mockall::automock;

use super::wire::{ChapterFeedResponse, CoverListResponse};
use crate::domain::Chapter;
use crate::error::{AppError, AppResult};

pub const DEFAULT_API_URL: &str = "https://api.mangadex.org";

/// Chapters per feed request
const FEED_LIMIT: u32 = 100;

/// External manga catalog
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Chapters of a manga in reading order, possibly unlinked
    async fn fetch_chapters(&self, manga_id: &str) -> AppResult<Vec<Chapter>>;

    /// File name of the manga's first cover; `None` when it has none
    async fn fetch_cover_file_name(&self, manga_id: &str) -> AppResult<Option<String>>;
}

/// Rate limiter state
///
/// Reserves the next free slot under the lock, then sleeps outside of it.
struct RateLimiter {
    next_slot: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            next_slot: Instant::now(),
            min_interval,
        }
    }

    fn reserve(&mut self) -> Instant {
        let slot = self.next_slot.max(Instant::now());
        self.next_slot = slot + self.min_interval;
        slot
    }
}

/// MangaDex API client
pub struct MangaDexClient {
    base_url: String,
    http_client: Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl MangaDexClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        min_request_interval: Duration,
    ) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mangashelf/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(min_request_interval))),
        })
    }

    fn feed_url(&self, manga_id: &str) -> String {
        format!(
            "{}/manga/{}/feed?translatedLanguage[]=en&order[chapter]=asc&limit={}",
            self.base_url,
            urlencoding::encode(manga_id),
            FEED_LIMIT
        )
    }

    fn cover_url(&self, manga_id: &str) -> String {
        format!(
            "{}/cover?manga[]={}&limit=1&order[volume]=asc",
            self.base_url,
            urlencoding::encode(manga_id)
        )
    }

    async fn wait_turn(&self) {
        let slot = self.rate_limiter.lock().reserve();
        tokio::time::sleep_until(slot).await;
    }

    // ========================================================================
    // INTERNAL: Request Execution
    // ========================================================================

    async fn get_json<T>(&self, url: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        self.wait_turn().await;
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Catalog request failed: {}", e)))?;

        // Error envelopes arrive with non-2xx statuses too; let the tagged
        // body speak for itself when it parses.
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Transport(format!("Failed to read catalog response: {}", e)))?;

        serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                AppError::Transport(format!("Failed to parse catalog response: {}", e))
            } else {
                AppError::Transport(format!("Catalog returned status: {}", status))
            }
        })
    }
}

#[async_trait]
impl CatalogClient for MangaDexClient {
    async fn fetch_chapters(&self, manga_id: &str) -> AppResult<Vec<Chapter>> {
        let feed: ChapterFeedResponse = self.get_json(&self.feed_url(manga_id)).await?;
        let chapters = feed.into_chapters()?;
        debug!("Catalog returned {} chapters for {}", chapters.len(), manga_id);
        Ok(chapters)
    }

    async fn fetch_cover_file_name(&self, manga_id: &str) -> AppResult<Option<String>> {
        let covers: CoverListResponse = self.get_json(&self.cover_url(manga_id)).await?;
        covers.into_first_file_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> MangaDexClient {
        MangaDexClient::new(DEFAULT_API_URL, Duration::from_secs(5), Duration::from_millis(250))
            .unwrap()
    }

    #[test]
    fn test_request_urls() {
        let client = client();
        assert_eq!(
            client.cover_url("abc-123"),
            "https://api.mangadex.org/cover?manga[]=abc-123&limit=1&order[volume]=asc"
        );
        assert!(client
            .feed_url("abc-123")
            .starts_with("https://api.mangadex.org/manga/abc-123/feed?"));
    }

    #[tokio::test]
    async fn test_rate_limiter_spaces_requests() {
        let mut limiter = RateLimiter::new(Duration::from_millis(250));
        let first = limiter.reserve();
        let second = limiter.reserve();
        let third = limiter.reserve();

        assert_eq!(second - first, Duration::from_millis(250));
        assert_eq!(third - second, Duration::from_millis(250));
    }
}
