// src/integrations/library_api/client.rs
//
// Library API Integration
//
// ARCHITECTURE:
// - REST client for the library backend
// - Bearer authentication from the injected session token
// - Maps wire shapes → domain values (NO store mutation)
// - Used by LibraryStore through the LibraryRemote trait
//
// CRITICAL RULES:
// - This is INFRASTRUCTURE, not DOMAIN
// - Non-success acknowledgements are errors, exactly like transport failures
// - Unknown response shapes are errors, never guessed at

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};

#[cfg(test)]
use mockall::automock;

use super::wire::{
    parse_ack, parse_library, parse_stats, AddEntryRequest, NotesUpdate, ProgressUpdate,
    RatingUpdate, StatusUpdate,
};
use crate::domain::{LibraryDraft, LibraryEntry, ReadingStatus, RemoteStats};
use crate::error::{AppError, AppResult};

/// Remote side of the library
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LibraryRemote: Send + Sync {
    async fn fetch_library(&self) -> AppResult<Vec<LibraryEntry>>;

    async fn fetch_stats(&self) -> AppResult<RemoteStats>;

    async fn toggle_favorite(&self, entry_id: &str) -> AppResult<()>;

    async fn update_status(&self, entry_id: &str, status: ReadingStatus) -> AppResult<()>;

    /// `None` clears the rating
    async fn update_rating(&self, entry_id: &str, rating: Option<u8>) -> AppResult<()>;

    async fn update_notes(&self, entry_id: &str, notes: &str) -> AppResult<()>;

    async fn update_progress(
        &self,
        entry_id: &str,
        chapter: u32,
        volume: Option<u32>,
    ) -> AppResult<()>;

    async fn add_entry(&self, draft: &LibraryDraft) -> AppResult<()>;

    async fn remove_entry(&self, entry_id: &str) -> AppResult<()>;
}

/// Library API client
pub struct LibraryApiClient {
    base_url: String,
    http_client: Client,
    auth_token: Option<String>,
}

impl LibraryApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mangashelf/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
            auth_token: None,
        })
    }

    /// Create client with authentication token
    pub fn with_auth(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn library_url(&self) -> String {
        format!("{}/api/library", self.base_url)
    }

    fn entry_url(&self, entry_id: &str, action: Option<&str>) -> String {
        let id = urlencoding::encode(entry_id);
        match action {
            Some(action) => format!("{}/api/library/{}/{}", self.base_url, id, action),
            None => format!("{}/api/library/{}", self.base_url, id),
        }
    }

    // ========================================================================
    // INTERNAL: Request Execution
    // ========================================================================

    /// Send a request and return its JSON body (`Value::Null` when empty)
    async fn execute(&self, request: RequestBuilder) -> AppResult<Value> {
        let mut request = request.header(header::ACCEPT, "application/json");

        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Library API request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppError::NotAuthenticated);
        }
        if !status.is_success() {
            return Err(AppError::Transport(format!(
                "Library API returned status: {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Transport(format!("Failed to read Library API response: {}", e)))?;

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body)
            .map_err(|e| AppError::Transport(format!("Failed to parse Library API response: {}", e)))
    }
}

#[async_trait]
impl LibraryRemote for LibraryApiClient {
    async fn fetch_library(&self) -> AppResult<Vec<LibraryEntry>> {
        let body = self.execute(self.http_client.get(self.library_url())).await?;
        let entries = parse_library(body)?;
        debug!("Fetched {} library entries", entries.len());
        Ok(entries)
    }

    async fn fetch_stats(&self) -> AppResult<RemoteStats> {
        let url = format!("{}/stats", self.library_url());
        let body = self.execute(self.http_client.get(url)).await?;
        parse_stats(body)
    }

    async fn toggle_favorite(&self, entry_id: &str) -> AppResult<()> {
        let request = self
            .http_client
            .put(self.entry_url(entry_id, Some("favorite")))
            .json(&json!({}));
        parse_ack(self.execute(request).await?)
    }

    async fn update_status(&self, entry_id: &str, status: ReadingStatus) -> AppResult<()> {
        let request = self
            .http_client
            .put(self.entry_url(entry_id, Some("status")))
            .json(&StatusUpdate { status });
        parse_ack(self.execute(request).await?)
    }

    async fn update_rating(&self, entry_id: &str, rating: Option<u8>) -> AppResult<()> {
        let request = self
            .http_client
            .put(self.entry_url(entry_id, Some("rating")))
            .json(&RatingUpdate { rating });
        parse_ack(self.execute(request).await?)
    }

    async fn update_notes(&self, entry_id: &str, notes: &str) -> AppResult<()> {
        let request = self
            .http_client
            .put(self.entry_url(entry_id, Some("notes")))
            .json(&NotesUpdate { notes });
        parse_ack(self.execute(request).await?)
    }

    async fn update_progress(
        &self,
        entry_id: &str,
        chapter: u32,
        volume: Option<u32>,
    ) -> AppResult<()> {
        let request = self
            .http_client
            .put(self.entry_url(entry_id, Some("progress")))
            .json(&ProgressUpdate::new(chapter, volume));
        parse_ack(self.execute(request).await?)
    }

    async fn add_entry(&self, draft: &LibraryDraft) -> AppResult<()> {
        let request = self
            .http_client
            .post(self.library_url())
            .json(&AddEntryRequest::from_draft(draft));
        parse_ack(self.execute(request).await?)
    }

    async fn remove_entry(&self, entry_id: &str) -> AppResult<()> {
        let request = self.http_client.delete(self.entry_url(entry_id, None));
        parse_ack(self.execute(request).await?)
    }
}
