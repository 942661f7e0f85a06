// src/integrations/mangadex/wire.rs
//
// MangaDex response envelopes. Every response carries a `result` tag of
// "ok" or "error".

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::Chapter;
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

fn describe(errors: &[ApiError]) -> String {
    errors
        .iter()
        .map(|e| {
            let title = e.title.as_deref().unwrap_or("error");
            match (&e.status, &e.detail) {
                (Some(status), Some(detail)) => format!("{} {}: {}", status, title, detail),
                (Some(status), None) => format!("{} {}", status, title),
                (None, Some(detail)) => format!("{}: {}", title, detail),
                (None, None) => title.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// CHAPTER FEED
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum ChapterFeedResponse {
    Ok { data: Vec<ChapterData> },
    Error { errors: Vec<ApiError> },
}

#[derive(Debug, Deserialize)]
pub struct ChapterData {
    pub id: String,
    pub attributes: ChapterAttributes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterAttributes {
    #[serde(default)]
    pub chapter: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub pages: u32,
    pub translated_language: String,
    #[serde(default)]
    pub publish_at: Option<DateTime<Utc>>,
}

impl ChapterFeedResponse {
    /// Chapters with at least one page, unlinked. Unnumbered chapters count
    /// as chapter 0.
    pub fn into_chapters(self) -> AppResult<Vec<Chapter>> {
        match self {
            ChapterFeedResponse::Ok { data } => Ok(data
                .into_iter()
                .filter(|c| c.attributes.pages > 0)
                .map(|c| Chapter {
                    chapter_number: c
                        .attributes
                        .chapter
                        .as_deref()
                        .and_then(|n| n.trim().parse::<f32>().ok())
                        .unwrap_or(0.0),
                    id: c.id,
                    volume: c.attributes.volume,
                    title: c.attributes.title.filter(|t| !t.is_empty()),
                    language: c.attributes.translated_language,
                    page_count: c.attributes.pages,
                    published_at: c.attributes.publish_at,
                    previous_chapter_id: None,
                    next_chapter_id: None,
                })
                .collect()),
            ChapterFeedResponse::Error { errors } => Err(AppError::Transport(format!(
                "Catalog rejected chapter request: {}",
                describe(&errors)
            ))),
        }
    }
}

// ============================================================================
// COVER LIST
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum CoverListResponse {
    Ok { data: Vec<CoverData> },
    Error { errors: Vec<ApiError> },
}

#[derive(Debug, Deserialize)]
pub struct CoverData {
    pub id: String,
    pub attributes: CoverAttributes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverAttributes {
    pub file_name: String,
    #[serde(default)]
    pub volume: Option<String>,
}

impl CoverListResponse {
    /// File name of the first cover, if the manga has any
    pub fn into_first_file_name(self) -> AppResult<Option<String>> {
        match self {
            CoverListResponse::Ok { data } => Ok(data
                .into_iter()
                .next()
                .map(|cover| cover.attributes.file_name)
                .filter(|name| !name.is_empty())),
            CoverListResponse::Error { errors } => Err(AppError::Transport(format!(
                "Catalog rejected cover request: {}",
                describe(&errors)
            ))),
        }
    }
}
