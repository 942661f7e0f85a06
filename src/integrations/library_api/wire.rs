// src/integrations/library_api/wire.rs
//
// Request and response shapes of the library API.
//
// Every endpoint gets its own enum of accepted shapes. Anything that does
// not match one of them is rejected as a transport error instead of being
// passed on as an ambiguous value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{LibraryDraft, LibraryEntry, LibraryStats, ReadingStatus, RemoteStats};
use crate::error::{AppError, AppResult};

// ============================================================================
// LIBRARY LIST
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LibraryListResponse {
    Envelope {
        success: bool,
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        library: Vec<LibraryEntry>,
    },
    Data {
        data: Vec<LibraryEntry>,
    },
    Bare(Vec<LibraryEntry>),
}

impl LibraryListResponse {
    pub fn into_entries(self) -> AppResult<Vec<LibraryEntry>> {
        match self {
            LibraryListResponse::Envelope {
                success: true,
                library,
                ..
            } => Ok(library),
            LibraryListResponse::Envelope {
                success: false,
                message,
                ..
            } => Err(AppError::Transport(
                message.unwrap_or_else(|| "Library request was not successful".to_string()),
            )),
            LibraryListResponse::Data { data } => Ok(data),
            LibraryListResponse::Bare(entries) => Ok(entries),
        }
    }
}

pub fn parse_library(value: Value) -> AppResult<Vec<LibraryEntry>> {
    serde_json::from_value::<LibraryListResponse>(value)
        .map_err(|e| AppError::Transport(format!("Unrecognized library response: {}", e)))?
        .into_entries()
}

// ============================================================================
// STATS
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StatusBreakdown {
    #[serde(rename = "Reading")]
    pub reading: u32,
    #[serde(rename = "Completed")]
    pub completed: u32,
    #[serde(rename = "OnHold")]
    pub on_hold: u32,
    #[serde(rename = "PlanToRead")]
    pub plan_to_read: u32,
    #[serde(rename = "Dropped")]
    pub dropped: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_manga: Option<u32>,
    pub currently_reading: Option<u32>,
    pub completed: Option<u32>,
    pub plan_to_read: Option<u32>,
    pub on_hold: Option<u32>,
    pub dropped: Option<u32>,
    pub total_chapters_read: Option<u64>,
    pub average_rating: Option<f64>,
}

/// Variant order matters: the summary shape has only optional fields and
/// accepts any object, so it is tried last.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StatsResponse {
    Detailed(LibraryStats),
    ByStatus {
        total_manga: u32,
        by_status: StatusBreakdown,
        #[serde(default)]
        total_chapters_read: Option<u64>,
    },
    Summary(StatsSummary),
}

impl From<StatsResponse> for RemoteStats {
    fn from(response: StatsResponse) -> Self {
        match response {
            StatsResponse::Detailed(stats) => RemoteStats {
                total_manga: Some(stats.total_manga),
                reading: Some(stats.reading),
                completed: Some(stats.completed),
                plan_to_read: Some(stats.plan_to_read),
                on_hold: Some(stats.on_hold),
                dropped: Some(stats.dropped),
                total_chapters_read: Some(stats.total_chapters_read),
                average_rating: Some(stats.average_rating),
            },
            StatsResponse::ByStatus {
                total_manga,
                by_status,
                total_chapters_read,
            } => RemoteStats {
                total_manga: Some(total_manga),
                reading: Some(by_status.reading),
                completed: Some(by_status.completed),
                plan_to_read: Some(by_status.plan_to_read),
                on_hold: Some(by_status.on_hold),
                dropped: Some(by_status.dropped),
                total_chapters_read,
                average_rating: None,
            },
            StatsResponse::Summary(summary) => RemoteStats {
                total_manga: summary.total_manga,
                reading: summary.currently_reading,
                completed: summary.completed,
                plan_to_read: summary.plan_to_read,
                on_hold: summary.on_hold,
                dropped: summary.dropped,
                total_chapters_read: summary.total_chapters_read,
                average_rating: summary.average_rating,
            },
        }
    }
}

pub fn parse_stats(value: Value) -> AppResult<RemoteStats> {
    serde_json::from_value::<StatsResponse>(value)
        .map(RemoteStats::from)
        .map_err(|e| AppError::Transport(format!("Unrecognized stats response: {}", e)))
}

// ============================================================================
// MUTATIONS
// ============================================================================

/// Acknowledgement returned by every mutation endpoint
#[derive(Debug, Deserialize)]
pub struct MutationAck {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl MutationAck {
    pub fn into_result(self) -> AppResult<()> {
        if self.success {
            Ok(())
        } else {
            Err(AppError::Transport(
                self.message
                    .unwrap_or_else(|| "Request was not successful".to_string()),
            ))
        }
    }
}

/// An empty body (e.g. 204) counts as success
pub fn parse_ack(value: Value) -> AppResult<()> {
    if value.is_null() {
        return Ok(());
    }
    serde_json::from_value::<MutationAck>(value)
        .map_err(|e| AppError::Transport(format!("Unrecognized acknowledgement: {}", e)))?
        .into_result()
}

#[derive(Debug, Serialize)]
pub struct StatusUpdate {
    pub status: ReadingStatus,
}

/// `None` is sent as `null` and clears the rating
#[derive(Debug, Serialize)]
pub struct RatingUpdate {
    pub rating: Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct NotesUpdate<'a> {
    pub notes: &'a str,
}

/// The progress endpoint takes the chapter as a string and a page
#[derive(Debug, Serialize)]
pub struct ProgressUpdate {
    pub chapter: String,
    pub page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u32>,
}

impl ProgressUpdate {
    pub fn new(chapter: u32, volume: Option<u32>) -> Self {
        Self {
            chapter: chapter.to_string(),
            page: 0,
            volume,
        }
    }
}

/// Body of "add to library": the backend expects a catalog-shaped manga
/// object, with the library fields carried alongside
#[derive(Debug, Serialize)]
pub struct AddEntryRequest<'a> {
    pub id: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub attributes: AddEntryAttributes<'a>,
    pub relationships: Vec<Value>,
    pub library: &'a LibraryDraft,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEntryAttributes<'a> {
    pub title: LocalizedText<'a>,
    pub description: LocalizedText<'a>,
    pub status: ReadingStatus,
    pub original_language: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LocalizedText<'a> {
    pub en: &'a str,
}

impl<'a> AddEntryRequest<'a> {
    pub fn from_draft(draft: &'a LibraryDraft) -> Self {
        Self {
            id: draft.manga_id.as_deref().unwrap_or(""),
            kind: "manga",
            attributes: AddEntryAttributes {
                title: LocalizedText {
                    en: draft.title.trim(),
                },
                description: LocalizedText {
                    en: draft.description.as_deref().unwrap_or(""),
                },
                status: draft.status,
                original_language: "en",
            },
            relationships: Vec::new(),
            library: draft,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire_entry(id: &str) -> Value {
        json!({
            "id": id,
            "title": "Dorohedoro",
            "status": "reading",
            "progress": { "current_chapter": 3 },
            "date_added": "2024-01-01T00:00:00Z",
            "date_updated": "2024-01-02T00:00:00Z"
        })
    }

    #[test]
    fn test_library_shapes() {
        let envelope = json!({ "success": true, "library": [wire_entry("1")] });
        assert_eq!(parse_library(envelope).unwrap().len(), 1);

        let data = json!({ "data": [wire_entry("1"), wire_entry("2")] });
        assert_eq!(parse_library(data).unwrap().len(), 2);

        let bare = json!([wire_entry("1")]);
        assert_eq!(parse_library(bare).unwrap()[0].id, "1");
    }

    #[test]
    fn test_library_failure_and_unknown_shapes_are_transport_errors() {
        let failed = json!({ "success": false, "message": "session expired" });
        match parse_library(failed) {
            Err(AppError::Transport(msg)) => assert_eq!(msg, "session expired"),
            other => panic!("unexpected: {:?}", other),
        }

        assert!(matches!(
            parse_library(json!({ "items": 3 })),
            Err(AppError::Transport(_))
        ));
        assert!(matches!(parse_library(json!("ok")), Err(AppError::Transport(_))));
    }

    #[test]
    fn test_stats_summary_shape() {
        let value = json!({
            "totalManga": 7,
            "currentlyReading": 3,
            "completed": 2,
            "planToRead": 2
        });
        let stats = parse_stats(value).unwrap();
        assert_eq!(stats.total_manga, Some(7));
        assert_eq!(stats.reading, Some(3));
        assert_eq!(stats.on_hold, None);
    }

    #[test]
    fn test_stats_detailed_and_by_status_shapes() {
        let detailed = json!({
            "total_manga": 2, "reading": 1, "completed": 1, "on_hold": 0,
            "plan_to_read": 0, "dropped": 0, "total_chapters_read": 40,
            "average_rating": 4.5
        });
        let stats = parse_stats(detailed).unwrap();
        assert_eq!(stats.average_rating, Some(4.5));
        assert_eq!(stats.total_chapters_read, Some(40));

        let by_status = json!({
            "total_manga": 3,
            "by_status": { "PlanToRead": 1, "Reading": 1, "Completed": 1, "OnHold": 0, "Dropped": 0 },
            "total_chapters_read": 12
        });
        let stats = parse_stats(by_status).unwrap();
        assert_eq!(stats.plan_to_read, Some(1));
        assert_eq!(stats.average_rating, None);
    }

    #[test]
    fn test_malformed_stats_are_rejected() {
        let malformed = json!({ "totalManga": "seven" });
        assert!(matches!(parse_stats(malformed), Err(AppError::Transport(_))));
    }

    #[test]
    fn test_ack() {
        assert!(parse_ack(json!({ "success": true })).is_ok());
        assert!(parse_ack(Value::Null).is_ok());
        assert!(matches!(
            parse_ack(json!({ "success": false, "message": "nope" })),
            Err(AppError::Transport(m)) if m == "nope"
        ));
        assert!(parse_ack(json!({ "ok": 1 })).is_err());
    }

    #[test]
    fn test_add_request_shape() {
        let mut draft = LibraryDraft::quick_add("md-42", "  Houseki no Kuni ");
        draft.description = Some("Gems".to_string());
        let body = serde_json::to_value(AddEntryRequest::from_draft(&draft)).unwrap();

        assert_eq!(body["id"], "md-42");
        assert_eq!(body["type"], "manga");
        assert_eq!(body["attributes"]["title"]["en"], "Houseki no Kuni");
        assert_eq!(body["attributes"]["status"], "plan_to_read");
        assert_eq!(body["attributes"]["originalLanguage"], "en");
    }

    #[test]
    fn test_rating_body_clears_with_null() {
        let set = serde_json::to_value(RatingUpdate { rating: Some(4) }).unwrap();
        assert_eq!(set, json!({ "rating": 4 }));

        let cleared = serde_json::to_value(RatingUpdate { rating: None }).unwrap();
        assert_eq!(cleared, json!({ "rating": null }));
    }

    #[test]
    fn test_progress_body() {
        let body = serde_json::to_value(ProgressUpdate::new(12, None)).unwrap();
        assert_eq!(body, json!({ "chapter": "12", "page": 0 }));
    }
}
