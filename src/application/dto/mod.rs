// src/application/dto/mod.rs
//
// Data Transfer Objects
//
// CRITICAL PRINCIPLES:
// - DTOs are UI-friendly representations
// - DTOs are simple, serializable structs
// - Conversion FROM domain entities only (never TO)

use serde::{Deserialize, Serialize};

use crate::domain::{
    latest_progress, progress_percentage, progress_summary, Chapter, LibraryEntry, LibraryStats,
};
use crate::services::StoreStatus;

// ============================================================================
// LIBRARY DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryEntryDto {
    pub id: String,
    pub manga_id: Option<String>,
    pub title: String,
    pub author: Option<String>,
    pub status: String,
    pub current_chapter: u32,
    pub total_chapters: Option<u32>,
    pub progress_percentage: u32,
    pub chapter_summary: String,
    pub resume_chapter_id: Option<String>,
    pub rating: Option<u8>,
    pub is_favorite: bool,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub cover_url: Option<String>,
    pub date_added: String,
    pub date_updated: String,
}

impl From<&LibraryEntry> for LibraryEntryDto {
    fn from(entry: &LibraryEntry) -> Self {
        Self {
            id: entry.id.clone(),
            manga_id: entry.manga_id.clone(),
            title: entry.title.clone(),
            author: entry.author.clone(),
            status: entry.status.to_string(),
            current_chapter: entry.progress.current_chapter,
            total_chapters: entry.progress.total_chapters,
            progress_percentage: progress_percentage(&entry.progress),
            chapter_summary: progress_summary(&entry.reading_progress),
            resume_chapter_id: latest_progress(&entry.reading_progress)
                .map(|record| record.chapter_id.clone()),
            rating: entry.rating,
            is_favorite: entry.is_favorite,
            tags: entry.tags.clone(),
            notes: entry.notes.clone(),
            cover_url: entry.cover_url.clone(),
            date_added: entry.date_added.to_rfc3339(),
            date_updated: entry.date_updated.to_rfc3339(),
        }
    }
}

/// Filter inputs as the UI sends them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryQueryDto {
    pub status: Option<String>,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub favorites_only: bool,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryViewDto {
    pub entries: Vec<LibraryEntryDto>,
    pub demo_mode: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl LibraryViewDto {
    pub fn new(entries: &[LibraryEntry], demo_mode: bool, status: StoreStatus) -> Self {
        Self {
            entries: entries.iter().map(LibraryEntryDto::from).collect(),
            demo_mode,
            loading: status.loading,
            error: status.error,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryStatsDto {
    pub total_manga: u32,
    pub reading: u32,
    pub completed: u32,
    pub on_hold: u32,
    pub plan_to_read: u32,
    pub dropped: u32,
    pub total_chapters_read: u64,
    pub average_rating: f64,
    pub demo_mode: bool,
}

impl LibraryStatsDto {
    pub fn new(stats: LibraryStats, demo_mode: bool) -> Self {
        Self {
            total_manga: stats.total_manga,
            reading: stats.reading,
            completed: stats.completed,
            on_hold: stats.on_hold,
            plan_to_read: stats.plan_to_read,
            dropped: stats.dropped,
            total_chapters_read: stats.total_chapters_read,
            average_rating: (stats.average_rating * 100.0).round() / 100.0,
            demo_mode,
        }
    }
}

// ============================================================================
// READER DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterDto {
    pub id: String,
    pub display_title: String,
    pub page_count: u32,
}

impl From<&Chapter> for ChapterDto {
    fn from(chapter: &Chapter) -> Self {
        Self {
            id: chapter.id.clone(),
            display_title: chapter.display_title(),
            page_count: chapter.page_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderViewDto {
    pub manga_id: String,
    pub chapter: ChapterDto,
    pub page_index: u32,
    /// 1-based, for display
    pub page_number: u32,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub has_next_chapter: bool,
    pub has_previous_chapter: bool,
    pub demo: bool,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverDto {
    pub manga_id: String,
    pub quality: String,
    pub url: String,
}
