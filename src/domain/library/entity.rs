use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::DomainError;

/// One manga tracked in a user's library
///
/// The wire form is the snake_case JSON the library API exchanges, so this
/// type is both the domain entity and the payload shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryEntry {
    /// Stable identifier, unique within one library
    pub id: String,

    /// Reference to the external catalog entry (not owned)
    #[serde(default)]
    pub manga_id: Option<String>,

    pub title: String,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Resolved lazily through the cover cache when absent
    #[serde(default)]
    pub cover_url: Option<String>,

    pub status: ReadingStatus,

    #[serde(default)]
    pub progress: MangaProgress,

    /// Unset means "no opinion", which is distinct from 0
    #[serde(default)]
    pub rating: Option<u8>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub is_favorite: bool,

    pub date_added: DateTime<Utc>,

    /// Refreshed on every mutation of the entry
    pub date_updated: DateTime<Utc>,

    #[serde(default)]
    pub notes: Option<String>,

    /// Per-chapter progress records, unique by chapter id
    #[serde(default)]
    pub reading_progress: Vec<ReadingProgress>,
}

/// Reading status, exactly one at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingStatus {
    Reading,
    Completed,
    OnHold,
    PlanToRead,
    Dropped,
}

impl ReadingStatus {
    pub const ALL: [ReadingStatus; 5] = [
        ReadingStatus::Reading,
        ReadingStatus::Completed,
        ReadingStatus::OnHold,
        ReadingStatus::PlanToRead,
        ReadingStatus::Dropped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::Reading => "reading",
            ReadingStatus::Completed => "completed",
            ReadingStatus::OnHold => "on_hold",
            ReadingStatus::PlanToRead => "plan_to_read",
            ReadingStatus::Dropped => "dropped",
        }
    }
}

impl std::fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReadingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        ReadingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownValue(format!("reading status '{}'", s)))
    }
}

/// Volume/chapter position of an entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MangaProgress {
    pub current_chapter: u32,
    #[serde(default)]
    pub total_chapters: Option<u32>,
    #[serde(default)]
    pub current_volume: Option<u32>,
    #[serde(default)]
    pub total_volumes: Option<u32>,
}

impl MangaProgress {
    /// Ratio of chapters read, 0.0 when the total is unknown
    pub fn ratio(&self) -> f64 {
        match self.total_chapters {
            Some(total) if total > 0 => self.current_chapter as f64 / total as f64,
            _ => 0.0,
        }
    }
}

/// Per-chapter reading record used by the chapter progress view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingProgress {
    pub chapter_id: String,
    pub current_page: u32,
    pub total_pages: u32,
    pub percentage: f32,
    pub completed: bool,
    pub last_read: DateTime<Utc>,
}

impl ReadingProgress {
    /// Build a record for a page position, deriving percentage and completion
    pub fn at_page(chapter_id: impl Into<String>, current_page: u32, total_pages: u32) -> Self {
        let percentage = if total_pages == 0 {
            0.0
        } else {
            ((current_page + 1).min(total_pages) as f32 / total_pages as f32) * 100.0
        };
        Self {
            chapter_id: chapter_id.into(),
            current_page,
            total_pages,
            percentage,
            completed: total_pages > 0 && current_page + 1 >= total_pages,
            last_read: Utc::now(),
        }
    }
}

/// Input for adding a new entry, either from the full form or a quick-add
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryDraft {
    #[serde(default)]
    pub manga_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    pub status: ReadingStatus,
    #[serde(default)]
    pub progress: MangaProgress,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl LibraryDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            manga_id: None,
            title: title.into(),
            author: None,
            description: None,
            cover_url: None,
            status: ReadingStatus::PlanToRead,
            progress: MangaProgress::default(),
            rating: None,
            tags: Vec::new(),
            notes: None,
        }
    }

    /// Draft for adding a catalog search result straight to the reading list
    pub fn quick_add(manga_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            manga_id: Some(manga_id.into()),
            ..Self::new(title)
        }
    }

    /// Materialize the draft as a local entry (demo or guest only; the remote
    /// assigns ids otherwise)
    pub fn into_entry(self, id: String) -> LibraryEntry {
        let now = Utc::now();
        LibraryEntry {
            id,
            manga_id: self.manga_id,
            title: self.title.trim().to_string(),
            author: self.author,
            description: self.description,
            cover_url: self.cover_url,
            status: self.status,
            progress: self.progress,
            rating: self.rating,
            tags: self.tags,
            is_favorite: false,
            date_added: now,
            date_updated: now,
            notes: self.notes,
            reading_progress: Vec::new(),
        }
    }
}

impl LibraryEntry {
    /// Stamp `date_updated`, always moving it forward even when the clock
    /// has not ticked since the previous stamp
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.date_updated = if now > self.date_updated {
            now
        } else {
            self.date_updated + Duration::microseconds(1)
        };
    }

    pub fn has_tag_matching(&self, needle_lower: &str) -> bool {
        self.tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle_lower))
    }

    /// Insert or replace the record for a chapter
    pub fn record_chapter_progress(&mut self, record: ReadingProgress) {
        match self
            .reading_progress
            .iter_mut()
            .find(|existing| existing.chapter_id == record.chapter_id)
        {
            Some(existing) => *existing = record,
            None => self.reading_progress.push(record),
        }
        self.touch();
    }
}
