use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One chapter of a manga
///
/// `previous_chapter_id` / `next_chapter_id` are references within the
/// sequence, not ownership. Absence marks the first/last chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    #[serde(default)]
    pub volume: Option<String>,
    pub chapter_number: f32,
    #[serde(default)]
    pub title: Option<String>,
    pub language: String,
    pub page_count: u32,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub previous_chapter_id: Option<String>,
    #[serde(default)]
    pub next_chapter_id: Option<String>,
}

impl Chapter {
    pub fn new(id: impl Into<String>, chapter_number: f32, page_count: u32) -> Self {
        Self {
            id: id.into(),
            volume: None,
            chapter_number,
            title: None,
            language: "en".to_string(),
            page_count,
            published_at: None,
            previous_chapter_id: None,
            next_chapter_id: None,
        }
    }

    pub fn is_linked(&self) -> bool {
        self.previous_chapter_id.is_some() || self.next_chapter_id.is_some()
    }

    /// Last valid page index (0 for an empty chapter)
    pub fn last_page(&self) -> u32 {
        self.page_count.saturating_sub(1)
    }

    pub fn display_title(&self) -> String {
        match &self.title {
            Some(title) if !title.is_empty() => {
                format!("Chapter {}: {}", self.chapter_number, title)
            }
            _ => format!("Chapter {}", self.chapter_number),
        }
    }
}

/// Where the reader is: active chapter and zero-based page within it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderPosition {
    pub chapter_id: String,
    pub page_index: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_title() {
        let mut chapter = Chapter::new("c1", 1.0, 12);
        assert_eq!(chapter.display_title(), "Chapter 1");
        chapter.title = Some("Romance Dawn".to_string());
        assert_eq!(chapter.display_title(), "Chapter 1: Romance Dawn");
    }

    #[test]
    fn test_last_page_of_empty_chapter() {
        assert_eq!(Chapter::new("c", 1.0, 0).last_page(), 0);
        assert_eq!(Chapter::new("c", 1.0, 7).last_page(), 6);
    }
}
