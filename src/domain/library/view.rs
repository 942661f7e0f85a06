// Derived, read-only views over library entries.
//
// Everything here is a pure function of its inputs. Filters are O(n),
// sorting is a stable O(n log n) `sort_by`.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::entity::{LibraryEntry, MangaProgress, ReadingProgress, ReadingStatus};
use crate::domain::DomainError;

/// Sort order of the library view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Title,
    Rating,
    Progress,
    DateAdded,
    #[default]
    DateUpdated,
}

impl FromStr for SortKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "title" => Ok(SortKey::Title),
            "rating" => Ok(SortKey::Rating),
            "progress" => Ok(SortKey::Progress),
            "date_added" => Ok(SortKey::DateAdded),
            "date_updated" => Ok(SortKey::DateUpdated),
            _ => Err(DomainError::UnknownValue(format!("sort key '{}'", s))),
        }
    }
}

/// Inputs of the filtered library view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryFilter {
    /// `None` means all statuses
    pub status: Option<ReadingStatus>,
    pub query: String,
    pub favorites_only: bool,
    pub sort: SortKey,
}

impl LibraryFilter {
    pub fn with_status(status: ReadingStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    fn matches(&self, entry: &LibraryEntry, query_lower: &str) -> bool {
        if let Some(status) = self.status {
            if entry.status != status {
                return false;
            }
        }
        if self.favorites_only && !entry.is_favorite {
            return false;
        }
        if query_lower.is_empty() {
            return true;
        }
        entry.title.to_lowercase().contains(query_lower)
            || entry
                .author
                .as_deref()
                .is_some_and(|author| author.to_lowercase().contains(query_lower))
            || entry.has_tag_matching(query_lower)
    }
}

/// Apply the filter predicates, then the stable sort
pub fn filter_and_sort(entries: &[LibraryEntry], filter: &LibraryFilter) -> Vec<LibraryEntry> {
    let query_lower = filter.query.trim().to_lowercase();

    let mut items: Vec<LibraryEntry> = entries
        .iter()
        .filter(|entry| filter.matches(entry, &query_lower))
        .cloned()
        .collect();

    items.sort_by(|a, b| compare(a, b, filter.sort));
    items
}

fn compare(a: &LibraryEntry, b: &LibraryEntry, key: SortKey) -> Ordering {
    match key {
        SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortKey::Rating => b.rating.unwrap_or(0).cmp(&a.rating.unwrap_or(0)),
        SortKey::Progress => b.progress.ratio().total_cmp(&a.progress.ratio()),
        SortKey::DateAdded => b.date_added.cmp(&a.date_added),
        SortKey::DateUpdated => b.date_updated.cmp(&a.date_updated),
    }
}

/// Percentage of chapters read, rounded; 0 when the total is unknown
pub fn progress_percentage(progress: &MangaProgress) -> u32 {
    (progress.ratio() * 100.0).round() as u32
}

/// Mean percentage over per-chapter records, rounded
pub fn aggregate_percentage(records: &[ReadingProgress]) -> u32 {
    if records.is_empty() {
        return 0;
    }
    let total: f32 = records.iter().map(|r| r.percentage).sum();
    (total / records.len() as f32).round() as u32
}

/// Short human summary of per-chapter progress
pub fn progress_summary(records: &[ReadingProgress]) -> String {
    if records.is_empty() {
        return "Not started".to_string();
    }
    let completed = records.iter().filter(|r| r.completed).count();
    format!("{}/{} chapters", completed, records.len())
}

/// Most recently read record, i.e. where to resume
pub fn latest_progress(records: &[ReadingProgress]) -> Option<&ReadingProgress> {
    records.iter().max_by_key(|r| r.last_read)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::library::LibraryDraft;
    use chrono::{Duration, Utc};

    fn entry(id: &str, title: &str, status: ReadingStatus) -> LibraryEntry {
        let mut draft = LibraryDraft::new(title);
        draft.status = status;
        draft.into_entry(id.to_string())
    }

    fn sample() -> Vec<LibraryEntry> {
        let mut a = entry("a", "Vinland Saga", ReadingStatus::Reading);
        a.author = Some("Makoto Yukimura".to_string());
        a.rating = Some(4);
        a.progress = MangaProgress {
            current_chapter: 50,
            total_chapters: Some(200),
            ..Default::default()
        };

        let mut b = entry("b", "berserk", ReadingStatus::Completed);
        b.rating = Some(5);
        b.is_favorite = true;
        b.tags = vec!["Dark Fantasy".to_string()];
        b.progress = MangaProgress {
            current_chapter: 100,
            total_chapters: Some(100),
            ..Default::default()
        };

        let mut c = entry("c", "Akira", ReadingStatus::Dropped);
        c.progress.current_chapter = 12;

        let mut d = entry("d", "Planetes", ReadingStatus::Completed);
        d.rating = Some(5);

        let base = Utc::now();
        for (i, e) in [&mut a, &mut b, &mut c, &mut d].into_iter().enumerate() {
            e.date_added = base - Duration::days(10 - i as i64);
            e.date_updated = base - Duration::days(i as i64);
        }
        vec![a, b, c, d]
    }

    fn ids(items: &[LibraryEntry]) -> Vec<&str> {
        items.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_status_filter_returns_exact_subset() {
        let filter = LibraryFilter {
            status: Some(ReadingStatus::Completed),
            sort: SortKey::Title,
            ..Default::default()
        };
        let view = filter_and_sort(&sample(), &filter);
        assert_eq!(ids(&view), vec!["b", "d"]);
        assert!(view.iter().all(|e| e.status == ReadingStatus::Completed));
    }

    #[test]
    fn test_query_matches_title_author_and_tags() {
        let mut filter = LibraryFilter {
            query: "YUKIMURA".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_and_sort(&sample(), &filter)), vec!["a"]);

        filter.query = "fantasy".to_string();
        assert_eq!(ids(&filter_and_sort(&sample(), &filter)), vec!["b"]);

        filter.query = "kir".to_string();
        filter.sort = SortKey::Title;
        assert_eq!(ids(&filter_and_sort(&sample(), &filter)), vec!["c"]);
    }

    #[test]
    fn test_favorites_only() {
        let filter = LibraryFilter {
            favorites_only: true,
            ..Default::default()
        };
        assert_eq!(ids(&filter_and_sort(&sample(), &filter)), vec!["b"]);
    }

    #[test]
    fn test_sort_orders() {
        let all = sample();
        let by = |sort| {
            let filter = LibraryFilter {
                sort,
                ..Default::default()
            };
            filter_and_sort(&all, &filter)
                .into_iter()
                .map(|e| e.id)
                .collect::<Vec<_>>()
        };

        assert_eq!(by(SortKey::Title), vec!["c", "b", "d", "a"]);
        // b and d tie on rating 5, stable sort keeps input order
        assert_eq!(by(SortKey::Rating), vec!["b", "d", "a", "c"]);
        assert_eq!(by(SortKey::Progress), vec!["b", "a", "c", "d"]);
        assert_eq!(by(SortKey::DateAdded), vec!["d", "c", "b", "a"]);
        assert_eq!(by(SortKey::DateUpdated), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_progress_percentage() {
        let half = MangaProgress {
            current_chapter: 50,
            total_chapters: Some(100),
            ..Default::default()
        };
        assert_eq!(progress_percentage(&half), 50);

        let unknown = MangaProgress {
            current_chapter: 5,
            total_chapters: None,
            ..Default::default()
        };
        assert_eq!(progress_percentage(&unknown), 0);

        let third = MangaProgress {
            current_chapter: 1,
            total_chapters: Some(3),
            ..Default::default()
        };
        assert_eq!(progress_percentage(&third), 33);
    }

    #[test]
    fn test_chapter_record_helpers() {
        assert_eq!(aggregate_percentage(&[]), 0);
        assert_eq!(progress_summary(&[]), "Not started");
        assert!(latest_progress(&[]).is_none());

        let mut first = ReadingProgress::at_page("c1", 9, 10);
        first.last_read = Utc::now() - Duration::hours(2);
        let second = ReadingProgress::at_page("c2", 4, 10);
        let records = vec![first, second];

        assert_eq!(aggregate_percentage(&records), 75);
        assert_eq!(progress_summary(&records), "1/2 chapters");
        assert_eq!(latest_progress(&records).unwrap().chapter_id, "c2");
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("date-added".parse::<SortKey>().unwrap(), SortKey::DateAdded);
        assert!("popularity".parse::<SortKey>().is_err());
    }
}
