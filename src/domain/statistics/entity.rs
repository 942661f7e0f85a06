use serde::{Deserialize, Serialize};

use crate::domain::library::{LibraryEntry, ReadingStatus};

/// Aggregate over a library
/// Statistics are NEVER a source of truth and can be recalculated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryStats {
    pub total_manga: u32,
    pub reading: u32,
    pub completed: u32,
    pub on_hold: u32,
    pub plan_to_read: u32,
    pub dropped: u32,
    pub total_chapters_read: u64,
    /// Mean over rated entries only; 0.0 when nothing is rated
    pub average_rating: f64,
}

/// Aggregate as reported by the server
///
/// The first four counts are required for the report to be used at all; the
/// remaining fields are completed from local data when the server omits them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteStats {
    pub total_manga: Option<u32>,
    pub reading: Option<u32>,
    pub completed: Option<u32>,
    pub plan_to_read: Option<u32>,
    pub on_hold: Option<u32>,
    pub dropped: Option<u32>,
    pub total_chapters_read: Option<u64>,
    pub average_rating: Option<f64>,
}

impl RemoteStats {
    pub fn has_core_counts(&self) -> bool {
        self.total_manga.is_some()
            && self.reading.is_some()
            && self.completed.is_some()
            && self.plan_to_read.is_some()
    }
}

impl LibraryStats {
    /// Compute the aggregate from the entries themselves
    pub fn from_entries(entries: &[LibraryEntry]) -> Self {
        let mut stats = LibraryStats {
            total_manga: entries.len() as u32,
            ..Default::default()
        };

        let mut rating_sum = 0u32;
        let mut rated = 0u32;

        for entry in entries {
            match entry.status {
                ReadingStatus::Reading => stats.reading += 1,
                ReadingStatus::Completed => stats.completed += 1,
                ReadingStatus::OnHold => stats.on_hold += 1,
                ReadingStatus::PlanToRead => stats.plan_to_read += 1,
                ReadingStatus::Dropped => stats.dropped += 1,
            }
            stats.total_chapters_read += entry.progress.current_chapter as u64;

            if let Some(rating) = entry.rating {
                rating_sum += rating as u32;
                rated += 1;
            }
        }

        if rated > 0 {
            stats.average_rating = rating_sum as f64 / rated as f64;
        }

        stats
    }

    /// Prefer the server report, falling back to local computation when its
    /// core counts are missing
    pub fn reconcile(remote: Option<&RemoteStats>, entries: &[LibraryEntry]) -> Self {
        let local = Self::from_entries(entries);

        let Some(remote) = remote else {
            return local;
        };

        match (
            remote.total_manga,
            remote.reading,
            remote.completed,
            remote.plan_to_read,
        ) {
            (Some(total_manga), Some(reading), Some(completed), Some(plan_to_read)) => {
                LibraryStats {
                    total_manga,
                    reading,
                    completed,
                    plan_to_read,
                    on_hold: remote.on_hold.unwrap_or(local.on_hold),
                    dropped: remote.dropped.unwrap_or(local.dropped),
                    total_chapters_read: remote
                        .total_chapters_read
                        .unwrap_or(local.total_chapters_read),
                    average_rating: remote
                        .average_rating
                        .filter(|avg| avg.is_finite())
                        .unwrap_or(local.average_rating),
                }
            }
            _ => local,
        }
    }

    pub fn count_for(&self, status: ReadingStatus) -> u32 {
        match status {
            ReadingStatus::Reading => self.reading,
            ReadingStatus::Completed => self.completed,
            ReadingStatus::OnHold => self.on_hold,
            ReadingStatus::PlanToRead => self.plan_to_read,
            ReadingStatus::Dropped => self.dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::library::LibraryDraft;

    fn entries() -> Vec<LibraryEntry> {
        let mut a = LibraryDraft::new("A").into_entry("a".into());
        a.status = ReadingStatus::Reading;
        a.rating = Some(4);
        a.progress.current_chapter = 30;

        let mut b = LibraryDraft::new("B").into_entry("b".into());
        b.status = ReadingStatus::Completed;
        b.rating = Some(3);
        b.progress.current_chapter = 12;

        // unrated entries stay out of the average
        let c = LibraryDraft::new("C").into_entry("c".into());

        vec![a, b, c]
    }

    #[test]
    fn test_local_stats() {
        let stats = LibraryStats::from_entries(&entries());
        assert_eq!(stats.total_manga, 3);
        assert_eq!(stats.reading, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.plan_to_read, 1);
        assert_eq!(stats.total_chapters_read, 42);
        assert!((stats.average_rating - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_library_stats() {
        assert_eq!(LibraryStats::from_entries(&[]), LibraryStats::default());
    }

    #[test]
    fn test_reconcile_prefers_server_counts() {
        let remote = RemoteStats {
            total_manga: Some(10),
            reading: Some(4),
            completed: Some(3),
            plan_to_read: Some(2),
            ..Default::default()
        };
        let stats = LibraryStats::reconcile(Some(&remote), &entries());
        assert_eq!(stats.total_manga, 10);
        assert_eq!(stats.reading, 4);
        // omitted by the server, taken from local data
        assert_eq!(stats.total_chapters_read, 42);
        assert!((stats.average_rating - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reconcile_falls_back_when_core_counts_missing() {
        let remote = RemoteStats {
            total_manga: Some(10),
            ..Default::default()
        };
        let stats = LibraryStats::reconcile(Some(&remote), &entries());
        assert_eq!(stats, LibraryStats::from_entries(&entries()));
    }
}
