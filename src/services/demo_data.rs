// src/services/demo_data.rs
//
// Fixed data shown when the backend is unreachable or the user is not
// signed in. Deterministic: every call returns the same values.

use chrono::{DateTime, Utc};

use crate::domain::{Chapter, LibraryEntry, LibraryStats, MangaProgress, ReadingStatus};

/// Manga id under which the demo chapters are served
pub const DEMO_MANGA_ID: &str = "demo-naruto";

fn at(timestamp: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default()
}

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|t| t.to_string()).collect()
}

#[allow(clippy::too_many_arguments)]
fn entry(
    id: &str,
    title: &str,
    author: &str,
    description: &str,
    cover_url: Option<&str>,
    status: ReadingStatus,
    progress: MangaProgress,
    rating: Option<u8>,
    tag_list: &[&str],
    is_favorite: bool,
    dates: (&str, &str),
    notes: &str,
) -> LibraryEntry {
    LibraryEntry {
        id: id.to_string(),
        manga_id: None,
        title: title.to_string(),
        author: Some(author.to_string()),
        description: Some(description.to_string()),
        cover_url: cover_url.map(str::to_string),
        status,
        progress,
        rating,
        tags: tags(tag_list),
        is_favorite,
        date_added: at(dates.0),
        date_updated: at(dates.1),
        notes: Some(notes.to_string()),
        reading_progress: Vec::new(),
    }
}

/// The demo library, in display order
pub fn demo_library() -> Vec<LibraryEntry> {
    vec![
        entry(
            "1",
            "One Piece",
            "Eiichiro Oda",
            "The story of Monkey D. Luffy and his journey to become Pirate King",
            Some("https://m.media-amazon.com/images/M/MV5BODcwNWE3OTMtMDc3MS00NDFjLWE1OTAtNDU3NjgxODMxY2UyXkEyXkFqcGdeQXVyNTAyODkwOQ@@._V1_.jpg"),
            ReadingStatus::Reading,
            MangaProgress {
                current_chapter: 1095,
                total_chapters: None,
                current_volume: Some(108),
                total_volumes: None,
            },
            Some(5),
            &["Action", "Adventure", "Comedy", "Shounen"],
            true,
            ("2023-01-15T10:00:00Z", "2024-07-29T14:30:00Z"),
            "Amazing adventure story! Currently following the Egghead arc.",
        ),
        entry(
            "2",
            "Attack on Titan",
            "Hajime Isayama",
            "Humanity fights for survival against giant humanoid Titans",
            Some("https://m.media-amazon.com/images/M/MV5BNzc5MTczNDQtNDFjNi00ZGM3LWE3OWMtZGEzNWY2Y2U4YmZiXkEyXkFqcGdeQXVyNTAyODkwOQ@@._V1_FMjpg_UX1000_.jpg"),
            ReadingStatus::Completed,
            MangaProgress {
                current_chapter: 139,
                total_chapters: Some(139),
                current_volume: Some(34),
                total_volumes: Some(34),
            },
            Some(4),
            &["Action", "Drama", "Fantasy", "Military"],
            true,
            ("2022-06-10T09:00:00Z", "2023-04-09T16:45:00Z"),
            "Incredible ending to an epic series. Mind-blowing plot twists!",
        ),
        entry(
            "3",
            "Demon Slayer",
            "Koyoharu Gotouge",
            "Tanjiro joins the Demon Slayer Corps to save his sister",
            Some("https://m.media-amazon.com/images/M/MV5BZjZjNzI5MDctY2Y4YS00NmM4LTljMmItZTFkOTExNGI3ODRhXkEyXkFqcGdeQXVyNjc3MjQzNTI@._V1_.jpg"),
            ReadingStatus::Completed,
            MangaProgress {
                current_chapter: 205,
                total_chapters: Some(205),
                current_volume: Some(23),
                total_volumes: Some(23),
            },
            Some(5),
            &["Action", "Historical", "Shounen", "Supernatural"],
            false,
            ("2023-03-20T11:30:00Z", "2023-08-15T13:20:00Z"),
            "Beautiful art and emotional story. The anime adaptation is stunning!",
        ),
        entry(
            "4",
            "My Hero Academia",
            "Kohei Horikoshi",
            "Izuku Midoriya aims to become a hero in a world full of superpowers",
            None,
            ReadingStatus::OnHold,
            MangaProgress {
                current_chapter: 280,
                total_chapters: None,
                current_volume: Some(29),
                total_volumes: None,
            },
            Some(3),
            &["Action", "School", "Shounen", "Super Power"],
            false,
            ("2022-11-05T14:00:00Z", "2024-02-10T10:15:00Z"),
            "Taking a break but planning to catch up soon.",
        ),
        entry(
            "5",
            "Jujutsu Kaisen",
            "Gege Akutami",
            "Yuji Itadori joins the world of jujutsu sorcerers",
            None,
            ReadingStatus::PlanToRead,
            MangaProgress {
                current_chapter: 0,
                total_chapters: None,
                current_volume: Some(0),
                total_volumes: None,
            },
            None,
            &["Action", "School", "Shounen", "Supernatural"],
            false,
            ("2024-07-20T16:45:00Z", "2024-07-20T16:45:00Z"),
            "Heard great things about this series. Adding to reading list!",
        ),
    ]
}

/// Aggregate matching `demo_library()` exactly
pub fn demo_stats() -> LibraryStats {
    LibraryStats {
        total_manga: 5,
        reading: 1,
        completed: 2,
        on_hold: 1,
        plan_to_read: 1,
        dropped: 0,
        total_chapters_read: 1719,
        average_rating: 4.25,
    }
}

/// Linked three-chapter sequence served by the reader fallback
pub fn demo_chapters() -> Vec<Chapter> {
    let titles = ["Uzumaki Naruto", "Konohamaru", "My Name is Konohamaru"];
    let pages = [5, 4, 3];
    let ids: Vec<String> = (1..=titles.len()).map(|n| format!("ch{}", n)).collect();

    titles
        .iter()
        .zip(pages)
        .enumerate()
        .map(|(i, (title, page_count))| {
            let mut chapter = Chapter::new(ids[i].clone(), (i + 1) as f32, page_count);
            chapter.title = Some(title.to_string());
            chapter.previous_chapter_id = i.checked_sub(1).map(|p| ids[p].clone());
            chapter.next_chapter_id = ids.get(i + 1).cloned();
            chapter
        })
        .collect()
}
