pub mod entity;
pub mod invariants;
pub mod view;

pub use entity::{LibraryDraft, LibraryEntry, MangaProgress, ReadingProgress, ReadingStatus};
pub use invariants::{
    validate_chapters, validate_draft, validate_rating, MAX_RATING, MIN_RATING,
};
pub use view::{
    aggregate_percentage, filter_and_sort, latest_progress, progress_percentage, progress_summary,
    LibraryFilter, SortKey,
};
