use super::entity::LibraryDraft;
use crate::domain::{DomainError, DomainResult};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Validates a draft before it is sent anywhere
pub fn validate_draft(draft: &LibraryDraft) -> DomainResult<()> {
    validate_title(&draft.title)?;
    if let Some(rating) = draft.rating {
        validate_rating(rating)?;
    }
    validate_chapters(draft.progress.current_chapter, draft.progress.total_chapters)?;
    Ok(())
}

/// Title cannot be empty
fn validate_title(title: &str) -> DomainResult<()> {
    if title.trim().is_empty() {
        return Err(DomainError::EmptyTitle);
    }
    Ok(())
}

pub fn validate_rating(rating: u8) -> DomainResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(DomainError::RatingOutOfRange {
            rating,
            min: MIN_RATING,
            max: MAX_RATING,
        });
    }
    Ok(())
}

/// A known total must not be below the current chapter
pub fn validate_chapters(current: u32, total: Option<u32>) -> DomainResult<()> {
    if let Some(total) = total {
        if total > 0 && current > total {
            return Err(DomainError::InvariantViolation(format!(
                "Current chapter {} exceeds total chapters {}",
                current, total
            )));
        }
    }
    Ok(())
}

/// Invariants that hold for library entries:
///
/// 1. Identity is assigned by the remote (or locally in demo mode) and never changes
/// 2. Title cannot be empty
/// 3. Rating, when set, lies in MIN_RATING..=MAX_RATING
/// 4. current_chapter is not enforced to be monotonic; callers may set it directly
/// 5. date_updated moves forward on every mutation and is restored on rollback
