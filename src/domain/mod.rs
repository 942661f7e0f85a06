// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// This file declares all domain modules and re-exports their public API.
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod cover;
pub mod library;
pub mod reader;
pub mod session;
pub mod statistics;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Library Domain
pub use library::{
    aggregate_percentage, filter_and_sort, latest_progress, progress_percentage,
    progress_summary, validate_chapters, validate_draft, validate_rating, LibraryDraft,
    LibraryEntry, LibraryFilter, MangaProgress, ReadingProgress, ReadingStatus, SortKey,
};

// Statistics Domain (Derived Data)
pub use statistics::{LibraryStats, RemoteStats};

// Reader Domain
pub use reader::{BackwardEntry, Chapter, ChapterSequence, ReaderPosition, ReaderState, Transition};

// Cover
pub use cover::CoverQuality;

// Session
pub use session::SessionContext;

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Title is required")]
    EmptyTitle,

    #[error("Rating {rating} is outside the allowed range {min}..={max}")]
    RatingOutOfRange { rating: u8, min: u8, max: u8 },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Unknown value: {0}")]
    UnknownValue(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
