// src/lib.rs
// MangaShelf - Manga library and reading-state synchronization client
//
// Architecture:
// - Domain-centric: entries, statistics and the reader state machine are plain values
// - Event-driven: every store and reader change is announced on the event bus
// - Optimistic: mutations apply locally first and roll back on remote failure
// - Never blank: an unreachable backend or a guest session serves demo data
// - Application Layer: UI boundary (commands, DTOs, error responses)

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod integrations;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    filter_and_sort,
    progress_percentage,
    validate_draft,
    validate_rating,
    BackwardEntry,
    // Reader
    Chapter,
    ChapterSequence,
    CoverQuality,
    DomainError,
    // Library
    LibraryDraft,
    LibraryEntry,
    LibraryFilter,
    // Statistics
    LibraryStats,
    MangaProgress,
    ReaderPosition,
    ReaderState,
    ReadingProgress,
    ReadingStatus,
    RemoteStats,
    SessionContext,
    SortKey,
    Transition,
};

// ============================================================================
// PUBLIC API - Error Types
// ============================================================================

pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{
    create_event_bus,
    DomainEvent,
    EventBus,
    EventLogEntry,
    LibraryEntryAdded,
    LibraryEntryRemoved,
    LibraryEntryUpdated,
    LibraryLoaded,
    MutationRolledBack,
    ReaderChapterChanged,
    ReaderClosed,
    ReaderPageChanged,
    StatsRecomputed,
};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    CoverCache,
    CoverCacheConfig,
    LibraryStore,
    LoadOutcome,
    OpenOutcome,
    ReaderAction,
    ReaderKey,
    ReaderNavigator,
    RemoveOutcome,
    StoreStatus,
};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::AppState;
pub use config::ClientConfig;

// Re-export application submodules
pub use application::commands;
pub use application::dto;

// ============================================================================
// PUBLIC API - Integrations
// ============================================================================

pub use integrations::{
    CatalogClient, ConfirmationPrompt, KeyInput, LibraryApiClient, LibraryRemote, LocationSync,
    MangaDexClient,
};
