// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod cover_cache;
pub mod demo_data;
pub mod library_store;
pub mod reader_service;


// Re-export all services and their types
pub use cover_cache::{CoverCache, CoverCacheConfig, DEFAULT_PLACEHOLDER_URL, DEFAULT_UPLOADS_URL};

pub use demo_data::{demo_chapters, demo_library, demo_stats, DEMO_MANGA_ID};

pub use library_store::{LibraryStore, LoadOutcome, RemoveOutcome, StoreStatus};

pub use reader_service::{
    InputSubscription, OpenOutcome, ReaderAction, ReaderCommand, ReaderKey, ReaderNavigator,
    ReaderSource,
};
