// events/types.rs
//
// All events the engine announces to its observers.
// Each event represents an immutable fact that has already occurred.
//
// CRITICAL RULES:
// - Events are facts, not commands
// - Events are immutable
// - Events carry only the data needed to react (observers re-read state)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trait that all events must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

macro_rules! impl_domain_event {
    ($name:ident) => {
        impl DomainEvent for $name {
            fn event_id(&self) -> Uuid {
                self.event_id
            }
            fn occurred_at(&self) -> DateTime<Utc> {
                self.occurred_at
            }
            fn event_type(&self) -> &'static str {
                stringify!($name)
            }
        }
    };
}

// ============================================================================
// LIBRARY EVENTS
// ============================================================================

/// Emitted when the library collection was replaced by a load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryLoaded {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub entry_count: usize,
    pub demo_mode: bool,
}

impl LibraryLoaded {
    pub fn new(entry_count: usize, demo_mode: bool) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            entry_count,
            demo_mode,
        }
    }
}

impl_domain_event!(LibraryLoaded);

/// Emitted when an entry changed locally (optimistically or finally)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryEntryUpdated {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub entry_id: String,
    /// Short name of the mutation, e.g. "status"
    pub change: String,
}

impl LibraryEntryUpdated {
    pub fn new(entry_id: String, change: &str) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            entry_id,
            change: change.to_string(),
        }
    }
}

impl_domain_event!(LibraryEntryUpdated);

/// Emitted when an entry was removed from the collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryEntryRemoved {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub entry_id: String,
}

impl LibraryEntryRemoved {
    pub fn new(entry_id: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            entry_id,
        }
    }
}

impl_domain_event!(LibraryEntryRemoved);

/// Emitted when a new entry was accepted (remotely, or locally in demo mode)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryEntryAdded {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub title: String,
}

impl LibraryEntryAdded {
    pub fn new(title: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            title,
        }
    }
}

impl_domain_event!(LibraryEntryAdded);

/// Emitted when an optimistic change was undone after a remote failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationRolledBack {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub entry_id: String,
    pub change: String,
    pub reason: String,
}

impl MutationRolledBack {
    pub fn new(entry_id: String, change: &str, reason: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            entry_id,
            change: change.to_string(),
            reason,
        }
    }
}

impl_domain_event!(MutationRolledBack);

/// Emitted whenever the aggregate statistics were recomputed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsRecomputed {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub total_manga: u32,
    pub from_server: bool,
}

impl StatsRecomputed {
    pub fn new(total_manga: u32, from_server: bool) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            total_manga,
            from_server,
        }
    }
}

impl_domain_event!(StatsRecomputed);

// ============================================================================
// READER EVENTS
// ============================================================================

/// Emitted when the active chapter changes (including the initial open)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderChapterChanged {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub manga_id: String,
    pub chapter_id: String,
    pub page_index: u32,
}

impl ReaderChapterChanged {
    pub fn new(manga_id: String, chapter_id: String, page_index: u32) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            manga_id,
            chapter_id,
            page_index,
        }
    }
}

impl_domain_event!(ReaderChapterChanged);

/// Emitted when the page changes within the active chapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderPageChanged {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub chapter_id: String,
    pub page_index: u32,
}

impl ReaderPageChanged {
    pub fn new(chapter_id: String, page_index: u32) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            chapter_id,
            page_index,
        }
    }
}

impl_domain_event!(ReaderPageChanged);

/// Emitted when the reader session ends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderClosed {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub manga_id: String,
}

impl ReaderClosed {
    pub fn new(manga_id: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            manga_id,
        }
    }
}

impl_domain_event!(ReaderClosed);
