// src/services/library_store.rs
//
// Library Store - Orchestration of the user's reading list
//
// RESPONSIBILITIES:
// - Load the library and its statistics, degrading to Demo Mode when the
//   backend cannot be used
// - Apply user mutations optimistically and roll them back when the remote
//   rejects them
// - Serialize mutations per entry
// - Announce every state change on the event bus
//
// CRITICAL RULES:
// - No lock is held across an await
// - Events are emitted after the state lock is released (observers re-read
//   the store from their handlers)
// - A failed mutation leaves the entry exactly as it was, `date_updated`
//   included, unless a reload replaced the library while it was in flight

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::{
    filter_and_sort, validate_chapters, validate_draft, validate_rating, LibraryDraft,
    LibraryEntry, LibraryFilter, LibraryStats, ReadingProgress, ReadingStatus, RemoteStats,
    SessionContext,
};
use crate::error::{AppError, AppResult};
use crate::events::{
    EventBus, LibraryEntryAdded, LibraryEntryRemoved, LibraryEntryUpdated, LibraryLoaded,
    MutationRolledBack, StatsRecomputed,
};
use crate::integrations::{ConfirmationPrompt, LibraryRemote};
use crate::services::demo_data::{demo_library, demo_stats};

/// How a `load` ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Remote,
    Demo,
    Cancelled,
}

/// How a removal request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    Declined,
}

/// Loading flag and the last user-visible error
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    pub loading: bool,
    pub error: Option<String>,
}

// ============================================================================
// MUTATIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum EntryMutation {
    ToggleFavorite,
    Status(ReadingStatus),
    Rating(Option<u8>),
    Notes(String),
    Progress { chapter: u32, volume: Option<u32> },
    TotalChapters(Option<u32>),
}

impl EntryMutation {
    fn name(&self) -> &'static str {
        match self {
            EntryMutation::ToggleFavorite => "favorite",
            EntryMutation::Status(_) => "status",
            EntryMutation::Rating(_) => "rating",
            EntryMutation::Notes(_) => "notes",
            EntryMutation::Progress { .. } => "progress",
            EntryMutation::TotalChapters(_) => "total_chapters",
        }
    }

    fn affects_stats(&self) -> bool {
        matches!(
            self,
            EntryMutation::Status(_) | EntryMutation::Rating(_) | EntryMutation::Progress { .. }
        )
    }

    fn validate(&self, entry: &LibraryEntry) -> AppResult<()> {
        match self {
            EntryMutation::Rating(Some(rating)) => validate_rating(*rating)?,
            EntryMutation::Progress { chapter, .. } => {
                validate_chapters(*chapter, entry.progress.total_chapters)?
            }
            EntryMutation::TotalChapters(total) => {
                validate_chapters(entry.progress.current_chapter, *total)?
            }
            _ => {}
        }
        Ok(())
    }

    fn apply(&self, entry: &mut LibraryEntry) {
        match self {
            EntryMutation::ToggleFavorite => entry.is_favorite = !entry.is_favorite,
            EntryMutation::Status(status) => entry.status = *status,
            EntryMutation::Rating(rating) => entry.rating = *rating,
            EntryMutation::Notes(notes) => entry.notes = Some(notes.clone()),
            EntryMutation::Progress { chapter, volume } => {
                entry.progress.current_chapter = *chapter;
                if volume.is_some() {
                    entry.progress.current_volume = *volume;
                }
            }
            EntryMutation::TotalChapters(total) => entry.progress.total_chapters = *total,
        }
        entry.touch();
    }

    /// Put back every field `apply` may have changed
    fn restore(&self, entry: &mut LibraryEntry, snapshot: &LibraryEntry) {
        match self {
            EntryMutation::ToggleFavorite => entry.is_favorite = snapshot.is_favorite,
            EntryMutation::Status(_) => entry.status = snapshot.status,
            EntryMutation::Rating(_) => entry.rating = snapshot.rating,
            EntryMutation::Notes(_) => entry.notes = snapshot.notes.clone(),
            EntryMutation::Progress { .. } => {
                entry.progress.current_chapter = snapshot.progress.current_chapter;
                entry.progress.current_volume = snapshot.progress.current_volume;
            }
            EntryMutation::TotalChapters(_) => {
                entry.progress.total_chapters = snapshot.progress.total_chapters
            }
        }
        entry.date_updated = snapshot.date_updated;
    }

    async fn send(&self, remote: &dyn LibraryRemote, snapshot: &LibraryEntry) -> AppResult<()> {
        let id = snapshot.id.as_str();
        match self {
            EntryMutation::ToggleFavorite => remote.toggle_favorite(id).await,
            EntryMutation::Status(status) => remote.update_status(id, *status).await,
            EntryMutation::Rating(rating) => remote.update_rating(id, *rating).await,
            EntryMutation::Notes(notes) => remote.update_notes(id, notes).await,
            EntryMutation::Progress { chapter, volume } => {
                remote.update_progress(id, *chapter, *volume).await
            }
            // The backend has no dedicated endpoint; the progress call
            // carries the unchanged current chapter.
            EntryMutation::TotalChapters(_) => {
                remote
                    .update_progress(id, snapshot.progress.current_chapter, None)
                    .await
            }
        }
    }
}

/// Marks an entry as having a mutation in flight until dropped
struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
    entry_id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.entry_id);
    }
}

// ============================================================================
// STORE
// ============================================================================

struct StoreState {
    entries: Vec<LibraryEntry>,
    /// Bumped whenever `entries` is replaced wholesale
    generation: u64,
    stats: LibraryStats,
    demo_mode: bool,
    status: StoreStatus,
    session: SessionContext,
}

pub struct LibraryStore {
    remote: Arc<dyn LibraryRemote>,
    confirmation: Arc<dyn ConfirmationPrompt>,
    event_bus: Arc<EventBus>,
    state: Mutex<StoreState>,
    in_flight: Arc<Mutex<HashSet<String>>>,
    load_token: Mutex<CancellationToken>,
}

impl LibraryStore {
    pub fn new(
        remote: Arc<dyn LibraryRemote>,
        confirmation: Arc<dyn ConfirmationPrompt>,
        event_bus: Arc<EventBus>,
        session: SessionContext,
    ) -> Self {
        Self {
            remote,
            confirmation,
            event_bus,
            state: Mutex::new(StoreState {
                entries: Vec::new(),
                generation: 0,
                stats: LibraryStats::default(),
                demo_mode: false,
                status: StoreStatus::default(),
                session,
            }),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            load_token: Mutex::new(CancellationToken::new()),
        }
    }

    // ========================================================================
    // READ-ONLY VIEWS
    // ========================================================================

    pub fn entries(&self) -> Vec<LibraryEntry> {
        self.state.lock().entries.clone()
    }

    pub fn entry(&self, entry_id: &str) -> Option<LibraryEntry> {
        self.state
            .lock()
            .entries
            .iter()
            .find(|e| e.id == entry_id)
            .cloned()
    }

    pub fn stats(&self) -> LibraryStats {
        self.state.lock().stats.clone()
    }

    pub fn is_demo_mode(&self) -> bool {
        self.state.lock().demo_mode
    }

    pub fn status(&self) -> StoreStatus {
        self.state.lock().status.clone()
    }

    pub fn clear_error(&self) {
        self.state.lock().status.error = None;
    }

    pub fn session(&self) -> SessionContext {
        self.state.lock().session.clone()
    }

    pub fn set_session(&self, session: SessionContext) {
        debug!(
            "Session replaced (authenticated: {})",
            session.is_authenticated()
        );
        self.state.lock().session = session;
    }

    /// Filtered and sorted copy of the library
    pub fn filtered_view(&self, filter: &LibraryFilter) -> Vec<LibraryEntry> {
        filter_and_sort(&self.state.lock().entries, filter)
    }

    // ========================================================================
    // LOADING
    // ========================================================================

    /// Replace the library from the backend, or with the demo library when
    /// the backend cannot be used. Never fails.
    pub async fn load(&self) -> LoadOutcome {
        let token = self.current_load_token();
        let session = {
            let mut state = self.state.lock();
            state.status.loading = true;
            state.session.clone()
        };

        if !session.is_authenticated() {
            info!("No authenticated session, showing the demo library");
            self.enter_demo_mode();
            return LoadOutcome::Demo;
        }

        let fetched = tokio::select! {
            _ = token.cancelled() => {
                debug!("Library load cancelled");
                self.state.lock().status.loading = false;
                return LoadOutcome::Cancelled;
            }
            result = self.fetch_remote() => result,
        };

        match fetched {
            Ok((entries, remote_stats)) => {
                let from_server = remote_stats
                    .as_ref()
                    .is_some_and(RemoteStats::has_core_counts);
                let (count, total) = {
                    let mut state = self.state.lock();
                    state.stats = LibraryStats::reconcile(remote_stats.as_ref(), &entries);
                    state.entries = entries;
                    state.generation += 1;
                    state.demo_mode = false;
                    state.status = StoreStatus::default();
                    (state.entries.len(), state.stats.total_manga)
                };
                info!("Loaded {} library entries", count);
                self.event_bus.emit(LibraryLoaded::new(count, false));
                self.event_bus.emit(StatsRecomputed::new(total, from_server));
                LoadOutcome::Remote
            }
            Err(e) => {
                warn!("Library unavailable ({}), showing the demo library", e);
                self.enter_demo_mode();
                LoadOutcome::Demo
            }
        }
    }

    /// Refresh statistics: the server aggregate when usable, local
    /// computation otherwise
    pub async fn load_stats(&self) -> LibraryStats {
        let token = self.current_load_token();
        let use_remote = {
            let state = self.state.lock();
            !state.demo_mode && state.session.is_authenticated()
        };

        let remote_stats = if use_remote {
            let fetched = tokio::select! {
                _ = token.cancelled() => {
                    debug!("Stats load cancelled");
                    return self.stats();
                }
                result = self.remote.fetch_stats() => result,
            };
            match fetched {
                Ok(stats) => Some(stats),
                Err(e) => {
                    warn!("Server statistics unavailable ({}), computing locally", e);
                    None
                }
            }
        } else {
            None
        };

        let from_server = remote_stats
            .as_ref()
            .is_some_and(RemoteStats::has_core_counts);
        let stats = {
            let mut state = self.state.lock();
            state.stats = LibraryStats::reconcile(remote_stats.as_ref(), &state.entries);
            state.stats.clone()
        };
        self.event_bus
            .emit(StatsRecomputed::new(stats.total_manga, from_server));
        stats
    }

    /// Cancel in-flight `load`/`load_stats` calls. Mutations keep running.
    pub fn cancel_pending_loads(&self) {
        self.load_token.lock().cancel();
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    pub async fn toggle_favorite(&self, entry_id: &str) -> AppResult<()> {
        self.mutate(entry_id, EntryMutation::ToggleFavorite).await
    }

    pub async fn update_status(&self, entry_id: &str, status: ReadingStatus) -> AppResult<()> {
        self.mutate(entry_id, EntryMutation::Status(status)).await
    }

    /// Set the rating, or clear it with `None`
    pub async fn update_rating(&self, entry_id: &str, rating: Option<u8>) -> AppResult<()> {
        self.mutate(entry_id, EntryMutation::Rating(rating)).await
    }

    pub async fn update_notes(&self, entry_id: &str, notes: impl Into<String>) -> AppResult<()> {
        self.mutate(entry_id, EntryMutation::Notes(notes.into()))
            .await
    }

    pub async fn update_progress(
        &self,
        entry_id: &str,
        chapter: u32,
        volume: Option<u32>,
    ) -> AppResult<()> {
        self.mutate(entry_id, EntryMutation::Progress { chapter, volume })
            .await
    }

    pub async fn update_total_chapters(
        &self,
        entry_id: &str,
        total_chapters: Option<u32>,
    ) -> AppResult<()> {
        self.mutate(entry_id, EntryMutation::TotalChapters(total_chapters))
            .await
    }

    /// Record per-chapter reading progress locally
    pub fn record_chapter_progress(
        &self,
        entry_id: &str,
        record: ReadingProgress,
    ) -> AppResult<()> {
        let _guard = self.begin_mutation(entry_id)?;
        {
            let mut state = self.state.lock();
            let entry = find_entry(&mut state.entries, entry_id)?;
            entry.record_chapter_progress(record);
        }
        self.event_bus
            .emit(LibraryEntryUpdated::new(entry_id.to_string(), "chapter_progress"));
        Ok(())
    }

    /// Remove an entry after the user confirms
    pub async fn remove_from_library(&self, entry_id: &str) -> AppResult<RemoveOutcome> {
        let _guard = self.begin_mutation(entry_id)?;

        let title = self
            .entry(entry_id)
            .map(|e| e.title)
            .ok_or_else(|| not_found(entry_id))?;

        let question = format!(
            "Are you sure you want to remove \"{}\" from your library?",
            title
        );
        if !self.confirmation.confirm(&question).await {
            debug!("Removal of {} declined", entry_id);
            return Ok(RemoveOutcome::Declined);
        }

        let (index, removed, demo, generation) = {
            let mut state = self.state.lock();
            let index = state
                .entries
                .iter()
                .position(|e| e.id == entry_id)
                .ok_or_else(|| not_found(entry_id))?;
            let removed = state.entries.remove(index);
            (index, removed, state.demo_mode, state.generation)
        };
        self.event_bus
            .emit(LibraryEntryRemoved::new(entry_id.to_string()));

        if demo {
            self.recompute_local_stats();
            return Ok(RemoveOutcome::Removed);
        }

        match self.remote.remove_entry(entry_id).await {
            Ok(()) => {
                info!("Removed {} from the library", entry_id);
                self.load_stats().await;
                Ok(RemoveOutcome::Removed)
            }
            Err(e) => {
                {
                    let mut state = self.state.lock();
                    if state.generation == generation {
                        let at = index.min(state.entries.len());
                        state.entries.insert(at, removed);
                    } else {
                        debug!(
                            "Library reloaded during removal of {}, not reinserting",
                            entry_id
                        );
                    }
                }
                self.record_error("Failed to remove manga from library", &e);
                self.event_bus.emit(MutationRolledBack::new(
                    entry_id.to_string(),
                    "remove",
                    e.to_string(),
                ));
                Err(e)
            }
        }
    }

    /// Add a new entry. Remotely accepted drafts trigger a full reload.
    pub async fn add_manga(&self, draft: LibraryDraft) -> AppResult<()> {
        if let Err(e) = validate_draft(&draft) {
            let error = AppError::from(e);
            self.record_error("Cannot add manga", &error);
            return Err(error);
        }

        let title = draft.title.trim().to_string();

        let local = {
            let state = self.state.lock();
            state.demo_mode || !state.session.is_authenticated()
        };

        if local {
            let entry = draft.into_entry(Uuid::new_v4().to_string());
            self.state.lock().entries.push(entry);
            self.event_bus.emit(LibraryEntryAdded::new(title));
            self.recompute_local_stats();
            return Ok(());
        }

        match self.remote.add_entry(&draft).await {
            Ok(()) => {
                info!("Added \"{}\" to the library", title);
                self.event_bus.emit(LibraryEntryAdded::new(title));
                self.load().await;
                Ok(())
            }
            Err(e) => {
                self.record_error("Failed to add manga", &e);
                Err(e)
            }
        }
    }

    /// Add a catalog search result to the reading list
    pub async fn quick_add(&self, manga_id: &str, title: &str) -> AppResult<()> {
        self.add_manga(LibraryDraft::quick_add(manga_id, title))
            .await
    }

    // ========================================================================
    // INTERNAL
    // ========================================================================

    async fn fetch_remote(&self) -> AppResult<(Vec<LibraryEntry>, Option<RemoteStats>)> {
        let entries = self.remote.fetch_library().await?;
        let stats = match self.remote.fetch_stats().await {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!("Server statistics unavailable ({}), computing locally", e);
                None
            }
        };
        Ok((entries, stats))
    }

    fn enter_demo_mode(&self) {
        let (count, total) = {
            let mut state = self.state.lock();
            state.entries = demo_library();
            state.generation += 1;
            state.stats = demo_stats();
            state.demo_mode = true;
            state.status = StoreStatus::default();
            (state.entries.len(), state.stats.total_manga)
        };
        self.event_bus.emit(LibraryLoaded::new(count, true));
        self.event_bus.emit(StatsRecomputed::new(total, false));
    }

    /// The active load token, replaced once it has been cancelled
    fn current_load_token(&self) -> CancellationToken {
        let mut token = self.load_token.lock();
        if token.is_cancelled() {
            *token = CancellationToken::new();
        }
        token.clone()
    }

    fn begin_mutation(&self, entry_id: &str) -> AppResult<InFlightGuard> {
        if !self.in_flight.lock().insert(entry_id.to_string()) {
            return Err(AppError::MutationInProgress(entry_id.to_string()));
        }
        Ok(InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
            entry_id: entry_id.to_string(),
        })
    }

    /// Snapshot, apply, send; restore the snapshot when the remote fails
    async fn mutate(&self, entry_id: &str, mutation: EntryMutation) -> AppResult<()> {
        let _guard = self.begin_mutation(entry_id)?;

        let applied = {
            let mut state = self.state.lock();
            let demo = state.demo_mode;
            let generation = state.generation;
            find_entry(&mut state.entries, entry_id).and_then(|entry| {
                mutation.validate(entry)?;
                let snapshot = entry.clone();
                mutation.apply(entry);
                Ok((snapshot, demo, generation))
            })
        };
        let (snapshot, demo, generation) = match applied {
            Ok(applied) => applied,
            Err(e) => {
                self.record_error(&format!("Failed to update {}", mutation.name()), &e);
                return Err(e);
            }
        };

        self.event_bus
            .emit(LibraryEntryUpdated::new(entry_id.to_string(), mutation.name()));

        if demo {
            if mutation.affects_stats() {
                self.recompute_local_stats();
            }
            return Ok(());
        }

        match mutation.send(self.remote.as_ref(), &snapshot).await {
            Ok(()) => {
                debug!("Remote accepted {} change for {}", mutation.name(), entry_id);
                if mutation.affects_stats() {
                    self.load_stats().await;
                }
                Ok(())
            }
            Err(e) => {
                {
                    let mut state = self.state.lock();
                    // A reload since `apply` already holds newer server state
                    if state.generation == generation {
                        if let Ok(entry) = find_entry(&mut state.entries, entry_id) {
                            mutation.restore(entry, &snapshot);
                        }
                    } else {
                        debug!(
                            "Library reloaded during {} change of {}, keeping reloaded entry",
                            mutation.name(),
                            entry_id
                        );
                    }
                }
                self.record_error(&format!("Failed to update {}", mutation.name()), &e);
                self.event_bus.emit(MutationRolledBack::new(
                    entry_id.to_string(),
                    mutation.name(),
                    e.to_string(),
                ));
                Err(e)
            }
        }
    }

    fn recompute_local_stats(&self) {
        let total = {
            let mut state = self.state.lock();
            state.stats = LibraryStats::from_entries(&state.entries);
            state.stats.total_manga
        };
        self.event_bus.emit(StatsRecomputed::new(total, false));
    }

    fn record_error(&self, context: &str, error: &AppError) {
        warn!("{}: {}", context, error);
        self.state.lock().status.error = Some(format!("{}: {}", context, error));
    }
}

fn not_found(entry_id: &str) -> AppError {
    AppError::NotFound(format!("library entry {}", entry_id))
}

fn find_entry<'a>(entries: &'a mut [LibraryEntry], entry_id: &str) -> AppResult<&'a mut LibraryEntry> {
    entries
        .iter_mut()
        .find(|e| e.id == entry_id)
        .ok_or_else(|| not_found(entry_id))
}
