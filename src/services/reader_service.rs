// src/services/reader_service.rs
//
// Reader Navigation Service
//
// RESPONSIBILITIES:
// - Resolve the chapter list of a manga (catalog first, demo chapters as
//   fallback) and keep the reader position over it
// - Map keyboard input to navigation commands
// - Reflect every chapter change into the location
//
// CRITICAL RULES:
// - Boundaries are silent no-ops, never errors
// - The keyboard listener is held only while a manga is open, and is
//   released on every exit path (close, re-open, drop)
// - The page index is never persisted

use std::str::FromStr;
use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::domain::{
    BackwardEntry, Chapter, ChapterSequence, DomainError, ReaderPosition, ReaderState, Transition,
};
use crate::error::{AppError, AppResult};
use crate::events::{EventBus, ReaderChapterChanged, ReaderClosed, ReaderPageChanged};
use crate::integrations::{CatalogClient, KeyInput, ListenerId, LocationSync};
use crate::services::demo_data::demo_chapters;

/// Where the open chapter list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderSource {
    Remote,
    Demo,
}

/// How an `open` ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Remote,
    Demo,
    Cancelled,
}

// ============================================================================
// INPUT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderKey {
    ArrowRight,
    ArrowLeft,
    ArrowUp,
    ArrowDown,
    Space,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderCommand {
    NextPage,
    PreviousPage,
    NextChapter,
    PreviousChapter,
    Exit,
}

impl ReaderKey {
    pub fn command(self) -> ReaderCommand {
        match self {
            ReaderKey::ArrowRight | ReaderKey::Space => ReaderCommand::NextPage,
            ReaderKey::ArrowLeft => ReaderCommand::PreviousPage,
            ReaderKey::ArrowUp => ReaderCommand::PreviousChapter,
            ReaderKey::ArrowDown => ReaderCommand::NextChapter,
            ReaderKey::Escape => ReaderCommand::Exit,
        }
    }
}

impl FromStr for ReaderKey {
    type Err = DomainError;

    /// Accepts DOM key names (`ArrowRight`, `" "`) and short aliases
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == " " {
            return Ok(ReaderKey::Space);
        }
        match s.trim().to_ascii_lowercase().as_str() {
            "arrowright" | "right" | "n" => Ok(ReaderKey::ArrowRight),
            "arrowleft" | "left" | "p" => Ok(ReaderKey::ArrowLeft),
            "arrowup" | "up" => Ok(ReaderKey::ArrowUp),
            "arrowdown" | "down" => Ok(ReaderKey::ArrowDown),
            "space" | "" => Ok(ReaderKey::Space),
            "escape" | "esc" | "q" => Ok(ReaderKey::Escape),
            _ => Err(DomainError::UnknownValue(format!("key '{}'", s))),
        }
    }
}

/// Result of a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderAction {
    Moved(Transition),
    Exit,
}

/// A registered keyboard listener, released when dropped
pub struct InputSubscription {
    keys: Arc<dyn KeyInput>,
    listener: ListenerId,
}

impl InputSubscription {
    pub fn acquire(keys: Arc<dyn KeyInput>) -> Self {
        let listener = keys.register();
        Self { keys, listener }
    }

    pub fn listener(&self) -> ListenerId {
        self.listener
    }
}

impl Drop for InputSubscription {
    fn drop(&mut self) {
        self.keys.unregister(self.listener);
    }
}

// ============================================================================
// NAVIGATOR
// ============================================================================

struct ReaderSession {
    manga_id: String,
    state: ReaderState,
    source: ReaderSource,
    _input: InputSubscription,
}

pub struct ReaderNavigator {
    catalog: Arc<dyn CatalogClient>,
    keys: Arc<dyn KeyInput>,
    location: Arc<dyn LocationSync>,
    event_bus: Arc<EventBus>,
    backward_entry: BackwardEntry,
    session: Mutex<Option<ReaderSession>>,
    open_token: Mutex<CancellationToken>,
}

impl ReaderNavigator {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        keys: Arc<dyn KeyInput>,
        location: Arc<dyn LocationSync>,
        event_bus: Arc<EventBus>,
        backward_entry: BackwardEntry,
    ) -> Self {
        Self {
            catalog,
            keys,
            location,
            event_bus,
            backward_entry,
            session: Mutex::new(None),
            open_token: Mutex::new(CancellationToken::new()),
        }
    }

    /// Open a manga at `chapter_id`, or at its first chapter
    pub async fn open(&self, manga_id: &str, chapter_id: Option<&str>) -> AppResult<OpenOutcome> {
        let token = self.current_open_token();

        let fetched = tokio::select! {
            _ = token.cancelled() => {
                debug!("Opening {} cancelled", manga_id);
                return Ok(OpenOutcome::Cancelled);
            }
            result = self.catalog.fetch_chapters(manga_id) => result,
        };

        let (chapters, source) = match fetched {
            Ok(chapters) if !chapters.is_empty() => (chapters, ReaderSource::Remote),
            Ok(_) => {
                warn!("No readable chapters for {}, showing demo chapters", manga_id);
                (demo_chapters(), ReaderSource::Demo)
            }
            Err(e) => {
                warn!("Chapters unavailable for {} ({}), showing demo chapters", manga_id, e);
                (demo_chapters(), ReaderSource::Demo)
            }
        };

        let state = ReaderState::open(
            ChapterSequence::new(chapters),
            chapter_id,
            self.backward_entry,
        )
        .ok_or_else(|| AppError::NotFound(format!("chapters of {}", manga_id)))?;

        // Release the previous listener before taking a new one
        let previous = self.session.lock().take();
        drop(previous);

        let position = state.position();
        *self.session.lock() = Some(ReaderSession {
            manga_id: manga_id.to_string(),
            state,
            source,
            _input: InputSubscription::acquire(Arc::clone(&self.keys)),
        });

        info!(
            "Opened {} at {} ({:?})",
            manga_id, position.chapter_id, source
        );
        self.announce_chapter(manga_id, &position);

        Ok(match source {
            ReaderSource::Remote => OpenOutcome::Remote,
            ReaderSource::Demo => OpenOutcome::Demo,
        })
    }

    /// End the session: cancels a pending open and releases the listener
    pub fn close(&self) {
        self.open_token.lock().cancel();
        let closed = self.session.lock().take();
        if let Some(session) = closed {
            let manga_id = session.manga_id.clone();
            drop(session);
            debug!("Closed reader for {}", manga_id);
            self.event_bus.emit(ReaderClosed::new(manga_id));
        }
    }

    pub fn handle_key(&self, key: ReaderKey) -> ReaderAction {
        match key.command() {
            ReaderCommand::NextPage => ReaderAction::Moved(self.next_page()),
            ReaderCommand::PreviousPage => ReaderAction::Moved(self.previous_page()),
            ReaderCommand::NextChapter => ReaderAction::Moved(self.next_chapter()),
            ReaderCommand::PreviousChapter => ReaderAction::Moved(self.previous_chapter()),
            ReaderCommand::Exit => {
                self.close();
                ReaderAction::Exit
            }
        }
    }

    // ========================================================================
    // TRANSITIONS
    // ========================================================================

    pub fn next_page(&self) -> Transition {
        self.navigate(ReaderState::next_page)
    }

    pub fn previous_page(&self) -> Transition {
        self.navigate(ReaderState::previous_page)
    }

    pub fn next_chapter(&self) -> Transition {
        self.navigate(ReaderState::next_chapter)
    }

    pub fn previous_chapter(&self) -> Transition {
        self.navigate(ReaderState::previous_chapter)
    }

    pub fn go_to_page(&self, index: u32) -> Transition {
        self.navigate(|state| state.go_to_page(index))
    }

    pub fn select_chapter(&self, chapter_id: &str) -> Transition {
        self.navigate(|state| state.select_chapter(chapter_id))
    }

    // ========================================================================
    // READ-ONLY VIEWS
    // ========================================================================

    pub fn is_open(&self) -> bool {
        self.session.lock().is_some()
    }

    pub fn manga_id(&self) -> Option<String> {
        self.session.lock().as_ref().map(|s| s.manga_id.clone())
    }

    pub fn source(&self) -> Option<ReaderSource> {
        self.session.lock().as_ref().map(|s| s.source)
    }

    pub fn position(&self) -> Option<ReaderPosition> {
        self.session.lock().as_ref().map(|s| s.state.position())
    }

    pub fn current_chapter(&self) -> Option<Chapter> {
        self.session
            .lock()
            .as_ref()
            .map(|s| s.state.current_chapter().clone())
    }

    pub fn chapters(&self) -> Vec<Chapter> {
        self.session
            .lock()
            .as_ref()
            .map(|s| s.state.sequence().chapters().to_vec())
            .unwrap_or_default()
    }

    pub fn total_pages(&self) -> u32 {
        self.read(|state| state.total_pages())
    }

    pub fn has_next_page(&self) -> bool {
        self.read(|state| state.has_next_page())
    }

    pub fn has_previous_page(&self) -> bool {
        self.read(|state| state.has_previous_page())
    }

    pub fn has_next_chapter(&self) -> bool {
        self.read(|state| state.has_next_chapter())
    }

    pub fn has_previous_chapter(&self) -> bool {
        self.read(|state| state.has_previous_chapter())
    }

    // ========================================================================
    // INTERNAL
    // ========================================================================

    fn read<T: Default>(&self, f: impl FnOnce(&ReaderState) -> T) -> T {
        self.session
            .lock()
            .as_ref()
            .map(|s| f(&s.state))
            .unwrap_or_default()
    }

    fn navigate(&self, f: impl FnOnce(&mut ReaderState) -> Transition) -> Transition {
        let (transition, manga_id) = {
            let mut session = self.session.lock();
            let Some(session) = session.as_mut() else {
                return Transition::None;
            };
            (f(&mut session.state), session.manga_id.clone())
        };

        match &transition {
            Transition::None => {}
            Transition::Page {
                chapter_id,
                page_index,
            } => {
                self.event_bus
                    .emit(ReaderPageChanged::new(chapter_id.clone(), *page_index));
            }
            Transition::Chapter {
                chapter_id,
                page_index,
            } => {
                self.announce_chapter(
                    &manga_id,
                    &ReaderPosition {
                        chapter_id: chapter_id.clone(),
                        page_index: *page_index,
                    },
                );
            }
        }
        transition
    }

    fn announce_chapter(&self, manga_id: &str, position: &ReaderPosition) {
        self.location.replace_chapter(manga_id, &position.chapter_id);
        self.event_bus.emit(ReaderChapterChanged::new(
            manga_id.to_string(),
            position.chapter_id.clone(),
            position.page_index,
        ));
    }

    fn current_open_token(&self) -> CancellationToken {
        let mut token = self.open_token.lock();
        if token.is_cancelled() {
            *token = CancellationToken::new();
        }
        token.clone()
    }
}

impl Drop for ReaderNavigator {
    fn drop(&mut self) {
        self.open_token.lock().cancel();
    }
}
