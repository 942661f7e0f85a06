// src/integrations/host.rs
//
// Collaborators supplied by the hosting UI: confirmation dialogs, keyboard
// listener registration and location (URL) reflection. The terminal
// implementations below back the command-line front end.

use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use log::{debug, warn};
use parking_lot::Mutex;

#[cfg(test)]
use mockall::automock;

/// Handle of a registered keyboard listener
pub type ListenerId = u64;

/// Asks the user a yes/no question
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
}

/// Global keyboard listener registration
#[cfg_attr(test, automock)]
pub trait KeyInput: Send + Sync {
    fn register(&self) -> ListenerId;

    fn unregister(&self, listener: ListenerId);
}

/// Reflects the active chapter into the location without navigating
#[cfg_attr(test, automock)]
pub trait LocationSync: Send + Sync {
    fn replace_chapter(&self, manga_id: &str, chapter_id: &str);
}

// ============================================================================
// TERMINAL IMPLEMENTATIONS
// ============================================================================

/// Prompts on stdout and reads the answer from stdin
pub struct TerminalPrompt {
    assume_yes: bool,
}

impl TerminalPrompt {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

#[async_trait]
impl ConfirmationPrompt for TerminalPrompt {
    async fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        let message = message.to_string();
        let answer = tokio::task::spawn_blocking(move || {
            let mut stdout = std::io::stdout();
            let _ = write!(stdout, "{} [y/N] ", message);
            let _ = stdout.flush();

            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await;

        match answer {
            Ok(Ok(line)) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Ok(Err(e)) => {
                warn!("Could not read confirmation: {}", e);
                false
            }
            Err(e) => {
                warn!("Confirmation prompt failed: {}", e);
                false
            }
        }
    }
}

/// Tracks listener registrations for a terminal session
#[derive(Default)]
pub struct TerminalKeys {
    next_id: AtomicU64,
    active: Mutex<Vec<ListenerId>>,
}

impl TerminalKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_listeners(&self) -> usize {
        self.active.lock().len()
    }
}

impl KeyInput for TerminalKeys {
    fn register(&self) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.active.lock().push(id);
        debug!("Key listener {} registered", id);
        id
    }

    fn unregister(&self, listener: ListenerId) {
        self.active.lock().retain(|id| *id != listener);
        debug!("Key listener {} released", listener);
    }
}

/// Remembers the last reflected location, as a `?chapter=` query would
#[derive(Default)]
pub struct MemoryLocation {
    current: Mutex<Option<(String, String)>>,
}

impl MemoryLocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query string for the current location, e.g. `chapter=ch2`
    pub fn query(&self) -> Option<String> {
        self.current
            .lock()
            .as_ref()
            .map(|(_, chapter)| format!("chapter={}", urlencoding::encode(chapter)))
    }
}

impl LocationSync for MemoryLocation {
    fn replace_chapter(&self, manga_id: &str, chapter_id: &str) {
        *self.current.lock() = Some((manga_id.to_string(), chapter_id.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_keys_track_registrations() {
        let keys = TerminalKeys::new();
        let a = keys.register();
        let b = keys.register();
        assert_ne!(a, b);
        assert_eq!(keys.active_listeners(), 2);

        keys.unregister(a);
        assert_eq!(keys.active_listeners(), 1);
        keys.unregister(a);
        assert_eq!(keys.active_listeners(), 1);
    }

    #[test]
    fn test_memory_location_replaces() {
        let location = MemoryLocation::new();
        assert_eq!(location.query(), None);

        location.replace_chapter("m1", "ch1");
        location.replace_chapter("m1", "ch 2");
        assert_eq!(location.query().as_deref(), Some("chapter=ch%202"));
    }

    #[tokio::test]
    async fn test_assume_yes_skips_prompt() {
        assert!(TerminalPrompt::new(true).confirm("Remove?").await);
    }
}
