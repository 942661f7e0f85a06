// src/integrations/mod.rs
//
// External Integrations Module
//
// Everything the engine talks to but does not own: the library backend,
// the manga catalog and the hosting UI.

pub mod host;
pub mod library_api;
pub mod mangadex;

pub use host::{
    ConfirmationPrompt, KeyInput, ListenerId, LocationSync, MemoryLocation, TerminalKeys,
    TerminalPrompt,
};
pub use library_api::{LibraryApiClient, LibraryRemote};
pub use mangadex::{CatalogClient, MangaDexClient};

#[cfg(test)]
pub use host::{MockConfirmationPrompt, MockKeyInput, MockLocationSync};
#[cfg(test)]
pub use library_api::MockLibraryRemote;
#[cfg(test)]
pub use mangadex::MockCatalogClient;
