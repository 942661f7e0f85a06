// src/application/state.rs

use std::sync::Arc;

use log::info;

use crate::config::ClientConfig;
use crate::error::AppResult;
use crate::events::EventBus;
use crate::integrations::{
    CatalogClient, ConfirmationPrompt, KeyInput, LibraryApiClient, LibraryRemote, LocationSync,
    MangaDexClient, MemoryLocation, TerminalKeys, TerminalPrompt,
};
use crate::services::{CoverCache, LibraryStore, ReaderNavigator};

/// Application state shared by every command.
/// All fields are Arc-wrapped for thread-safe sharing across commands.
pub struct AppState {
    pub event_bus: Arc<EventBus>,
    pub library_store: Arc<LibraryStore>,
    pub reader: Arc<ReaderNavigator>,
    pub covers: Arc<CoverCache>,
    pub location: Arc<MemoryLocation>,
    pub keys: Arc<TerminalKeys>,
}

impl AppState {
    /// Wire the HTTP collaborators and terminal host from configuration
    pub fn from_config(config: &ClientConfig, assume_yes: bool) -> AppResult<Self> {
        let remote: Arc<dyn LibraryRemote> = Arc::new(
            LibraryApiClient::new(&config.api.base_url, config.api.timeout())?
                .with_auth(config.api.token.clone()),
        );
        let catalog: Arc<dyn CatalogClient> = Arc::new(MangaDexClient::new(
            &config.catalog.api_url,
            config.api.timeout(),
            config.catalog.min_request_interval(),
        )?);
        let confirmation: Arc<dyn ConfirmationPrompt> = Arc::new(TerminalPrompt::new(assume_yes));

        info!(
            "Library backend at {}, catalog at {}",
            config.api.base_url, config.catalog.api_url
        );

        Ok(Self::assemble(remote, catalog, confirmation, config))
    }

    /// Build the services around already constructed collaborators
    pub fn assemble(
        remote: Arc<dyn LibraryRemote>,
        catalog: Arc<dyn CatalogClient>,
        confirmation: Arc<dyn ConfirmationPrompt>,
        config: &ClientConfig,
    ) -> Self {
        let event_bus = Arc::new(EventBus::new());
        let location = Arc::new(MemoryLocation::new());
        let keys = Arc::new(TerminalKeys::new());

        let library_store = Arc::new(LibraryStore::new(
            remote,
            confirmation,
            Arc::clone(&event_bus),
            config.session.context(),
        ));
        let reader = Arc::new(ReaderNavigator::new(
            Arc::clone(&catalog),
            Arc::clone(&keys) as Arc<dyn KeyInput>,
            Arc::clone(&location) as Arc<dyn LocationSync>,
            Arc::clone(&event_bus),
            config.reader.backward_entry,
        ));
        let covers = Arc::new(CoverCache::new(catalog, config.cover_cache()));

        Self {
            event_bus,
            library_store,
            reader,
            covers,
            location,
            keys,
        }
    }
}
