// src/application/mod.rs
//
// Application Layer
//
// ARCHITECTURE:
// - Provides the boundary between the UI (here, the CLI) and the services
// - Wires collaborators from configuration into `AppState`
// - Translates domain values into DTOs and errors into `ErrorResponse`

pub mod commands;
pub mod dto;
pub mod error_handling;
pub mod state;

pub use commands::*;
pub use dto::*;
pub use error_handling::{ErrorResponse, ErrorType, ToErrorResponse};
pub use state::AppState;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ClientConfig;
    use crate::domain::LibraryDraft;
    use crate::error::AppError;
    use crate::integrations::{
        CatalogClient, ConfirmationPrompt, LibraryRemote, MockCatalogClient,
        MockConfirmationPrompt, MockLibraryRemote,
    };

    fn offline_state() -> AppState {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_fetch_chapters()
            .returning(|_| Err(AppError::Transport("offline".to_string())));
        catalog
            .expect_fetch_cover_file_name()
            .returning(|_| Err(AppError::Transport("offline".to_string())));
        let mut confirmation = MockConfirmationPrompt::new();
        confirmation.expect_confirm().returning(|_| true);

        AppState::assemble(
            Arc::new(MockLibraryRemote::new()) as Arc<dyn LibraryRemote>,
            Arc::new(catalog) as Arc<dyn CatalogClient>,
            Arc::new(confirmation) as Arc<dyn ConfirmationPrompt>,
            &ClientConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_guest_session_serves_demo_library() {
        let state = offline_state();

        let view = load_library(&state).await.unwrap();
        assert!(view.demo_mode);
        assert_eq!(view.entries.len(), 5);

        let stats = get_library_stats(&state).await.unwrap();
        assert_eq!(stats.total_chapters_read, 1719);
        assert_eq!(stats.average_rating, 4.25);
    }

    #[tokio::test]
    async fn test_library_query_and_mutation_commands() {
        let state = offline_state();
        load_library(&state).await.unwrap();

        let view = get_library(
            &state,
            LibraryQueryDto {
                status: Some("completed".to_string()),
                sort: Some("title".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        let titles: Vec<&str> = view.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Attack on Titan", "Demon Slayer"]);

        let entry = update_status(&state, "5".to_string(), "reading".to_string())
            .await
            .unwrap();
        assert_eq!(entry.status, "reading");

        let err = update_status(&state, "5".to_string(), "paused".to_string())
            .await
            .unwrap_err();
        assert!(err.contains("validation"));

        let err = update_rating(&state, "404".to_string(), Some(3)).await.unwrap_err();
        assert!(err.contains("not_found"));

        assert!(remove_from_library(&state, "4".to_string()).await.unwrap());
        assert_eq!(
            get_library(&state, LibraryQueryDto::default()).unwrap().entries.len(),
            4
        );
    }

    #[tokio::test]
    async fn test_loaded_entry_without_cover_shows_catalog_cover() {
        let mut remote = MockLibraryRemote::new();
        remote.expect_fetch_library().returning(|| {
            Ok(vec![LibraryDraft::quick_add("md-42", "Blame!").into_entry("7".to_string())])
        });
        remote
            .expect_fetch_stats()
            .returning(|| Err(AppError::Transport("offline".to_string())));
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_fetch_cover_file_name()
            .times(1)
            .returning(|_| Ok(Some("blame.jpg".to_string())));
        let mut config = ClientConfig::default();
        config.session.session_id = Some("s1".to_string());

        let state = AppState::assemble(
            Arc::new(remote) as Arc<dyn LibraryRemote>,
            Arc::new(catalog) as Arc<dyn CatalogClient>,
            Arc::new(MockConfirmationPrompt::new()) as Arc<dyn ConfirmationPrompt>,
            &config,
        );

        let view = load_library(&state).await.unwrap();
        assert!(!view.demo_mode);
        assert_eq!(
            view.entries[0].cover_url.as_deref(),
            Some("https://uploads.mangadex.org/covers/md-42/blame.jpg.256.jpg")
        );

        // Served from the cache from now on
        let view = get_library(&state, LibraryQueryDto::default()).unwrap();
        assert_eq!(
            view.entries[0].cover_url.as_deref(),
            Some("https://uploads.mangadex.org/covers/md-42/blame.jpg.256.jpg")
        );
    }

    #[tokio::test]
    async fn test_cover_command_falls_back_to_placeholder() {
        let state = offline_state();
        let cover = get_cover_url(&state, "m1".to_string(), Some("512".to_string()))
            .await
            .unwrap();
        assert_eq!(cover.url, crate::services::DEFAULT_PLACEHOLDER_URL);
        assert_eq!(cover.quality, "512");

        assert!(get_cover_url(&state, "m1".to_string(), Some("huge".to_string()))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_reader_commands() {
        let state = offline_state();
        assert!(get_reader_view(&state).is_err());

        let view = open_reader(&state, "m1".to_string(), None).await.unwrap();
        assert!(view.demo);
        assert_eq!(view.page_number, 1);
        assert_eq!(view.location.as_deref(), Some("chapter=ch1"));
        assert_eq!(list_chapters(&state).unwrap().len(), 3);

        let view = reader_key(&state, "ArrowDown".to_string()).unwrap().unwrap();
        assert_eq!(view.chapter.id, "ch2");

        let view = go_to_page(&state, 3).unwrap();
        assert_eq!(view.page_number, 4);
        assert!(!view.has_next_page);

        assert!(select_chapter(&state, "missing".to_string()).is_err());
        assert_eq!(select_chapter(&state, "ch3".to_string()).unwrap().chapter.id, "ch3");

        assert!(reader_key(&state, "Escape".to_string()).unwrap().is_none());
        assert_eq!(state.keys.active_listeners(), 0);
    }
}
