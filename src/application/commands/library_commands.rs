// src/application/commands/library_commands.rs

use log::{debug, warn};

use crate::application::{dto::*, error_handling::ToErrorResponse, state::AppState};
use crate::domain::{CoverQuality, LibraryDraft, LibraryFilter, ReadingStatus, SortKey};
use crate::error::{AppError, AppResult};
use crate::services::{LoadOutcome, RemoveOutcome};

/// Entries without their own cover show the cached catalog cover, if any
fn fill_cover(state: &AppState, dto: &mut LibraryEntryDto) {
    if dto.cover_url.is_some() {
        return;
    }
    if let Some(manga_id) = &dto.manga_id {
        dto.cover_url = state
            .covers
            .cached(manga_id, state.covers.default_quality());
    }
}

fn library_view(state: &AppState, filter: &LibraryFilter) -> LibraryViewDto {
    let store = &state.library_store;
    let mut view = LibraryViewDto::new(
        &store.filtered_view(filter),
        store.is_demo_mode(),
        store.status(),
    );
    for dto in &mut view.entries {
        fill_cover(state, dto);
    }
    view
}

fn entry_dto(state: &AppState, entry_id: &str) -> AppResult<LibraryEntryDto> {
    let mut dto = state
        .library_store
        .entry(entry_id)
        .map(|entry| LibraryEntryDto::from(&entry))
        .ok_or_else(|| AppError::NotFound(format!("Entry {}", entry_id)))?;
    fill_cover(state, &mut dto);
    Ok(dto)
}

/// Resolve catalog covers for entries that carry none
async fn prefetch_missing_covers(state: &AppState) {
    let manga_ids: Vec<String> = state
        .library_store
        .entries()
        .into_iter()
        .filter(|entry| entry.cover_url.is_none())
        .filter_map(|entry| entry.manga_id)
        .collect();
    if manga_ids.is_empty() {
        return;
    }

    if let Err(e) = state.covers.prefetch_covers(manga_ids).await {
        warn!("Cover prefetch task failed: {}", e);
    }
}

fn parse_filter(query: &LibraryQueryDto) -> AppResult<LibraryFilter> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<ReadingStatus>)
        .transpose()?;
    let sort = query
        .sort
        .as_deref()
        .map(str::parse::<SortKey>)
        .transpose()?
        .unwrap_or_default();

    Ok(LibraryFilter {
        status,
        query: query.query.clone(),
        favorites_only: query.favorites_only,
        sort,
    })
}

/// Load the library (remote or demo) and return the default view.
/// A cancelled load leaves the previous view in place.
pub async fn load_library(state: &AppState) -> Result<LibraryViewDto, String> {
    if state.library_store.load().await == LoadOutcome::Cancelled {
        debug!("Library load superseded");
    }
    prefetch_missing_covers(state).await;
    Ok(library_view(state, &LibraryFilter::default()))
}

/// Filtered and sorted view of the loaded library
pub fn get_library(state: &AppState, query: LibraryQueryDto) -> Result<LibraryViewDto, String> {
    let filter = parse_filter(&query).to_error_response()?;
    Ok(library_view(state, &filter))
}

pub async fn get_library_stats(state: &AppState) -> Result<LibraryStatsDto, String> {
    let stats = state.library_store.load_stats().await;
    Ok(LibraryStatsDto::new(stats, state.library_store.is_demo_mode()))
}

pub async fn toggle_favorite(state: &AppState, entry_id: String) -> Result<LibraryEntryDto, String> {
    state
        .library_store
        .toggle_favorite(&entry_id)
        .await
        .and_then(|_| entry_dto(state, &entry_id))
        .to_error_response()
}

pub async fn update_status(
    state: &AppState,
    entry_id: String,
    status: String,
) -> Result<LibraryEntryDto, String> {
    let status = status
        .parse::<ReadingStatus>()
        .map_err(AppError::from)
        .to_error_response()?;

    state
        .library_store
        .update_status(&entry_id, status)
        .await
        .and_then(|_| entry_dto(state, &entry_id))
        .to_error_response()
}

/// `None` clears the rating
pub async fn update_rating(
    state: &AppState,
    entry_id: String,
    rating: Option<u8>,
) -> Result<LibraryEntryDto, String> {
    state
        .library_store
        .update_rating(&entry_id, rating)
        .await
        .and_then(|_| entry_dto(state, &entry_id))
        .to_error_response()
}

pub async fn update_notes(
    state: &AppState,
    entry_id: String,
    notes: String,
) -> Result<LibraryEntryDto, String> {
    state
        .library_store
        .update_notes(&entry_id, notes)
        .await
        .and_then(|_| entry_dto(state, &entry_id))
        .to_error_response()
}

pub async fn update_progress(
    state: &AppState,
    entry_id: String,
    chapter: u32,
    volume: Option<u32>,
) -> Result<LibraryEntryDto, String> {
    state
        .library_store
        .update_progress(&entry_id, chapter, volume)
        .await
        .and_then(|_| entry_dto(state, &entry_id))
        .to_error_response()
}

pub async fn update_total_chapters(
    state: &AppState,
    entry_id: String,
    total_chapters: Option<u32>,
) -> Result<LibraryEntryDto, String> {
    state
        .library_store
        .update_total_chapters(&entry_id, total_chapters)
        .await
        .and_then(|_| entry_dto(state, &entry_id))
        .to_error_response()
}

/// `true` when the entry was removed, `false` when the user declined
pub async fn remove_from_library(state: &AppState, entry_id: String) -> Result<bool, String> {
    state
        .library_store
        .remove_from_library(&entry_id)
        .await
        .map(|outcome| outcome == RemoveOutcome::Removed)
        .to_error_response()
}

pub async fn add_manga(state: &AppState, draft: LibraryDraft) -> Result<LibraryViewDto, String> {
    state.library_store.add_manga(draft).await.to_error_response()?;
    Ok(library_view(state, &LibraryFilter::default()))
}

pub async fn quick_add(
    state: &AppState,
    manga_id: String,
    title: String,
) -> Result<LibraryViewDto, String> {
    state
        .library_store
        .quick_add(&manga_id, &title)
        .await
        .to_error_response()?;
    Ok(library_view(state, &LibraryFilter::default()))
}

pub async fn get_cover_url(
    state: &AppState,
    manga_id: String,
    quality: Option<String>,
) -> Result<CoverDto, String> {
    let quality = quality
        .as_deref()
        .map(str::parse::<CoverQuality>)
        .transpose()
        .map_err(AppError::from)
        .to_error_response()?
        .unwrap_or_default();

    let url = state.covers.get_cover_url(&manga_id, quality).await;
    Ok(CoverDto {
        manga_id,
        quality: quality.to_string(),
        url,
    })
}
