// src/application/commands/reader_commands.rs

use crate::application::{dto::*, error_handling::ToErrorResponse, state::AppState};
use crate::error::{AppError, AppResult};
use crate::services::{ReaderAction, ReaderKey, ReaderSource};

fn reader_view(state: &AppState) -> AppResult<ReaderViewDto> {
    let reader = &state.reader;
    let (Some(manga_id), Some(chapter), Some(position)) =
        (reader.manga_id(), reader.current_chapter(), reader.position())
    else {
        return Err(AppError::NotFound("Open manga".to_string()));
    };

    Ok(ReaderViewDto {
        manga_id,
        chapter: ChapterDto::from(&chapter),
        page_index: position.page_index,
        page_number: position.page_index + 1,
        total_pages: reader.total_pages(),
        has_next_page: reader.has_next_page(),
        has_previous_page: reader.has_previous_page(),
        has_next_chapter: reader.has_next_chapter(),
        has_previous_chapter: reader.has_previous_chapter(),
        demo: reader.source() == Some(ReaderSource::Demo),
        location: state.location.query(),
    })
}

pub async fn open_reader(
    state: &AppState,
    manga_id: String,
    chapter_id: Option<String>,
) -> Result<ReaderViewDto, String> {
    state
        .reader
        .open(&manga_id, chapter_id.as_deref())
        .await
        .and_then(|_| reader_view(state))
        .to_error_response()
}

pub fn get_reader_view(state: &AppState) -> Result<ReaderViewDto, String> {
    reader_view(state).to_error_response()
}

pub fn list_chapters(state: &AppState) -> Result<Vec<ChapterDto>, String> {
    Ok(state.reader.chapters().iter().map(ChapterDto::from).collect())
}

/// Apply a key press. `None` once the reader has been exited.
pub fn reader_key(state: &AppState, key: String) -> Result<Option<ReaderViewDto>, String> {
    let key = key
        .parse::<ReaderKey>()
        .map_err(AppError::from)
        .to_error_response()?;

    match state.reader.handle_key(key) {
        ReaderAction::Exit => Ok(None),
        ReaderAction::Moved(_) => reader_view(state).map(Some).to_error_response(),
    }
}

pub fn go_to_page(state: &AppState, page_index: u32) -> Result<ReaderViewDto, String> {
    state.reader.go_to_page(page_index);
    reader_view(state).to_error_response()
}

pub fn select_chapter(state: &AppState, chapter_id: String) -> Result<ReaderViewDto, String> {
    if state.reader.select_chapter(&chapter_id).is_none() {
        return Err(AppError::NotFound(format!("Chapter {}", chapter_id))).to_error_response();
    }
    reader_view(state).to_error_response()
}

pub fn close_reader(state: &AppState) -> Result<(), String> {
    state.reader.close();
    Ok(())
}
