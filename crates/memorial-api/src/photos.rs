use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::state::AppState;
use crate::storage;

/// GET /photos/{file_name} — serves a stored tribute photo.
pub async fn get_photo(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    // Generated names never contain path separators; reject anything else
    // before touching the filesystem.
    if !storage::is_valid_file_name(&file_name) {
        return Err(StatusCode::BAD_REQUEST);
    }

    let path = state.storage.file_path(&file_name);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;

    Ok(([(header::CONTENT_TYPE, content_type(&file_name))], bytes))
}

fn content_type(file_name: &str) -> &'static str {
    match file_name.rsplit_once('.').map(|(_, ext)| ext) {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
