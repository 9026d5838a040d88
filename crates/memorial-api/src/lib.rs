pub mod error;
pub mod photos;
pub mod rate_limit;
pub mod state;
pub mod storage;
pub mod tributes;
pub mod validate;

use axum::{Router, extract::DefaultBodyLimit, routing::get};

use crate::state::AppState;

/// Multipart bodies carry field overhead on top of the photo itself, so the
/// extractor limit sits above the photo cap and the submission handler owns
/// the photo-size error shape.
const MAX_BODY_SIZE: usize = tributes::MAX_PHOTO_SIZE + 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/tributes",
            get(tributes::list_tributes).post(tributes::submit_tribute),
        )
        .route("/photos/{file_name}", get(photos::get_photo))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}
