use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, error, warn};
use uuid::Uuid;

use memorial_db::models::TributeRow;
use memorial_db::queries::NewTribute;
use memorial_types::api::{ListTributesResponse, Pagination, SubmitTributeResponse};
use memorial_types::models::Tribute;

use crate::error::ApiError;
use crate::rate_limit::client_key;
use crate::state::{AppState, ApprovalPolicy};
use crate::validate::{self, TributeDraft};

/// 5 MiB cap on uploaded photos.
pub const MAX_PHOTO_SIZE: usize = 5 * 1024 * 1024;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

const CONFIRMATION: &str =
    "Thank you. Your tribute has been received and will be shared with the family.";

/// POST /tributes — multipart form with `name`, `relationship?`, `message`,
/// `publishPermission` (yes|no), `consent` (true|false), `photo?` (binary).
///
/// Pipeline order matters: rate limit, then validation, then the photo size
/// gate — all before any side effect beyond the rate-limiter bookkeeping.
pub async fn submit_tribute(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let key = client_key(&headers);
    if !state.rate_limiter.allow(&key) {
        debug!("Rate limited submission from {}", key);
        return Err(ApiError::RateLimited);
    }

    let (draft, photo) = read_form(multipart).await?;

    validate::validate(&draft).map_err(ApiError::Validation)?;

    let mut photo_url = None;
    if let Some((bytes, file_name)) = photo {
        if bytes.len() > MAX_PHOTO_SIZE {
            return Err(ApiError::PayloadTooLarge);
        }
        match state.storage.store(&bytes, file_name.as_deref()).await {
            Ok(url) => photo_url = Some(url),
            // A failed upload never aborts the submission; the tribute is
            // recorded without a photo.
            Err(e) => error!("Photo upload failed: {e:#}"),
        }
    }

    let publish_approved =
        draft.publish_permission == "yes" && state.approval == ApprovalPolicy::Auto;

    // Rusqlite is synchronous; run the insert off the async runtime.
    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || {
        db.db.insert_tribute(NewTribute {
            name: &draft.name,
            relationship: draft.relationship.as_deref(),
            message: &draft.message,
            photo_url: photo_url.as_deref(),
            publish_approved,
            consent: draft.consent,
        })
    })
    .await
    .map_err(|e| ApiError::Store(anyhow::anyhow!("spawn_blocking join error: {e}")))??;

    let id: Uuid = row
        .id
        .parse()
        .map_err(|e| ApiError::Store(anyhow::anyhow!("corrupt tribute id '{}': {e}", row.id)))?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitTributeResponse {
            message: CONFIRMATION.to_string(),
            id,
        }),
    ))
}

/// Collect the form fields and the optional photo attachment. An empty
/// photo part counts as no photo.
async fn read_form(
    mut multipart: Multipart,
) -> Result<(TributeDraft, Option<(Bytes, Option<String>)>), ApiError> {
    let mut draft = TributeDraft::default();
    let mut photo = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::MalformedPayload)?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => draft.name = text(field).await?,
            "relationship" => {
                let value = text(field).await?;
                if !value.is_empty() {
                    draft.relationship = Some(value);
                }
            }
            "message" => draft.message = text(field).await?,
            "publishPermission" => draft.publish_permission = text(field).await?,
            "consent" => draft.consent = text(field).await? == "true",
            "photo" => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::MalformedPayload)?;
                if !bytes.is_empty() {
                    photo = Some((bytes, file_name));
                }
            }
            _ => {}
        }
    }

    Ok((draft, photo))
}

async fn text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field.text().await.map_err(|_| ApiError::MalformedPayload)
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    page: Option<String>,
    limit: Option<String>,
}

/// GET /tributes?page=&limit= — the public wall: approved tributes only,
/// newest first, with pagination metadata.
pub async fn list_tributes(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    // Untrusted input: unparseable values fall back to the defaults and
    // both knobs are clamped to sane bounds.
    let page = parse_param(query.page.as_deref(), 1).max(1);
    let limit = parse_param(query.limit.as_deref(), DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let db = state.clone();
    let (rows, total) =
        tokio::task::spawn_blocking(move || db.db.list_tributes(true, page, limit))
            .await
            .map_err(|e| ApiError::Store(anyhow::anyhow!("spawn_blocking join error: {e}")))??;

    let tributes: Vec<Tribute> = rows.into_iter().map(tribute_from_row).collect();

    Ok(Json(ListTributesResponse {
        tributes,
        pagination: Pagination {
            page,
            limit,
            total,
            has_more: total > u64::from(page) * u64::from(limit),
        },
    }))
}

fn parse_param(value: Option<&str>, default: u32) -> u32 {
    value
        .and_then(|v| v.parse::<i64>().ok())
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(default)
}

fn tribute_from_row(row: TributeRow) -> Tribute {
    Tribute {
        id: row.id.parse().unwrap_or_else(|e| {
            warn!("Corrupt tribute id '{}': {}", row.id, e);
            Uuid::default()
        }),
        created_at: row.created_at.parse().unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on tribute '{}': {}", row.created_at, row.id, e);
            chrono::DateTime::default()
        }),
        name: row.name,
        relationship: row.relationship,
        message: row.message,
        photo_url: row.photo_url,
        publish_approved: row.publish_approved,
        consent: row.consent,
    }
}
