use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use memorial_types::api::{ErrorBody, FieldError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Too many requests. Please try again later.")]
    RateLimited,

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Photo size must be less than 5MB")]
    PayloadTooLarge,

    #[error("Malformed form payload")]
    MalformedPayload,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorBody {
                    error: "Too many requests. Please try again later.".into(),
                    details: None,
                },
            ),
            ApiError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "Validation failed".into(),
                    details: Some(details),
                },
            ),
            ApiError::PayloadTooLarge => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "Photo size must be less than 5MB".into(),
                    details: None,
                },
            ),
            ApiError::MalformedPayload => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "Malformed form payload".into(),
                    details: None,
                },
            ),
            // Internal detail is logged, never sent to the client.
            ApiError::Store(err) => {
                error!("Store error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "Internal server error".into(),
                        details: None,
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
