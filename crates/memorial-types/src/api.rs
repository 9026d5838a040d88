use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Tribute;

// -- Submission --

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitTributeResponse {
    pub message: String,
    pub id: Uuid,
}

// -- Listing --

#[derive(Debug, Serialize, Deserialize)]
pub struct ListTributesResponse {
    pub tributes: Vec<Tribute>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

// -- Errors --

/// Wire shape of every failure response: a short human-readable category
/// plus optional field-level detail for validation failures.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}
