use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One guestbook entry. `id` and `created_at` are assigned by the store
/// at insert time and never change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tribute {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub publish_approved: bool,
    pub consent: bool,
    pub created_at: DateTime<Utc>,
}
