/// Database row types — these map directly to SQLite rows.
/// Distinct from the memorial-types API models to keep the DB layer independent.

#[derive(Debug, Clone)]
pub struct TributeRow {
    pub id: String,
    pub name: String,
    pub relationship: Option<String>,
    pub message: String,
    pub photo_url: Option<String>,
    pub publish_approved: bool,
    pub consent: bool,
    pub created_at: String,
}
