use std::str::FromStr;
use std::sync::Arc;

use memorial_db::Database;

use crate::rate_limit::RateLimiter;
use crate::storage::PhotoStorage;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub storage: PhotoStorage,
    pub rate_limiter: RateLimiter,
    pub approval: ApprovalPolicy,
}

/// What happens to a tribute whose submitter granted publish permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalPolicy {
    /// Publish immediately.
    Auto,
    /// Everything starts unapproved; approval happens out of band,
    /// directly against the database.
    Hold,
}

impl FromStr for ApprovalPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "hold" => Ok(Self::Hold),
            other => Err(anyhow::anyhow!(
                "unknown approval policy '{other}' (expected 'auto' or 'hold')"
            )),
        }
    }
}
