use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Per-profile view counter row
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ViewCounter {
    pub profile_id: i64,
    /// Total counted views, never negative
    pub view_count: i64,
    pub last_updated: DateTime<Utc>,
}

impl ViewCounter {
    /// Zero counter for profiles that have never been viewed
    pub fn empty(profile_id: i64) -> Self {
        Self {
            profile_id,
            view_count: 0,
            last_updated: Utc::now(),
        }
    }
}

/// Outcome of a view registration
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ViewEffect {
    /// Whether this visit counted as a new view
    pub incremented: bool,
    /// New total when the counter was incremented
    pub view_count: Option<i64>,
}
