use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use chrono::Utc;

use crate::{
    errors::AppError,
    models::{
        app_state::AppState,
        views::{ViewCounter, ViewEffect},
    },
};

/// Visitor key for duplicate-visit suppression. Advisory only; visitors
/// without the header share one bucket.
fn visitor_key(headers: &HeaderMap) -> String {
    headers
        .get("x-visitor-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("anonymous")
        .to_string()
}

/// Register a profile visit. Counts at most once per visitor per 24 hours.
#[utoipa::path(
    post,
    path = "/api/v1/views/{profile_id}",
    params(("profile_id" = i64, Path, description = "Profile identifier")),
    responses(
        (status = 200, description = "Visit registered", body = ViewEffect),
        (status = 500, description = "Increment failed")
    ),
    tag = "Views"
)]
pub async fn register_view(
    State(state): State<AppState>,
    Path(profile_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<ViewEffect>, AppError> {
    let visitor = visitor_key(&headers);
    let effect = state
        .tracker
        .register_view(profile_id, &visitor, Utc::now())
        .await?;

    Ok(Json(effect))
}

/// Current view counter for a profile
#[utoipa::path(
    get,
    path = "/api/v1/views/{profile_id}",
    params(("profile_id" = i64, Path, description = "Profile identifier")),
    responses(
        (status = 200, description = "View counter", body = ViewCounter)
    ),
    tag = "Views"
)]
pub async fn get_views(
    State(state): State<AppState>,
    Path(profile_id): Path<i64>,
) -> Result<Json<ViewCounter>, AppError> {
    let counter = state
        .gateway
        .view_counter(profile_id)
        .await?
        .unwrap_or_else(|| ViewCounter::empty(profile_id));

    Ok(Json(counter))
}
