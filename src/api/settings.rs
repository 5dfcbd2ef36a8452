use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::AppError,
    models::{
        app_state::AppState,
        settings::{ProfileSettings, PublicProfile, SettingsUpdate, UsernameCheck},
    },
};

/// Get the authenticated user's own settings
#[utoipa::path(
    get,
    path = "/api/v1/settings",
    responses(
        (status = 200, description = "Profile settings", body = ProfileSettings),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No settings yet (new user)")
    ),
    tag = "Settings",
    security(("bearer" = []))
)]
pub async fn get_settings(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<ProfileSettings>, AppError> {
    let settings = state
        .settings
        .load(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No profile settings yet".to_string()))?;

    Ok(Json(settings))
}

/// Create or update the authenticated user's settings
#[utoipa::path(
    put,
    path = "/api/v1/settings",
    request_body = SettingsUpdate,
    responses(
        (status = 200, description = "Settings saved", body = ProfileSettings),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Settings",
    security(("bearer" = []))
)]
pub async fn save_settings(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Json(payload): Json<SettingsUpdate>,
) -> Result<Json<ProfileSettings>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let settings = state.settings.save(user_id, payload).await?;
    Ok(Json(settings))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UsernameQuery {
    /// Candidate username to probe
    pub username: String,
}

/// Check whether a username is free for the authenticated user
#[utoipa::path(
    get,
    path = "/api/v1/settings/username-check",
    params(UsernameQuery),
    responses(
        (status = 200, description = "Availability result", body = UsernameCheck),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Settings",
    security(("bearer" = []))
)]
pub async fn check_username(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Query(query): Query<UsernameQuery>,
) -> Result<Json<UsernameCheck>, AppError> {
    let available = state
        .settings
        .username_available(&query.username, user_id)
        .await?;

    Ok(Json(UsernameCheck {
        username: query.username,
        available,
    }))
}

/// Public profile lookup by username
#[utoipa::path(
    get,
    path = "/api/v1/profiles/{username}",
    params(("username" = String, Path, description = "Profile username")),
    responses(
        (status = 200, description = "Public profile", body = PublicProfile),
        (status = 404, description = "Profile not found")
    ),
    tag = "Profiles"
)]
pub async fn get_public_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<PublicProfile>, AppError> {
    let settings = state
        .settings
        .load_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile \"{username}\" not found")))?;

    Ok(Json(settings.into()))
}
