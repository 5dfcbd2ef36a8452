use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::settings_store::SettingsError;
use crate::store::StorageError;

/// Application-wide error type
#[derive(Debug)]
pub enum AppError {
    // Storage errors
    Storage(StorageError),

    // Authentication errors
    InvalidCredentials,
    InvalidToken,
    TokenExpired,
    Unauthorized,

    // Validation errors
    ValidationError(String),

    // Unique-constraint race lost at write time
    Conflict(String),

    // Account errors
    EmailAlreadyRegistered,
    UserNotFound,

    // Expected new-user / missing-row state
    NotFound(String),

    // Internal errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage error occurred".to_string(),
                )
            }
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
            ),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token".to_string()),
            AppError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired".to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::EmailAlreadyRegistered => (
                StatusCode::CONFLICT,
                "Email already registered".to_string(),
            ),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        match e {
            // The pre-write uniqueness checks can lose the race; the
            // gateway's constraint violation is still a client conflict
            StorageError::Conflict(msg) => AppError::Conflict(msg),
            other => AppError::Storage(other),
        }
    }
}

impl From<SettingsError> for AppError {
    fn from(e: SettingsError) -> Self {
        match e {
            SettingsError::Validation(msg) => AppError::ValidationError(msg),
            SettingsError::NotFound => {
                AppError::NotFound("Profile settings not found".to_string())
            }
            SettingsError::Storage(e) => AppError::from(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_conflict_is_a_client_conflict() {
        let error = AppError::from(StorageError::Conflict("username duxs already taken".into()));
        assert_eq!(error.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn conflict_inside_settings_error_keeps_its_status() {
        let error = AppError::from(SettingsError::Storage(StorageError::Conflict(
            "username duxs already taken".into(),
        )));
        assert_eq!(error.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn other_storage_errors_stay_internal() {
        let error = AppError::from(StorageError::Unavailable("down".into()));
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
