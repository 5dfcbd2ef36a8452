use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Create a new account
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Valid email address
    #[validate(email)]
    #[schema(example = "duxs@example.com")]
    pub email: String,

    /// Password (minimum 8 characters)
    #[validate(length(min = 8))]
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

/// Sign in with email and password
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    #[schema(example = "duxs@example.com")]
    pub email: String,

    #[validate(length(min = 1))]
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

/// Session token response for register and login
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    /// JWT access token
    pub access_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Token expiration time in seconds
    pub expires_in: i64,
    /// Unique user identifier
    pub user_id: Uuid,
    pub email: String,
}

/// Current session's user
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}
