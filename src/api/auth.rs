use axum::{Extension, Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::AppError,
    models::{
        app_state::AppState,
        user::{AuthResponse, LoginRequest, RegisterRequest, UserResponse},
    },
    utils::{
        jwt::generate_token,
        password::{hash_password, verify_password},
    },
};

/// Create a new account and sign in
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Authentication"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    if state
        .gateway
        .find_user_by_email(&payload.email)
        .await?
        .is_some()
    {
        return Err(AppError::EmailAlreadyRegistered);
    }

    let password_hash = hash_password(&payload.password)?;
    let user = state
        .gateway
        .create_user(&payload.email, &password_hash)
        .await?;

    let token = generate_token(
        user.id,
        &user.email,
        &state.config.jwt_secret,
        state.config.token_expiry_hours,
    )?;

    tracing::info!("New account registered: {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: state.config.token_expiry_hours * 3600,
            user_id: user.id,
            email: user.email,
        }),
    ))
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let user = state
        .gateway
        .find_user_by_email(&payload.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let token = generate_token(
        user.id,
        &user.email,
        &state.config.jwt_secret,
        state.config.token_expiry_hours,
    )?;

    Ok(Json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.token_expiry_hours * 3600,
        user_id: user.id,
        email: user.email,
    }))
}

/// Sign out. Tokens are stateless, so this only acknowledges; the client
/// discards its copy.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Signed out"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Authentication",
    security(("bearer" = []))
)]
pub async fn logout(Extension(user_id): Extension<Uuid>) -> Json<Value> {
    tracing::info!("User {} signed out", user_id);
    Json(json!({ "message": "Signed out" }))
}

/// Current session's user
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    tag = "Authentication",
    security(("bearer" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .gateway
        .find_user_by_id(user_id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    Ok(Json(UserResponse {
        id: user.id,
        email: user.email,
        created_at: user.created_at,
    }))
}
