use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    middleware,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::{services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::auth::{login, logout, me, register};
use crate::api::settings::{check_username, get_public_profile, get_settings, save_settings};
use crate::api::uploads::upload;
use crate::api::views::{get_views, register_view};
use crate::middleware::auth::auth_middleware;
use crate::models::app_state::AppState;
use crate::ws::handler::profile_events_handler;

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::auth::logout,
        crate::api::auth::me,
        crate::api::settings::get_settings,
        crate::api::settings::save_settings,
        crate::api::settings::check_username,
        crate::api::settings::get_public_profile,
        crate::api::views::register_view,
        crate::api::views::get_views,
        crate::api::uploads::upload,
    ),
    components(
        schemas(
            crate::models::user::RegisterRequest,
            crate::models::user::LoginRequest,
            crate::models::user::AuthResponse,
            crate::models::user::UserResponse,
            crate::models::settings::Tag,
            crate::models::settings::SocialLinks,
            crate::models::settings::ProfileSettings,
            crate::models::settings::SettingsUpdate,
            crate::models::settings::PublicProfile,
            crate::models::settings::UsernameCheck,
            crate::models::views::ViewCounter,
            crate::models::views::ViewEffect,
            crate::api::uploads::UploadResponse,
        )
    ),
    tags(
        (name = "Authentication", description = "Account registration and session endpoints"),
        (name = "Settings", description = "Profile customization endpoints"),
        (name = "Profiles", description = "Public profile pages"),
        (name = "Views", description = "Profile view counting"),
        (name = "Uploads", description = "Profile asset storage")
    ),
    info(
        title = "Linkbio API",
        version = "0.1.0",
        description = "Personal link-in-bio profile page backend"
    )
)]
struct ApiDoc;

async fn hello_world() -> &'static str {
    "Hello from Linkbio! ✨"
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    match state.gateway.ping().await {
        Ok(()) => Json(json!({
            "status": "healthy",
            "storage": "connected"
        })),
        Err(e) => Json(json!({
            "status": "unhealthy",
            "storage": "disconnected",
            "error": e.to_string()
        })),
    }
}

/// Build the application router around shared state
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/auth/me", get(me))
        .route("/api/v1/settings", get(get_settings).put(save_settings))
        .route("/api/v1/settings/username-check", get(check_username))
        .route(
            "/api/v1/uploads",
            post(upload).layer(DefaultBodyLimit::max(25 * 1024 * 1024)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(hello_world))
        .route("/api/health", get(health_check))
        // Authentication routes
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        // Public profile and view counting
        .route("/api/v1/profiles/{username}", get(get_public_profile))
        .route(
            "/api/v1/views/{profile_id}",
            post(register_view).get(get_views),
        )
        // Realtime change events
        .route("/api/v1/ws/profiles/{profile_id}", get(profile_events_handler))
        .merge(protected)
        // Uploaded assets
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        // Swagger UI
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
