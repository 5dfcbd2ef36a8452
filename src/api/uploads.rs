use axum::{
    Json,
    extract::{Multipart, Query, State},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{errors::AppError, models::app_state::AppState};

/// Asset kind, mapped to a filename prefix like the original storage
/// buckets
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    Profile,
    Banner,
    Music,
    Tagicon,
}

impl UploadKind {
    fn prefix(self) -> &'static str {
        match self {
            UploadKind::Profile => "profile",
            UploadKind::Banner => "banner",
            UploadKind::Music => "music",
            UploadKind::Tagicon => "tagicon",
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UploadQuery {
    /// One of: profile, banner, music, tagicon
    #[param(value_type = String, example = "banner")]
    pub kind: UploadKind,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Publicly resolvable URL of the stored blob
    pub url: String,
}

/// Upload a profile asset (image or audio) and get back its public URL
#[utoipa::path(
    post,
    path = "/api/v1/uploads",
    params(UploadQuery),
    responses(
        (status = 200, description = "Blob stored", body = UploadResponse),
        (status = 400, description = "No file in request"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Storage failure")
    ),
    tag = "Uploads",
    security(("bearer" = []))
)]
pub async fn upload(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let extension = field
            .file_name()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_else(|| "bin".to_string());

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::ValidationError(format!("Failed to read file: {e}")))?;

        let name = format!(
            "{}_{}.{}",
            query.kind.prefix(),
            Uuid::new_v4().simple(),
            extension
        );
        let url = state.gateway.store_blob(&name, bytes.to_vec()).await?;

        return Ok(Json(UploadResponse { url }));
    }

    Err(AppError::ValidationError(
        "Multipart field \"file\" is required".to_string(),
    ))
}
