pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::models::views::ViewCounter;

/// Errors crossing the storage boundary. Always surfaced as values, never
/// panics.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("blob storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// User account row.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Raw settings row as stored. `tags` and `social_links` are kept as loose
/// JSON here because historical rows carry inconsistent shapes; the
/// settings store normalizes on the way out.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SettingsRecord {
    pub id: i64,
    pub user_id: Uuid,
    pub username: Option<String>,
    pub profile_image_url: String,
    pub banner_image_url: String,
    pub music_url: String,
    pub music_file: String,
    pub bio: String,
    pub tags: Value,
    pub theme_color: String,
    pub social_links: Value,
    pub star_icon: String,
    pub verified_icon: String,
    pub updated_at: DateTime<Utc>,
}

/// Write shape for a settings upsert. Produced only by the settings store,
/// which guarantees `tags` is a flat `{text, icon}` array and every social
/// link is a formatted URL or empty.
#[derive(Debug, Clone)]
pub struct SettingsWrite {
    pub username: Option<String>,
    pub profile_image_url: String,
    pub banner_image_url: String,
    pub music_url: String,
    pub music_file: String,
    pub bio: String,
    pub tags: Value,
    pub theme_color: String,
    pub social_links: Value,
    pub star_icon: String,
    pub verified_icon: String,
}

/// Backend-as-a-service boundary: table rows, the view-count increment RPC
/// and blob storage. Implemented for Postgres in production and in memory
/// for tests and local runs.
#[async_trait]
pub trait StorageGateway: Send + Sync {
    async fn ping(&self) -> StorageResult<()>;

    // users
    async fn create_user(&self, email: &str, password_hash: &str) -> StorageResult<UserRecord>;
    async fn find_user_by_email(&self, email: &str) -> StorageResult<Option<UserRecord>>;
    async fn find_user_by_id(&self, id: Uuid) -> StorageResult<Option<UserRecord>>;

    // profile settings
    async fn load_settings(&self, user_id: Uuid) -> StorageResult<Option<SettingsRecord>>;
    async fn find_settings_by_username(&self, username: &str)
    -> StorageResult<Option<SettingsRecord>>;
    async fn username_taken(&self, username: &str, exclude_user: Uuid) -> StorageResult<bool>;
    async fn upsert_settings(
        &self,
        user_id: Uuid,
        write: &SettingsWrite,
    ) -> StorageResult<SettingsRecord>;

    // view counter
    async fn increment_view_count(&self, profile_id: i64) -> StorageResult<ViewCounter>;
    async fn view_counter(&self, profile_id: i64) -> StorageResult<Option<ViewCounter>>;

    // blobs
    async fn store_blob(&self, name: &str, bytes: Vec<u8>) -> StorageResult<String>;
}
