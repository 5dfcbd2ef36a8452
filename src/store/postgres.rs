use std::path::PathBuf;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::views::ViewCounter;
use crate::store::{
    SettingsRecord, SettingsWrite, StorageGateway, StorageResult, UserRecord,
};

/// Production gateway: Postgres tables plus a local directory for blobs,
/// served back under `{public_base_url}/uploads/`.
pub struct PgGateway {
    pool: PgPool,
    upload_dir: PathBuf,
    public_base_url: String,
}

impl PgGateway {
    pub fn new(pool: PgPool, upload_dir: PathBuf, public_base_url: String) -> Self {
        Self {
            pool,
            upload_dir,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

fn user_from_row(row: sqlx::postgres::PgRow) -> Result<UserRecord, sqlx::Error> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl StorageGateway for PgGateway {
    async fn ping(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> StorageResult<UserRecord> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user_from_row(row)?)
    }

    async fn find_user_by_email(&self, email: &str) -> StorageResult<Option<UserRecord>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(user_from_row).transpose().map_err(Into::into)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StorageResult<Option<UserRecord>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(user_from_row).transpose().map_err(Into::into)
    }

    async fn load_settings(&self, user_id: Uuid) -> StorageResult<Option<SettingsRecord>> {
        let record = sqlx::query_as::<_, SettingsRecord>(
            "SELECT * FROM profile_settings WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_settings_by_username(
        &self,
        username: &str,
    ) -> StorageResult<Option<SettingsRecord>> {
        let record = sqlx::query_as::<_, SettingsRecord>(
            "SELECT * FROM profile_settings WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn username_taken(&self, username: &str, exclude_user: Uuid) -> StorageResult<bool> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM profile_settings
                WHERE username = $1 AND user_id <> $2
            )
            "#,
        )
        .bind(username)
        .bind(exclude_user)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    async fn upsert_settings(
        &self,
        user_id: Uuid,
        write: &SettingsWrite,
    ) -> StorageResult<SettingsRecord> {
        let record = sqlx::query_as::<_, SettingsRecord>(
            r#"
            INSERT INTO profile_settings (
                user_id, username, profile_image_url, banner_image_url,
                music_url, music_file, bio, tags, theme_color, social_links,
                star_icon, verified_icon, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, now())
            ON CONFLICT (user_id) DO UPDATE SET
                username = EXCLUDED.username,
                profile_image_url = EXCLUDED.profile_image_url,
                banner_image_url = EXCLUDED.banner_image_url,
                music_url = EXCLUDED.music_url,
                music_file = EXCLUDED.music_file,
                bio = EXCLUDED.bio,
                tags = EXCLUDED.tags,
                theme_color = EXCLUDED.theme_color,
                social_links = EXCLUDED.social_links,
                star_icon = EXCLUDED.star_icon,
                verified_icon = EXCLUDED.verified_icon,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&write.username)
        .bind(&write.profile_image_url)
        .bind(&write.banner_image_url)
        .bind(&write.music_url)
        .bind(&write.music_file)
        .bind(&write.bio)
        .bind(&write.tags)
        .bind(&write.theme_color)
        .bind(&write.social_links)
        .bind(&write.star_icon)
        .bind(&write.verified_icon)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn increment_view_count(&self, profile_id: i64) -> StorageResult<ViewCounter> {
        let row = sqlx::query(
            r#"
            INSERT INTO profile_views (profile_id, view_count, last_updated)
            VALUES ($1, 1, now())
            ON CONFLICT (profile_id) DO UPDATE SET
                view_count = profile_views.view_count + 1,
                last_updated = now()
            RETURNING profile_id, view_count, last_updated
            "#,
        )
        .bind(profile_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ViewCounter {
            profile_id: row.try_get("profile_id")?,
            view_count: row.try_get("view_count")?,
            last_updated: row.try_get("last_updated")?,
        })
    }

    async fn view_counter(&self, profile_id: i64) -> StorageResult<Option<ViewCounter>> {
        let row = sqlx::query(
            "SELECT profile_id, view_count, last_updated FROM profile_views WHERE profile_id = $1",
        )
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(ViewCounter {
                profile_id: row.try_get("profile_id")?,
                view_count: row.try_get("view_count")?,
                last_updated: row.try_get("last_updated")?,
            })),
            None => Ok(None),
        }
    }

    async fn store_blob(&self, name: &str, bytes: Vec<u8>) -> StorageResult<String> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        let path = self.upload_dir.join(name);
        tokio::fs::write(&path, bytes).await?;
        tracing::info!("Stored blob {}", path.display());
        Ok(format!("{}/uploads/{}", self.public_base_url, name))
    }
}
