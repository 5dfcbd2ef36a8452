use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::views::ViewCounter;
use crate::store::{
    SettingsRecord, SettingsWrite, StorageError, StorageGateway, StorageResult, UserRecord,
};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, UserRecord>,
    settings: HashMap<Uuid, SettingsRecord>,
    views: HashMap<i64, ViewCounter>,
    blobs: HashMap<String, Vec<u8>>,
    next_profile_id: i64,
}

/// In-memory gateway for tests and local runs. Mirrors the Postgres
/// gateway's behavior, including the unique email/username constraints and
/// the upsert-on-increment counter.
#[derive(Default)]
pub struct MemoryGateway {
    inner: Mutex<Inner>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageGateway for MemoryGateway {
    async fn ping(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> StorageResult<UserRecord> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.values().any(|u| u.email == email) {
            return Err(StorageError::Conflict(format!(
                "email {email} already registered"
            )));
        }
        let user = UserRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StorageResult<Option<UserRecord>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StorageResult<Option<UserRecord>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.get(&id).cloned())
    }

    async fn load_settings(&self, user_id: Uuid) -> StorageResult<Option<SettingsRecord>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.settings.get(&user_id).cloned())
    }

    async fn find_settings_by_username(
        &self,
        username: &str,
    ) -> StorageResult<Option<SettingsRecord>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .settings
            .values()
            .find(|s| s.username.as_deref() == Some(username))
            .cloned())
    }

    async fn username_taken(&self, username: &str, exclude_user: Uuid) -> StorageResult<bool> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .settings
            .values()
            .any(|s| s.username.as_deref() == Some(username) && s.user_id != exclude_user))
    }

    async fn upsert_settings(
        &self,
        user_id: Uuid,
        write: &SettingsWrite,
    ) -> StorageResult<SettingsRecord> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(name) = write.username.as_deref() {
            let clash = inner
                .settings
                .values()
                .any(|s| s.username.as_deref() == Some(name) && s.user_id != user_id);
            if clash {
                return Err(StorageError::Conflict(format!(
                    "username {name} already taken"
                )));
            }
        }

        let id = match inner.settings.get(&user_id).map(|s| s.id) {
            Some(id) => id,
            None => {
                inner.next_profile_id += 1;
                inner.next_profile_id
            }
        };

        let record = SettingsRecord {
            id,
            user_id,
            username: write.username.clone(),
            profile_image_url: write.profile_image_url.clone(),
            banner_image_url: write.banner_image_url.clone(),
            music_url: write.music_url.clone(),
            music_file: write.music_file.clone(),
            bio: write.bio.clone(),
            tags: write.tags.clone(),
            theme_color: write.theme_color.clone(),
            social_links: write.social_links.clone(),
            star_icon: write.star_icon.clone(),
            verified_icon: write.verified_icon.clone(),
            updated_at: Utc::now(),
        };
        inner.settings.insert(user_id, record.clone());
        Ok(record)
    }

    async fn increment_view_count(&self, profile_id: i64) -> StorageResult<ViewCounter> {
        let mut inner = self.inner.lock().unwrap();
        let counter = inner.views.entry(profile_id).or_insert(ViewCounter {
            profile_id,
            view_count: 0,
            last_updated: Utc::now(),
        });
        counter.view_count += 1;
        counter.last_updated = Utc::now();
        Ok(counter.clone())
    }

    async fn view_counter(&self, profile_id: i64) -> StorageResult<Option<ViewCounter>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.views.get(&profile_id).cloned())
    }

    async fn store_blob(&self, name: &str, bytes: Vec<u8>) -> StorageResult<String> {
        let mut inner = self.inner.lock().unwrap();
        inner.blobs.insert(name.to_string(), bytes);
        Ok(format!("http://localhost/uploads/{name}"))
    }
}
