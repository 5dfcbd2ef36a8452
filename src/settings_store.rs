use std::sync::Arc;

use serde_json::{Value, json};
use thiserror::Error;
use uuid::Uuid;

use crate::models::settings::{ProfileSettings, SettingsUpdate};
use crate::store::{SettingsWrite, StorageError, StorageGateway};
use crate::utils::tags::prepare_for_storage;
use crate::ws::manager::{ProfileEvent, Subscription, SubscriptionManager};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{0}")]
    Validation(String),

    #[error("profile settings not found")]
    NotFound,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Checks username format: 3-30 characters from `[A-Za-z0-9_-]`
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.len() < 3 || username.len() > 30 {
        return Err("username must be between 3 and 30 characters".to_string());
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(
            "username may only contain letters, numbers, hyphens and underscores".to_string(),
        );
    }
    Ok(())
}

/// One profile's editable settings: load, save, and live-change
/// subscription over the storage gateway.
///
/// Both directions enforce the data invariants: loads normalize whatever
/// tag shapes the row carries and canonicalize links; saves validate the
/// username before any write and persist only flattened tags and formatted
/// links.
#[derive(Clone)]
pub struct SettingsStore {
    gateway: Arc<dyn StorageGateway>,
    events: SubscriptionManager,
}

impl SettingsStore {
    pub fn new(gateway: Arc<dyn StorageGateway>, events: SubscriptionManager) -> Self {
        Self { gateway, events }
    }

    /// Own settings by user id. `None` is the expected new-user state, not
    /// an error.
    pub async fn load(&self, user_id: Uuid) -> Result<Option<ProfileSettings>, SettingsError> {
        let record = self.gateway.load_settings(user_id).await?;
        Ok(record.map(ProfileSettings::from_record))
    }

    /// Public lookup by username
    pub async fn load_by_username(
        &self,
        username: &str,
    ) -> Result<Option<ProfileSettings>, SettingsError> {
        let record = self.gateway.find_settings_by_username(username).await?;
        Ok(record.map(ProfileSettings::from_record))
    }

    /// Validates, canonicalizes and persists settings for `user_id`,
    /// creating the row on first save. A failed validation performs no
    /// write. The committed state is published to subscribers.
    pub async fn save(
        &self,
        user_id: Uuid,
        update: SettingsUpdate,
    ) -> Result<ProfileSettings, SettingsError> {
        let username = match update.username.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(name) => {
                validate_username(name).map_err(SettingsError::Validation)?;
                if self.gateway.username_taken(name, user_id).await? {
                    return Err(SettingsError::Validation(format!(
                        "username \"{name}\" is already in use"
                    )));
                }
                Some(name.to_string())
            }
        };

        let links = update.social_links.formatted();
        let write = SettingsWrite {
            username,
            profile_image_url: update.profile_image_url,
            banner_image_url: update.banner_image_url,
            music_url: update.music_url,
            music_file: update.music_file,
            bio: update.bio,
            tags: Value::Array(prepare_for_storage(&update.tags)),
            theme_color: update.theme_color,
            social_links: json!({
                "instagram": links.instagram,
                "tiktok": links.tiktok,
                "discord": links.discord,
                "spotify": links.spotify,
            }),
            star_icon: update.star_icon,
            verified_icon: update.verified_icon,
        };

        let record = self.gateway.upsert_settings(user_id, &write).await?;
        let settings = ProfileSettings::from_record(record);
        tracing::info!(
            "Settings saved for user {} (profile {})",
            user_id,
            settings.profile_id
        );

        self.events.publish(
            settings.profile_id,
            ProfileEvent::ProfileSettings(settings.clone()),
        );

        Ok(settings)
    }

    /// Availability probe used while the owner types a username. Malformed
    /// names report as unavailable rather than erroring.
    pub async fn username_available(
        &self,
        username: &str,
        for_user: Uuid,
    ) -> Result<bool, SettingsError> {
        if validate_username(username).is_err() {
            return Ok(false);
        }
        Ok(!self.gateway.username_taken(username, for_user).await?)
    }

    /// Change subscription for a profile row
    pub fn subscribe(&self, profile_id: i64) -> Subscription {
        self.events.subscribe(profile_id)
    }

    /// Change subscription resolved through the owner's user id. Fails
    /// with `NotFound` before the first save.
    pub async fn subscribe_user(&self, user_id: Uuid) -> Result<Subscription, SettingsError> {
        let record = self
            .gateway
            .load_settings(user_id)
            .await?
            .ok_or(SettingsError::NotFound)?;
        Ok(self.events.subscribe(record.id))
    }
}
