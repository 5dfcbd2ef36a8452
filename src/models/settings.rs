use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::store::SettingsRecord;
use crate::utils::links::{Platform, format_link};
use crate::utils::tags::normalize_tag;

/// Small labeled badge shown on a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Tag {
    /// Display text, always present
    pub text: String,
    /// Icon URI, or empty when the tag has no icon
    pub icon: String,
}

/// Fixed-key social link set. Every non-empty value is a fully qualified
/// `https://` URL once it has passed through the formatter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SocialLinks {
    pub instagram: String,
    pub tiktok: String,
    pub discord: String,
    pub spotify: String,
}

impl SocialLinks {
    /// Reads links out of a stored JSON object, formatting each known key.
    /// Unknown keys and non-string values are dropped.
    pub fn from_stored(value: &Value) -> Self {
        let pick = |key: &str, platform: Platform| {
            value
                .get(key)
                .and_then(Value::as_str)
                .map(|raw| format_link(raw, Some(platform)))
                .unwrap_or_default()
        };
        Self {
            instagram: pick("instagram", Platform::Instagram),
            tiktok: pick("tiktok", Platform::Tiktok),
            discord: pick("discord", Platform::Discord),
            spotify: pick("spotify", Platform::Spotify),
        }
    }

    /// Canonical form for persistence: every field run through the
    /// per-platform formatter.
    pub fn formatted(&self) -> Self {
        Self {
            instagram: format_link(&self.instagram, Some(Platform::Instagram)),
            tiktok: format_link(&self.tiktok, Some(Platform::Tiktok)),
            discord: format_link(&self.discord, Some(Platform::Discord)),
            spotify: format_link(&self.spotify, Some(Platform::Spotify)),
        }
    }
}

/// Consumer-facing profile settings. Tags are always normalized and links
/// always canonical, regardless of the shape the row was stored in.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileSettings {
    pub profile_id: i64,
    pub user_id: Uuid,
    pub username: Option<String>,
    pub profile_image_url: String,
    pub banner_image_url: String,
    pub music_url: String,
    pub music_file: String,
    pub bio: String,
    pub tags: Vec<Tag>,
    pub theme_color: String,
    pub social_links: SocialLinks,
    pub star_icon: String,
    pub verified_icon: String,
    pub updated_at: DateTime<Utc>,
}

impl ProfileSettings {
    pub fn from_record(record: SettingsRecord) -> Self {
        // Stored tags may be an array, a single bare value, or null
        let tags = match &record.tags {
            Value::Array(items) => items.iter().map(normalize_tag).collect(),
            Value::Null => Vec::new(),
            other => vec![normalize_tag(other)],
        };

        Self {
            profile_id: record.id,
            user_id: record.user_id,
            username: record.username,
            profile_image_url: record.profile_image_url,
            banner_image_url: record.banner_image_url,
            music_url: record.music_url,
            music_file: record.music_file,
            bio: record.bio,
            tags,
            theme_color: record.theme_color,
            social_links: SocialLinks::from_stored(&record.social_links),
            star_icon: record.star_icon,
            verified_icon: record.verified_icon,
            updated_at: record.updated_at,
        }
    }
}

fn validate_theme_color(color: &str) -> Result<(), ValidationError> {
    let hex = color
        .strip_prefix('#')
        .ok_or_else(|| ValidationError::new("theme_color"))?;
    if matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::new("theme_color"))
    }
}

/// Editable settings payload. Tags are accepted in any shape and collapsed
/// to `{text, icon}` pairs before persisting.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct SettingsUpdate {
    /// Public handle, 3-30 chars of `[A-Za-z0-9_-]`, unique across profiles
    #[schema(example = "duxs")]
    pub username: Option<String>,

    pub profile_image_url: String,
    pub banner_image_url: String,

    /// External music URL; an uploaded music file takes priority on display
    pub music_url: String,
    pub music_file: String,

    #[validate(length(max = 500))]
    #[schema(example = "anime & games")]
    pub bio: String,

    #[schema(value_type = Vec<Object>)]
    pub tags: Vec<Value>,

    /// Hex color like `#8B5CF6`
    #[validate(custom(function = validate_theme_color))]
    #[schema(example = "#8B5CF6")]
    pub theme_color: String,

    pub social_links: SocialLinks,

    pub star_icon: String,
    pub verified_icon: String,
}

impl Default for SettingsUpdate {
    fn default() -> Self {
        Self {
            username: None,
            profile_image_url: String::new(),
            banner_image_url: String::new(),
            music_url: String::new(),
            music_file: String::new(),
            bio: String::new(),
            tags: Vec::new(),
            theme_color: "#8B5CF6".to_string(),
            social_links: SocialLinks::default(),
            star_icon: "☆".to_string(),
            verified_icon: String::new(),
        }
    }
}

/// Public view of a profile, keyed by username. Omits the owner id.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicProfile {
    pub profile_id: i64,
    pub username: Option<String>,
    pub profile_image_url: String,
    pub banner_image_url: String,
    pub music_url: String,
    pub music_file: String,
    pub bio: String,
    pub tags: Vec<Tag>,
    pub theme_color: String,
    pub social_links: SocialLinks,
    pub star_icon: String,
    pub verified_icon: String,
}

impl From<ProfileSettings> for PublicProfile {
    fn from(settings: ProfileSettings) -> Self {
        Self {
            profile_id: settings.profile_id,
            username: settings.username,
            profile_image_url: settings.profile_image_url,
            banner_image_url: settings.banner_image_url,
            music_url: settings.music_url,
            music_file: settings.music_file,
            bio: settings.bio,
            tags: settings.tags,
            theme_color: settings.theme_color,
            social_links: settings.social_links,
            star_icon: settings.star_icon,
            verified_icon: settings.verified_icon,
        }
    }
}

/// Username availability probe result
#[derive(Debug, Serialize, ToSchema)]
pub struct UsernameCheck {
    pub username: String,
    pub available: bool,
}
