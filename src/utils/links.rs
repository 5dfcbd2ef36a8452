use serde::{Deserialize, Serialize};

/// Supported social platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Tiktok,
    Discord,
    Spotify,
}

const KNOWN_DOMAINS: [&str; 4] = [
    "instagram.com",
    "tiktok.com",
    "discord.gg",
    "open.spotify.com",
];

fn strip_scheme(input: &str) -> &str {
    input
        .strip_prefix("https://")
        .or_else(|| input.strip_prefix("http://"))
        .unwrap_or(input)
}

/// Turns a raw handle or URL fragment into a canonical social URL.
///
/// Already-canonical URLs pass through untouched (gaining `https://` if
/// given as a bare domain). Otherwise the input is treated as a handle:
/// scheme and leading `@` are stripped and the platform template applied,
/// unless the input already contains the platform's domain, in which case
/// only the scheme is prepended.
pub fn format_link(raw: &str, platform: Option<Platform>) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    let no_scheme = strip_scheme(raw);
    let no_www = no_scheme.strip_prefix("www.").unwrap_or(no_scheme);
    if KNOWN_DOMAINS.iter().any(|d| no_www.starts_with(d)) {
        return if raw.starts_with("http://") || raw.starts_with("https://") {
            raw.to_string()
        } else {
            format!("https://{raw}")
        };
    }

    let cleaned = no_scheme.trim();
    let handle = cleaned.strip_prefix('@').unwrap_or(cleaned);

    match platform {
        Some(Platform::Instagram) => {
            if cleaned.contains("instagram.com") {
                format!("https://{cleaned}")
            } else {
                format!("https://www.instagram.com/{handle}")
            }
        }
        Some(Platform::Tiktok) => {
            if cleaned.contains("tiktok.com") {
                format!("https://{cleaned}")
            } else {
                format!("https://www.tiktok.com/@{handle}")
            }
        }
        Some(Platform::Discord) => {
            if cleaned.contains("discord") {
                format!("https://{cleaned}")
            } else {
                // Bare input is treated as an invite code
                format!("https://discord.gg/{handle}")
            }
        }
        Some(Platform::Spotify) => {
            if cleaned.contains("spotify") {
                format!("https://{cleaned}")
            } else {
                format!("https://open.spotify.com/user/{handle}")
            }
        }
        None => format!("https://{cleaned}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(format_link("", Some(Platform::Instagram)), "");
        assert_eq!(format_link("   ", Some(Platform::Tiktok)), "");
    }

    #[test]
    fn bare_handle_gets_platform_template() {
        assert_eq!(
            format_link("duxs", Some(Platform::Instagram)),
            "https://www.instagram.com/duxs"
        );
        assert_eq!(
            format_link("duxs", Some(Platform::Spotify)),
            "https://open.spotify.com/user/duxs"
        );
    }

    #[test]
    fn leading_at_is_stripped() {
        assert_eq!(
            format_link("@duxs", Some(Platform::Tiktok)),
            "https://www.tiktok.com/@duxs"
        );
        assert_eq!(
            format_link("@duxs", Some(Platform::Instagram)),
            "https://www.instagram.com/duxs"
        );
    }

    #[test]
    fn canonical_url_passes_through() {
        assert_eq!(
            format_link("https://discord.gg/abc123", Some(Platform::Discord)),
            "https://discord.gg/abc123"
        );
        assert_eq!(
            format_link("https://www.instagram.com/duxs", Some(Platform::Instagram)),
            "https://www.instagram.com/duxs"
        );
    }

    #[test]
    fn bare_domain_gains_https() {
        assert_eq!(
            format_link("instagram.com/duxs", Some(Platform::Instagram)),
            "https://instagram.com/duxs"
        );
        assert_eq!(
            format_link("www.tiktok.com/@duxs", Some(Platform::Tiktok)),
            "https://www.tiktok.com/@duxs"
        );
    }

    #[test]
    fn http_scheme_is_preserved_for_known_domains() {
        assert_eq!(
            format_link("http://instagram.com/duxs", Some(Platform::Instagram)),
            "http://instagram.com/duxs"
        );
    }

    #[test]
    fn discord_invite_code() {
        assert_eq!(
            format_link("abc123", Some(Platform::Discord)),
            "https://discord.gg/abc123"
        );
    }

    #[test]
    fn no_platform_prepends_scheme_only() {
        assert_eq!(format_link("example.com/me", None), "https://example.com/me");
        assert_eq!(
            format_link("https://example.com/me", None),
            "https://example.com/me"
        );
    }
}
