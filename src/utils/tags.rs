use serde_json::{Value, json};

use crate::models::settings::Tag;

/// Best-effort string form of a JSON value. Strings come back as-is,
/// everything else uses its JSON rendering ("42", "true", "null", objects
/// as their serialized text).
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn field(value: &Value, key: &str) -> Option<Value> {
    match value.get(key) {
        Some(Value::Null) | None => None,
        Some(v) => Some(v.clone()),
    }
}

/// Converts a stored tag in any historical shape (raw string, JSON-encoded
/// string, object with extra fields, bare scalar) into a displayable `Tag`.
///
/// Total: every input yields a tag. Strings that look like JSON are parsed;
/// if the parse fails or the result has no `text` field, the original string
/// becomes the display text rather than an error.
pub fn normalize_tag(input: &Value) -> Tag {
    if let Value::String(raw) = input {
        if raw.starts_with('{') || raw.starts_with('[') {
            if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
                if parsed.is_object() && parsed.get("text").is_some() {
                    return Tag {
                        text: field(&parsed, "text").map(|v| stringify(&v)).unwrap_or_default(),
                        icon: field(&parsed, "icon").map(|v| stringify(&v)).unwrap_or_default(),
                    };
                }
            }
            return Tag {
                text: raw.clone(),
                icon: String::new(),
            };
        }
        return Tag {
            text: raw.clone(),
            icon: String::new(),
        };
    }

    if input.is_object() {
        return Tag {
            text: field(input, "text")
                .map(|v| stringify(&v))
                .unwrap_or_else(|| stringify(input)),
            icon: field(input, "icon").map(|v| stringify(&v)).unwrap_or_default(),
        };
    }

    Tag {
        text: stringify(input),
        icon: String::new(),
    }
}

/// Display text for a tag-like value; agrees with `normalize_tag` on every
/// input.
pub fn display_text(input: &Value) -> String {
    normalize_tag(input).text
}

/// Display icon for a tag-like value; agrees with `normalize_tag` on every
/// input.
pub fn display_icon(input: &Value) -> String {
    normalize_tag(input).icon
}

/// Flattens tags for persistence: every output element is an object with
/// exactly the two string fields `text` and `icon`, with any residual
/// JSON-string encoding collapsed first.
pub fn prepare_for_storage(tags: &[Value]) -> Vec<Value> {
    tags.iter()
        .map(|tag| {
            let tag = normalize_tag(tag);
            json!({ "text": tag.text, "icon": tag.icon })
        })
        .collect()
}
