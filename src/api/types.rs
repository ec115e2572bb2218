use serde::Serialize;
use serde_json::Value;

// ============================================================================
// Story
// ============================================================================

/// A single impact story as served by the remote API.
///
/// Stories are externally supplied and never constructed by this crate
/// outside of tests. The `id` is opaque and stable; it is the only field
/// the application keys on.
#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    pub id: String,
    pub title: String,
    pub category: String,
    pub summary: String,
    pub description: String,
    pub image_url: String,
    pub is_featured: bool,
    pub likes: u64,
}

impl Story {
    /// Decode a single story from a JSON value, tolerating partial records.
    ///
    /// Returns `None` when the value is not an object or has no usable id.
    /// Missing or null text fields coerce to empty strings, `likes` to 0,
    /// `isFeatured` to false — the API occasionally omits optional fields
    /// and a half-filled record is still renderable.
    pub fn from_value(value: &Value) -> Option<Story> {
        let obj = value.as_object()?;
        let id = id_from_value(obj.get("id")?)?;

        Some(Story {
            id,
            title: text_field(obj, "title"),
            category: text_field(obj, "category"),
            summary: text_field(obj, "summary"),
            description: text_field(obj, "description"),
            image_url: text_field(obj, "imageUrl"),
            is_featured: obj
                .get("isFeatured")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            likes: obj.get("likes").and_then(Value::as_u64).unwrap_or(0),
        })
    }
}

/// Decode a stories payload leniently.
///
/// A non-array payload decodes to an empty list. Elements that are not
/// objects, or that carry no usable id, are dropped with a debug log —
/// one malformed record must never take down the whole list.
pub fn stories_from_value(value: &Value) -> Vec<Story> {
    let Some(items) = value.as_array() else {
        tracing::debug!(got = value_kind(value), "Stories payload is not an array");
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            let story = Story::from_value(item);
            if story.is_none() {
                tracing::debug!(index = idx, "Dropping malformed story record");
            }
            story
        })
        .collect()
}

/// Story ids are opaque strings, but the API is free to serve them as JSON
/// numbers. Accept both; reject anything else (and empty strings).
fn id_from_value(value: &Value) -> Option<String> {
    let id = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if id.trim().is_empty() {
        return None;
    }
    Some(id)
}

/// Coerce a text field to a string, treating missing/null as empty.
fn text_field(obj: &serde_json::Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Story Draft
// ============================================================================

/// Body for `POST /stories` — a new story submission.
///
/// Only `title` is required by the API; the rest default to empty and the
/// server fills in id, likes, and anything else it owns.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryDraft {
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl StoryDraft {
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
