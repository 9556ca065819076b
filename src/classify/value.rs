//! Best-effort rendering of arbitrary JSON values.

use crate::classify::Renderable;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::Value as JsonValue;

/// Strings longer than this are shown truncated.
pub const TRUNCATE_AT: usize = 64;

/// Render a single value: structured JSON pretty, long text truncated,
/// everything else verbatim.
pub fn render_value(value: &JsonValue) -> Renderable {
    match value {
        JsonValue::Object(_) | JsonValue::Array(_) => Renderable::Json(value.clone()),
        JsonValue::String(s) => render_text(s),
        JsonValue::Null => Renderable::Text("null".to_string()),
        other => Renderable::Text(other.to_string()),
    }
}

/// Render a string that may itself hold JSON.
pub fn render_text(s: &str) -> Renderable {
    if let Some(nested) = parse_structured(s) {
        return Renderable::Json(nested);
    }
    if s.chars().count() > TRUNCATE_AT {
        let preview: String = s.chars().take(TRUNCATE_AT).collect();
        return Renderable::Truncated {
            preview,
            full: s.to_string(),
        };
    }
    Renderable::Text(s.to_string())
}

/// Render a base64 `Binary` field, showing the decoded JSON when it is JSON.
pub fn render_binary(encoded: &str) -> Renderable {
    let decoded = STANDARD
        .decode(encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .and_then(|text| parse_structured(&text));

    match decoded {
        Some(json) => Renderable::Json(json),
        None => render_text(encoded),
    }
}

/// List every top-level key of a payload.
pub fn generic_fields(payload: &JsonValue) -> Vec<(String, Renderable)> {
    match payload {
        JsonValue::Object(map) => map
            .iter()
            .map(|(key, value)| (key.clone(), render_value(value)))
            .collect(),
        other => vec![("Message".to_string(), render_value(other))],
    }
}

fn parse_structured(s: &str) -> Option<JsonValue> {
    let trimmed = s.trim_start();
    if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
        return None;
    }
    serde_json::from_str(s).ok()
}
