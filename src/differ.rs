//! Attribute diffing with value normalization and translated labels.
//!
//! Pure function of its inputs plus the Translator collaborator. Only keys
//! present in the `after` snapshot are examined — the store records exactly
//! the attributes it intends to track.

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

use crate::translate::{
    attribute_label, common_token, Translator, KEY_COMMON_FALSE, KEY_COMMON_NULL, KEY_COMMON_TRUE,
};
use crate::types::{AttributeChange, AttributeMap};

/// Fixed display format for date/time values.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a raw snapshot value for display.
///
/// - `null` → localized "none" token
/// - booleans → localized yes/no tokens
/// - arrays/objects → compact canonical JSON (map keys are already sorted)
/// - date/time strings → `YYYY-MM-DD HH:MM:SS`
/// - everything else passes through unchanged
pub fn normalize_value(value: &Value, tr: &dyn Translator) -> Value {
    match value {
        Value::Null => Value::String(common_token(tr, KEY_COMMON_NULL, "None")),
        Value::Bool(true) => Value::String(common_token(tr, KEY_COMMON_TRUE, "Yes")),
        Value::Bool(false) => Value::String(common_token(tr, KEY_COMMON_FALSE, "No")),
        Value::Array(_) | Value::Object(_) => {
            // serde_json keeps object keys sorted, so this is a stable
            // canonical rendering.
            Value::String(serde_json::to_string(value).unwrap_or_default())
        }
        Value::String(s) => match reformat_datetime(s) {
            Some(formatted) => Value::String(formatted),
            None => value.clone(),
        },
        _ => value.clone(),
    }
}

/// Reformat an ISO-8601 / RFC 3339 timestamp string. Returns None for
/// anything that does not parse as one — ordinary strings pass untouched.
fn reformat_datetime(s: &str) -> Option<String> {
    // Cheap shape check before parsing: "2024-01-02T..." at minimum.
    if s.len() < 19 || s.as_bytes().get(10) != Some(&b'T') {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc().format(DATETIME_FORMAT).to_string());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.format(DATETIME_FORMAT).to_string());
    }
    None
}

/// Compute per-attribute differences between two snapshots.
///
/// A key counts as changed when it is absent from `before` or its value
/// differs by equality. Output is ordered by attribute key (snapshot maps
/// carry no insertion order). `entity_key` scopes the label lookup.
pub fn diff_attributes(
    before: &AttributeMap,
    after: &AttributeMap,
    entity_key: &str,
    tr: &dyn Translator,
) -> Vec<AttributeChange> {
    let mut changes = Vec::new();

    for (key, new_value) in after {
        let old_value = before.get(key);
        if old_value == Some(new_value) {
            continue;
        }
        changes.push(AttributeChange {
            key: key.clone(),
            label: attribute_label(tr, entity_key, key),
            old: normalize_value(old_value.unwrap_or(&Value::Null), tr),
            new: normalize_value(new_value, tr),
        });
    }

    changes
}
