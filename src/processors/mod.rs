//! Processor strategies — the rendering step of the pipeline.
//!
//! Each strategy consumes the neutral [`BatchView`] produced by
//! `aggregate::build_view` and only decides how the summary message and
//! per-kind metadata look. The shared diff/aggregate work never lives here.

mod batch;
mod created;
mod deleted;
mod updated;

pub use batch::BatchProcessor;
pub use created::CreatedProcessor;
pub use deleted::DeletedProcessor;
pub use updated::UpdatedProcessor;

use serde_json::Value;

use crate::aggregate::BatchView;
use crate::translate::Translator;
use crate::types::BatchResult;

pub const KEY_TEMPLATE_CREATED: &str = "activities.message_templates.created";
pub const KEY_TEMPLATE_DELETED: &str = "activities.message_templates.deleted";

/// Attributes that are bookkeeping, never part of a human-readable summary.
pub const HOUSEKEEPING_FIELDS: &[&str] = &["id", "created_at", "updated_at"];

/// A rendering policy that turns aggregated entity changes into a
/// human-readable result. Strategies are stateless.
pub trait Processor: Send + Sync {
    /// Stable identifier used by configuration and the resolver cache.
    fn id(&self) -> &'static str;

    fn process(&self, view: &BatchView, tr: &dyn Translator) -> BatchResult;
}

/// Render a normalized snapshot value for inline use in a message.
/// Strings render bare (no JSON quoting); everything else via Display.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn is_housekeeping(key: &str) -> bool {
    HOUSEKEEPING_FIELDS.contains(&key)
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{TimeZone, Utc};

    use crate::types::{AttributeMap, ChangeEvent};

    pub fn attrs(value: serde_json::Value) -> AttributeMap {
        value.as_object().cloned().unwrap()
    }

    pub fn make_event(
        id: i64,
        entity_type: &str,
        entity_id: &str,
        kind: &str,
        before: serde_json::Value,
        after: serde_json::Value,
    ) -> ChangeEvent {
        ChangeEvent {
            id,
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            event_kind: kind.into(),
            actor_type: Some("user".into()),
            actor_id: Some("7".into()),
            attributes_before: attrs(before),
            attributes_after: attrs(after),
            batch_id: Some("b-1".into()),
            context_metadata: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, id as u32).unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn display_value_renders_strings_bare() {
        assert_eq!(display_value(&json!("approved")), "approved");
        assert_eq!(display_value(&json!(42)), "42");
    }

    #[test]
    fn housekeeping_fields_are_recognized() {
        assert!(is_housekeeping("id"));
        assert!(is_housekeeping("updated_at"));
        assert!(!is_housekeeping("status"));
    }
}
