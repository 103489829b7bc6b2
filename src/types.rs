//! Core domain types for the activity-audit layer.
//! These are pure value types — no sqlx, no DB dependencies.

// `ActionKind` intentionally uses `from_str() -> Option<Self>` instead of
// `FromStr` because it returns None for custom kinds rather than an error.
#![allow(clippy::should_implement_trait)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attribute snapshot: attribute name → recorded value.
/// `serde_json::Map` keeps keys sorted, which gives deterministic diff output.
pub type AttributeMap = serde_json::Map<String, Value>;

// ── Action kinds ──────────────────────────────────────────────

/// Closed set of well-known event kinds.
///
/// `event_kind` on a [`ChangeEvent`] is free-form; this enum only exists so
/// that standard kinds can be matched structurally. Custom kinds stay as
/// plain strings and resolve via configuration. Localized labels are looked
/// up separately (`translate::action_label`) — the kind carries no behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Created,
    Updated,
    Deleted,
    Restored,
    Approved,
    Rejected,
    Canceled,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Restored => "restored",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Canceled => "canceled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "created" => Some(Self::Created),
            "updated" => Some(Self::Updated),
            "deleted" => Some(Self::Deleted),
            "restored" => Some(Self::Restored),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "canceled" => Some(Self::Canceled),
            _ => None,
        }
    }

    /// Kinds that have a dedicated built-in processor strategy.
    pub fn is_standard(&self) -> bool {
        matches!(self, Self::Created | Self::Updated | Self::Deleted)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Synthetic batch action used when events in one batch carry mixed kinds.
pub const ACTION_MODIFIED: &str = "modified";

// ── ChangeEvent ───────────────────────────────────────────────

/// Request-scope context recorded alongside a change, consumed only by the
/// processor resolver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextMetadata {
    #[serde(default)]
    pub route_name: Option<String>,
    #[serde(default)]
    pub controller: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

/// One recorded mutation of an entity, with before/after attribute snapshots.
///
/// Created once by the external store; immutable afterwards except for the
/// `batch_id`/`context_metadata` back-fill performed at commit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Unique, monotonic within the store.
    pub id: i64,
    /// Stable string tag for the entity type (e.g. `"rent_request"`).
    pub entity_type: String,
    pub entity_id: String,
    /// Free-form: `"created"`, `"updated"`, `"deleted"`, or custom.
    pub event_kind: String,
    /// Absent actor means a system-initiated change.
    #[serde(default)]
    pub actor_type: Option<String>,
    #[serde(default)]
    pub actor_id: Option<String>,
    /// Empty for creation events.
    #[serde(default)]
    pub attributes_before: AttributeMap,
    pub attributes_after: AttributeMap,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub context_metadata: Option<ContextMetadata>,
    pub created_at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn route_name(&self) -> Option<&str> {
        self.context_metadata
            .as_ref()
            .and_then(|m| m.route_name.as_deref())
    }

    /// `"Controller@action"` when both parts are present.
    pub fn controller_action(&self) -> Option<String> {
        let meta = self.context_metadata.as_ref()?;
        match (meta.controller.as_deref(), meta.action.as_deref()) {
            (Some(c), Some(a)) => Some(format!("{c}@{a}")),
            _ => None,
        }
    }
}

// ── Query filter ──────────────────────────────────────────────

/// Key/value filter against the external event store. All fields optional;
/// results come back in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventQuery {
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub actor_type: Option<String>,
    #[serde(default)]
    pub actor_id: Option<String>,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub event_kind: Option<String>,
    #[serde(default)]
    pub created_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_to: Option<DateTime<Utc>>,
}

impl EventQuery {
    pub fn for_batch(batch_id: impl Into<String>) -> Self {
        Self {
            batch_id: Some(batch_id.into()),
            ..Self::default()
        }
    }

    pub fn for_entity(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type: Some(entity_type.into()),
            entity_id: Some(entity_id.into()),
            ..Self::default()
        }
    }

    pub fn for_actor(actor_type: impl Into<String>, actor_id: impl Into<String>) -> Self {
        Self {
            actor_type: Some(actor_type.into()),
            actor_id: Some(actor_id.into()),
            ..Self::default()
        }
    }
}

// ── Batch metadata / status ───────────────────────────────────

/// Metadata captured when a batch is started and back-filled at commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchMetadata {
    #[serde(default)]
    pub route_name: Option<String>,
    #[serde(default)]
    pub controller: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    /// Set to `"completed"` by commit.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Lifecycle status of a batch session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BatchStatus {
    Open,
    Committed,
    Discarded,
}

// ── Derived result types ──────────────────────────────────────

/// One attribute-level difference, normalized and labeled for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeChange {
    pub key: String,
    /// Translated attribute label (fallback: humanized key).
    pub label: String,
    pub old: Value,
    pub new: Value,
}

/// Per-(entity_type, entity_id) aggregation within one batch. Built fresh
/// per processing call; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityChanges {
    pub entity_type: String,
    pub entity_id: String,
    /// Translated entity type label (fallback: bare type tag).
    pub type_label: String,
    /// The entity's own event kind, or `"modified"` when its events mix kinds.
    pub action: String,
    pub changes: Vec<AttributeChange>,
}

/// Aggregate change statistics attached by the updated strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeStats {
    pub total_changes: usize,
    /// Distinct changed attribute names, first-seen order.
    pub changed_fields: Vec<String>,
    pub status_changed: bool,
}

/// The sole data handed back across the core's boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub batch_id: Option<String>,
    pub message: String,
    pub actor_name: String,
    pub action: String,
    pub entities: Vec<EntityChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ChangeStats>,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_kind_round_trips() {
        for kind in [
            ActionKind::Created,
            ActionKind::Updated,
            ActionKind::Deleted,
            ActionKind::Restored,
            ActionKind::Approved,
            ActionKind::Rejected,
            ActionKind::Canceled,
        ] {
            assert_eq!(ActionKind::from_str(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn action_kind_unknown_is_none() {
        assert_eq!(ActionKind::from_str("archived"), None);
    }

    #[test]
    fn only_crud_kinds_are_standard() {
        assert!(ActionKind::Created.is_standard());
        assert!(ActionKind::Updated.is_standard());
        assert!(ActionKind::Deleted.is_standard());
        assert!(!ActionKind::Approved.is_standard());
        assert!(!ActionKind::Restored.is_standard());
    }

    #[test]
    fn controller_action_requires_both_parts() {
        let mut event = ChangeEvent {
            id: 1,
            entity_type: "post".into(),
            entity_id: "7".into(),
            event_kind: "updated".into(),
            actor_type: None,
            actor_id: None,
            attributes_before: AttributeMap::new(),
            attributes_after: AttributeMap::new(),
            batch_id: None,
            context_metadata: Some(ContextMetadata {
                controller: Some("PostController".into()),
                ..ContextMetadata::default()
            }),
            created_at: Utc::now(),
        };
        assert_eq!(event.controller_action(), None);

        event.context_metadata.as_mut().unwrap().action = Some("update".into());
        assert_eq!(
            event.controller_action().as_deref(),
            Some("PostController@update")
        );
    }
}
