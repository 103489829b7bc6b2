//! Event aggregation — the shared pipeline in front of every processor.
//!
//! Groups a batch's change-events by entity, deduplicates re-delivered
//! events, runs the attribute differ, and produces the neutral [`BatchView`]
//! that processor strategies render from. Input order is correctness-
//! critical: first-seen order drives entity ordering, dedup, and the choice
//! of representative event.

use std::collections::{HashMap, HashSet};

use crate::differ::diff_attributes;
use crate::translate::{
    common_token, entity_key, model_label, Translator, KEY_COMMON_SYSTEM, KEY_COMMON_UNKNOWN,
};
use crate::types::{BatchResult, ChangeEvent, EntityChanges, ACTION_MODIFIED};

/// Neutral, in-memory view of one batch: everything a processor strategy
/// needs to render a [`BatchResult`](crate::types::BatchResult).
#[derive(Debug, Clone)]
pub struct BatchView {
    pub batch_id: Option<String>,
    /// First-seen entity order, preserved from the input.
    pub entities: Vec<EntityChanges>,
    /// Single shared event kind, or `"modified"` when mixed.
    pub common_action: String,
    pub actor_name: String,
    /// First event in store order; carries shared context.
    pub representative: Option<ChangeEvent>,
}

impl BatchView {
    /// Skeleton result with the shared fields filled in; strategies set the
    /// message and any per-kind metadata.
    pub fn base_result(&self) -> BatchResult {
        BatchResult {
            batch_id: self.batch_id.clone(),
            message: String::new(),
            actor_name: self.actor_name.clone(),
            action: self.common_action.clone(),
            entities: self.entities.clone(),
            stats: None,
            created_at: self.representative.as_ref().map(|e| e.created_at),
        }
    }
}

/// The single event kind shared by all events, or `"modified"` when kinds
/// are mixed (also for empty input — there is nothing more specific to say).
pub fn common_action(events: &[ChangeEvent]) -> String {
    let mut kinds = events.iter().map(|e| e.event_kind.as_str());
    match kinds.next() {
        Some(first) if kinds.all(|k| k == first) => first.to_string(),
        _ => ACTION_MODIFIED.to_string(),
    }
}

/// Display name for the batch's actor, derived from the representative
/// event. Absent actor means a system-initiated change; an actor type
/// recorded without an id renders as the unknown token.
pub fn actor_name(representative: Option<&ChangeEvent>, tr: &dyn Translator) -> String {
    let Some(event) = representative else {
        return common_token(tr, KEY_COMMON_SYSTEM, "System");
    };
    match (event.actor_type.as_deref(), event.actor_id.as_deref()) {
        (Some(actor_type), Some(actor_id)) => {
            format!("{} #{}", model_label(tr, &entity_key(actor_type)), actor_id)
        }
        (Some(_), None) => common_token(tr, KEY_COMMON_UNKNOWN, "Unknown"),
        _ => common_token(tr, KEY_COMMON_SYSTEM, "System"),
    }
}

/// Group events by `(entity_type, entity_id)` preserving first-seen order.
///
/// Within a group, `(entity_type, entity_id, event_kind)` triples are
/// deduplicated — only the first occurrence contributes diffs, which makes
/// aggregation idempotent under re-delivered log rows. Diffs from multiple
/// retained events for one entity are additive.
pub fn aggregate_events(events: &[ChangeEvent], tr: &dyn Translator) -> Vec<EntityChanges> {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut buckets: HashMap<(String, String), Bucket> = HashMap::new();
    let mut seen: HashSet<(String, String, String)> = HashSet::new();

    for event in events {
        let group = (event.entity_type.clone(), event.entity_id.clone());
        let triple = (
            event.entity_type.clone(),
            event.entity_id.clone(),
            event.event_kind.clone(),
        );

        let bucket = buckets.entry(group.clone()).or_insert_with(|| {
            order.push(group.clone());
            let key = entity_key(&event.entity_type);
            Bucket {
                entity: EntityChanges {
                    entity_type: event.entity_type.clone(),
                    entity_id: event.entity_id.clone(),
                    type_label: model_label(tr, &key),
                    action: String::new(),
                    changes: Vec::new(),
                },
                entity_key: key,
                kinds: Vec::new(),
            }
        });

        if !seen.insert(triple) {
            continue;
        }

        bucket.kinds.push(event.event_kind.clone());
        bucket.entity.changes.extend(diff_attributes(
            &event.attributes_before,
            &event.attributes_after,
            &bucket.entity_key,
            tr,
        ));
    }

    order
        .into_iter()
        .map(|group| {
            let mut bucket = buckets.remove(&group).expect("bucket exists for ordered group");
            bucket.entity.action = entity_action(&bucket.kinds);
            bucket.entity
        })
        .collect()
}

/// Build the neutral batch view: aggregate + common action + actor.
pub fn build_view(events: &[ChangeEvent], tr: &dyn Translator) -> BatchView {
    let representative = events.first().cloned();
    BatchView {
        batch_id: representative.as_ref().and_then(|e| e.batch_id.clone()),
        entities: aggregate_events(events, tr),
        common_action: common_action(events),
        actor_name: actor_name(representative.as_ref(), tr),
        representative,
    }
}

struct Bucket {
    entity: EntityChanges,
    entity_key: String,
    kinds: Vec<String>,
}

fn entity_action(kinds: &[String]) -> String {
    match kinds.first() {
        Some(first) if kinds.iter().all(|k| k == first) => first.clone(),
        _ => ACTION_MODIFIED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::translate::MapTranslator;
    use crate::types::AttributeMap;

    fn attrs(value: serde_json::Value) -> AttributeMap {
        value.as_object().cloned().unwrap()
    }

    fn make_event(
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
            actor_type: None,
            actor_id: None,
            attributes_before: attrs(before),
            attributes_after: attrs(after),
            batch_id: Some("b-1".into()),
            context_metadata: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, id as u32).unwrap(),
        }
    }

    #[test]
    fn entity_order_is_first_seen() {
        let tr = MapTranslator::new();
        let events = vec![
            make_event(1, "post", "2", "updated", json!({}), json!({"a": 1})),
            make_event(2, "user", "1", "updated", json!({}), json!({"b": 1})),
            make_event(3, "post", "2", "approved", json!({}), json!({"c": 1})),
        ];
        let entities = aggregate_events(&events, &tr);
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].entity_type, "post");
        assert_eq!(entities[1].entity_type, "user");
    }

    #[test]
    fn duplicate_triples_contribute_once() {
        let tr = MapTranslator::new();
        let events = vec![
            make_event(1, "post", "2", "updated", json!({"a": 0}), json!({"a": 1})),
            // Re-delivered row: same entity + kind, would double the diff.
            make_event(2, "post", "2", "updated", json!({"a": 1}), json!({"a": 2})),
        ];
        let entities = aggregate_events(&events, &tr);
        assert_eq!(entities[0].changes.len(), 1);
        assert_eq!(entities[0].changes[0].new, json!(1));
    }

    #[test]
    fn distinct_kinds_for_one_entity_are_additive() {
        let tr = MapTranslator::new();
        let events = vec![
            make_event(1, "post", "2", "created", json!({}), json!({"title": "x"})),
            make_event(2, "post", "2", "updated", json!({"title": "x"}), json!({"title": "y"})),
        ];
        let entities = aggregate_events(&events, &tr);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].changes.len(), 2);
        assert_eq!(entities[0].action, ACTION_MODIFIED);
    }

    #[test]
    fn entities_without_changes_are_retained() {
        let tr = MapTranslator::new();
        let events = vec![make_event(1, "comment", "9", "deleted", json!({}), json!({}))];
        let entities = aggregate_events(&events, &tr);
        assert_eq!(entities.len(), 1);
        assert!(entities[0].changes.is_empty());
        assert_eq!(entities[0].action, "deleted");
    }

    #[test]
    fn common_action_uniform_and_mixed() {
        let uniform = vec![
            make_event(1, "post", "1", "updated", json!({}), json!({})),
            make_event(2, "user", "2", "updated", json!({}), json!({})),
        ];
        assert_eq!(common_action(&uniform), "updated");

        let mixed = vec![
            make_event(1, "user", "1", "created", json!({}), json!({})),
            make_event(2, "post", "1", "updated", json!({}), json!({})),
            make_event(3, "comment", "1", "deleted", json!({}), json!({})),
        ];
        assert_eq!(common_action(&mixed), ACTION_MODIFIED);
        assert_eq!(common_action(&[]), ACTION_MODIFIED);
    }

    #[test]
    fn mixed_batch_view_tags_each_entity() {
        let tr = MapTranslator::new();
        let events = vec![
            make_event(1, "user", "1", "created", json!({}), json!({"name": "Alice"})),
            make_event(
                2,
                "post",
                "1",
                "updated",
                json!({"status": "pending"}),
                json!({"status": "approved"}),
            ),
            make_event(3, "comment", "1", "deleted", json!({}), json!({})),
        ];
        let view = build_view(&events, &tr);
        assert_eq!(view.common_action, ACTION_MODIFIED);
        assert_eq!(view.entities.len(), 3);
        let actions: Vec<&str> = view.entities.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, vec!["created", "updated", "deleted"]);
        assert_eq!(view.representative.as_ref().unwrap().id, 1);
        assert_eq!(view.batch_id.as_deref(), Some("b-1"));
    }

    #[test]
    fn actor_name_defaults_to_system_token() {
        let tr = MapTranslator::new().with("activities.common.system", "System");
        let event = make_event(1, "post", "1", "updated", json!({}), json!({}));
        assert_eq!(actor_name(Some(&event), &tr), "System");
        assert_eq!(actor_name(None, &tr), "System");
    }

    #[test]
    fn actor_name_uses_model_label_and_id() {
        let tr = MapTranslator::new().with("activities.models.user", "User");
        let mut event = make_event(1, "post", "1", "updated", json!({}), json!({}));
        event.actor_type = Some("user".into());
        event.actor_id = Some("7".into());
        assert_eq!(actor_name(Some(&event), &tr), "User #7");
    }

    #[test]
    fn actor_type_without_id_is_unknown() {
        let tr = MapTranslator::new().with("activities.common.unknown", "Somebody");
        let mut event = make_event(1, "post", "1", "updated", json!({}), json!({}));
        event.actor_type = Some("user".into());
        assert_eq!(actor_name(Some(&event), &tr), "Somebody");

        // Literal fallback when the token is untranslated.
        assert_eq!(actor_name(Some(&event), &MapTranslator::new()), "Unknown");
    }
}
