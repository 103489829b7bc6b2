//! Strategy for update batches.

use crate::aggregate::BatchView;
use crate::config::PROCESSOR_UPDATED;
use crate::translate::Translator;
use crate::types::{BatchResult, ChangeStats};

use super::{display_value, is_housekeeping, Processor};

/// Builds a status-first sentence (`"Rent Request #42 has been Approved"`)
/// followed by a comma-joined summary of the remaining changes, and attaches
/// aggregate change statistics.
#[derive(Debug, Default)]
pub struct UpdatedProcessor;

impl Processor for UpdatedProcessor {
    fn id(&self) -> &'static str {
        PROCESSOR_UPDATED
    }

    fn process(&self, view: &BatchView, _tr: &dyn Translator) -> BatchResult {
        let mut result = view.base_result();
        result.message = construct_message(view);
        result.stats = Some(change_stats(view));
        result
    }
}

fn construct_message(view: &BatchView) -> String {
    let Some(first) = view.entities.first() else {
        return "No entities updated".to_string();
    };

    let mut parts: Vec<String> = vec![format!("{} #{}", first.type_label, first.entity_id)];

    // Status transition leads the sentence; only the first one is surfaced.
    let status_change = view
        .entities
        .iter()
        .flat_map(|e| e.changes.iter())
        .find(|c| c.key == "status");
    if let Some(change) = status_change {
        parts.push("has been".to_string());
        parts.push(display_value(&change.new));
    }

    let other: Vec<String> = view
        .entities
        .iter()
        .flat_map(|e| e.changes.iter())
        .filter(|c| c.key != "status" && !is_housekeeping(&c.key))
        .map(|c| format!("{} to {}", c.label, display_value(&c.new)))
        .collect();
    if !other.is_empty() {
        parts.push("with".to_string());
        parts.push(other.join(", "));
    }

    parts.join(" ")
}

fn change_stats(view: &BatchView) -> ChangeStats {
    let mut stats = ChangeStats::default();
    for change in view.entities.iter().flat_map(|e| e.changes.iter()) {
        stats.total_changes += 1;
        if !stats.changed_fields.iter().any(|f| f == &change.key) {
            stats.changed_fields.push(change.key.clone());
        }
        if change.key == "status" {
            stats.status_changed = true;
        }
    }
    stats
}
