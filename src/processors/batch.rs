//! Generic batch strategy — the configured default.

use crate::aggregate::BatchView;
use crate::config::PROCESSOR_BATCH;
use crate::translate::{action_label, Translator, KEY_BATCH_MESSAGE};
use crate::types::BatchResult;

use super::Processor;

/// Renders `":actor :action #:count entities"` and includes every entity,
/// whether or not it carries attribute changes.
#[derive(Debug, Default)]
pub struct BatchProcessor;

impl Processor for BatchProcessor {
    fn id(&self) -> &'static str {
        PROCESSOR_BATCH
    }

    fn process(&self, view: &BatchView, tr: &dyn Translator) -> BatchResult {
        let mut result = view.base_result();
        let action = action_label(tr, &view.common_action);
        let count = view.entities.len();
        let params = [
            ("actor", view.actor_name.clone()),
            ("action", action.clone()),
            ("count", count.to_string()),
        ];
        result.message = tr
            .get(KEY_BATCH_MESSAGE, &params)
            .unwrap_or_else(|| format!("{} {} #{} entities", view.actor_name, action, count));
        result
    }
}
