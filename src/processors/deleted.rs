//! Strategy for deletion batches.

use crate::aggregate::BatchView;
use crate::config::PROCESSOR_DELETED;
use crate::translate::Translator;
use crate::types::BatchResult;

use super::{Processor, KEY_TEMPLATE_DELETED};

/// Renders `":entity #:id has been deleted"` for the first entity. Deleted
/// entities legitimately carry no attribute changes.
#[derive(Debug, Default)]
pub struct DeletedProcessor;

impl Processor for DeletedProcessor {
    fn id(&self) -> &'static str {
        PROCESSOR_DELETED
    }

    fn process(&self, view: &BatchView, tr: &dyn Translator) -> BatchResult {
        let mut result = view.base_result();
        result.message = match view.entities.first() {
            Some(first) => {
                let params = [
                    ("entity", first.type_label.clone()),
                    ("id", first.entity_id.clone()),
                ];
                tr.get(KEY_TEMPLATE_DELETED, &params).unwrap_or_else(|| {
                    format!("{} #{} has been deleted", first.type_label, first.entity_id)
                })
            }
            None => String::new(),
        };
        result
    }
}
