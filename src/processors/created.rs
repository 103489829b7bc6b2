//! Strategy for creation batches.

use crate::aggregate::BatchView;
use crate::config::PROCESSOR_CREATED;
use crate::translate::{common_token, Translator, KEY_COMMON_NULL};
use crate::types::BatchResult;

use super::{is_housekeeping, Processor, KEY_TEMPLATE_CREATED};

/// Renders `":actor created :entity #:id"` for the first entity and trims
/// each entity's change list down to its initial values — attributes that
/// went from nothing to something, minus housekeeping fields.
#[derive(Debug, Default)]
pub struct CreatedProcessor;

impl Processor for CreatedProcessor {
    fn id(&self) -> &'static str {
        PROCESSOR_CREATED
    }

    fn process(&self, view: &BatchView, tr: &dyn Translator) -> BatchResult {
        let mut result = view.base_result();

        // On a creation diff every `old` is the normalized none token.
        let none_token = common_token(tr, KEY_COMMON_NULL, "None");
        for entity in &mut result.entities {
            entity.changes.retain(|change| {
                change.old.as_str() == Some(none_token.as_str()) && !is_housekeeping(&change.key)
            });
        }

        result.message = match result.entities.first() {
            Some(first) => {
                let params = [
                    ("actor", view.actor_name.clone()),
                    ("entity", first.type_label.clone()),
                    ("id", first.entity_id.clone()),
                ];
                tr.get(KEY_TEMPLATE_CREATED, &params).unwrap_or_else(|| {
                    format!(
                        "{} created {} #{}",
                        view.actor_name, first.type_label, first.entity_id
                    )
                })
            }
            None => String::new(),
        };
        result
    }
}
