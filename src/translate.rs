//! Translation port and fallback chains.
//!
//! The core never owns translation strings — it consumes a key→string
//! resolver through the [`Translator`] trait and degrades to literal
//! fallbacks when a key is missing. Keys are dotted namespaces under
//! `activities.` (plus the `validation.attributes.` compatibility prefix
//! for attribute labels).

use std::collections::HashMap;

// ── Key namespaces ────────────────────────────────────────────

pub const KEY_BATCH_MESSAGE: &str = "activities.batch_message";
pub const KEY_COMMON_SYSTEM: &str = "activities.common.system";
pub const KEY_COMMON_UNKNOWN: &str = "activities.common.unknown";
pub const KEY_COMMON_NULL: &str = "activities.common.null";
pub const KEY_COMMON_TRUE: &str = "activities.common.true";
pub const KEY_COMMON_FALSE: &str = "activities.common.false";

// ── Port ──────────────────────────────────────────────────────

/// Key→string resolver. `get` applies `:name` parameter substitution and
/// returns `None` for unknown keys; the caller picks the fallback.
pub trait Translator: Send + Sync {
    fn has(&self, key: &str) -> bool;
    fn get(&self, key: &str, params: &[(&str, String)]) -> Option<String>;
}

/// Substitute `:name` placeholders in a template. Longer names are replaced
/// first so `:entity_id` never collides with `:entity`.
pub fn substitute(template: &str, params: &[(&str, String)]) -> String {
    let mut ordered: Vec<&(&str, String)> = params.iter().collect();
    ordered.sort_by_key(|(name, _)| std::cmp::Reverse(name.len()));

    let mut out = template.to_string();
    for (name, value) in ordered {
        out = out.replace(&format!(":{name}"), value);
    }
    out
}

/// Map-backed [`Translator`] for tests, demos, and hosts that load their
/// translation table into memory.
#[derive(Debug, Clone, Default)]
pub struct MapTranslator {
    entries: HashMap<String, String>,
}

impl MapTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl Translator for MapTranslator {
    fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn get(&self, key: &str, params: &[(&str, String)]) -> Option<String> {
        self.entries
            .get(key)
            .map(|template| substitute(template, params))
    }
}

// ── Fallback chains ───────────────────────────────────────────

/// `snake_case` → `Title Case With Spaces`.
pub fn humanize(key: &str) -> String {
    key.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize an entity type tag into a translation key segment:
/// strips any `::` path prefix and converts CamelCase to snake_case.
/// Tags that are already snake_case pass through unchanged.
pub fn entity_key(tag: &str) -> String {
    let base = tag.rsplit("::").next().unwrap_or(tag);
    let mut out = String::with_capacity(base.len());
    for (i, ch) in base.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Attribute label: model-scoped key, then the validation-style generic key,
/// then the humanized attribute name.
pub fn attribute_label(tr: &dyn Translator, entity_key: &str, attribute: &str) -> String {
    let scoped = format!("activities.attributes.{entity_key}.{attribute}");
    if let Some(label) = tr.get(&scoped, &[]) {
        return label;
    }
    let generic = format!("validation.attributes.{attribute}");
    if let Some(label) = tr.get(&generic, &[]) {
        return label;
    }
    humanize(attribute)
}

/// Entity type label: `activities.models.<entity_key>`, else the bare tag.
pub fn model_label(tr: &dyn Translator, entity_key: &str) -> String {
    tr.get(&format!("activities.models.{entity_key}"), &[])
        .unwrap_or_else(|| entity_key.to_string())
}

/// Action label: `activities.actions.<action>`, else the untranslated kind.
pub fn action_label(tr: &dyn Translator, action: &str) -> String {
    tr.get(&format!("activities.actions.{action}"), &[])
        .unwrap_or_else(|| action.to_string())
}

/// Common token with a literal fallback (`System`, `None`, `Yes`, `No`).
pub fn common_token(tr: &dyn Translator, key: &str, fallback: &str) -> String {
    tr.get(key, &[]).unwrap_or_else(|| fallback.to_string())
}
