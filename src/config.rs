//! Configuration surface consumed (not owned) by the core.
//!
//! The hosting application deserializes this from whatever config source it
//! uses; the core only reads it. Route bindings are an ordered list, not a
//! map — glob patterns are tried in declared order, first match wins.

use std::collections::HashMap;

use chrono::Duration;
use serde::Deserialize;

use crate::resolver::wildcard_match;

/// Processor id of the built-in generic batch strategy.
pub const PROCESSOR_BATCH: &str = "batch";
pub const PROCESSOR_CREATED: &str = "created";
pub const PROCESSOR_UPDATED: &str = "updated";
pub const PROCESSOR_DELETED: &str = "deleted";

/// How explicit override keys are formed from a representative event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideKeyStyle {
    /// Look up by `event_kind` alone.
    #[default]
    EventKind,
    /// Look up by `"{entity_type}.{event_kind}"`.
    EntityAndEventKind,
}

/// One route → processor binding. Pattern may contain `*` wildcards.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteBinding {
    pub pattern: String,
    pub processor: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Strategy used when nothing else matches.
    pub default_processor: String,
    /// Explicit event-kind overrides, highest precedence.
    pub overrides: HashMap<String, String>,
    pub override_key: OverrideKeyStyle,
    /// Ordered route bindings; exact match is tried before patterns.
    pub route_processors: Vec<RouteBinding>,
    /// `"Controller@action"` → processor id.
    pub controller_processors: HashMap<String, String>,
    /// Bound on the commit-time back-fill scan, in seconds.
    pub lookback_secs: u64,
    /// Whether discarding a batch deletes its events.
    pub delete_on_discard: bool,
    /// Route patterns exempt from batch logging (consumed by the lifecycle
    /// trigger, not the core itself).
    pub excluded_routes: Vec<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            default_processor: PROCESSOR_BATCH.to_string(),
            overrides: HashMap::new(),
            override_key: OverrideKeyStyle::default(),
            route_processors: Vec::new(),
            controller_processors: HashMap::new(),
            lookback_secs: 300,
            delete_on_discard: false,
            excluded_routes: Vec::new(),
        }
    }
}

impl AuditConfig {
    pub fn lookback(&self) -> Duration {
        Duration::seconds(self.lookback_secs as i64)
    }

    pub fn is_route_excluded(&self, route: &str) -> bool {
        self.excluded_routes
            .iter()
            .any(|pattern| pattern == route || wildcard_match(pattern, route))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AuditConfig::default();
        assert_eq!(config.default_processor, PROCESSOR_BATCH);
        assert_eq!(config.lookback_secs, 300);
        assert!(!config.delete_on_discard);
        assert!(config.route_processors.is_empty());
    }

    #[test]
    fn deserializes_with_partial_fields() {
        let config: AuditConfig = serde_json::from_str(
            r#"{
                "overrides": {"approve": "batch"},
                "route_processors": [{"pattern": "rent.*", "processor": "updated"}],
                "delete_on_discard": true
            }"#,
        )
        .unwrap();
        assert_eq!(config.overrides["approve"], "batch");
        assert_eq!(config.route_processors[0].pattern, "rent.*");
        assert!(config.delete_on_discard);
        // Untouched fields keep defaults.
        assert_eq!(config.default_processor, PROCESSOR_BATCH);
        assert_eq!(config.override_key, OverrideKeyStyle::EventKind);
    }

    #[test]
    fn excluded_routes_honor_globs() {
        let config = AuditConfig {
            excluded_routes: vec!["health".into(), "admin.*".into()],
            ..AuditConfig::default()
        };
        assert!(config.is_route_excluded("health"));
        assert!(config.is_route_excluded("admin.users.index"));
        assert!(!config.is_route_excluded("rent.requests.update"));
    }
}
