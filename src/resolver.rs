//! Processor resolution — layered lookup from event context to strategy.
//!
//! Resolution order (first match wins):
//! 1. explicit event-kind override
//! 2. route name — exact, then `*` glob patterns in declared order
//! 3. `Controller@action`
//! 4. built-in standard-event strategy (created / updated / deleted)
//! 5. configured default
//!
//! Strategies are registered up front under string ids — no late-bound
//! class-name lookups. A configured id that names no registered strategy is
//! logged and the chain falls through; it never surfaces from `resolve`.
//! Resolved bindings are cached per full event context until `clear_cache`,
//! so a cached entry is only reused where the chain would resolve the same.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::config::AuditConfig;
use crate::error::AuditError;
use crate::processors::{
    BatchProcessor, CreatedProcessor, DeletedProcessor, Processor, UpdatedProcessor,
};
use crate::types::{ActionKind, ChangeEvent};

pub struct ProcessorRegistry {
    config: AuditConfig,
    strategies: HashMap<String, Arc<dyn Processor>>,
    /// Full context signature (`"updated|user.index|-|updated"`) → strategy
    /// id. Unbounded; cleared only explicitly.
    cache: RwLock<HashMap<String, String>>,
}

impl ProcessorRegistry {
    /// Registry with the four built-in strategies pre-registered.
    pub fn new(config: AuditConfig) -> Self {
        let mut registry = Self {
            config,
            strategies: HashMap::new(),
            cache: RwLock::new(HashMap::new()),
        };
        registry.register(Arc::new(BatchProcessor));
        registry.register(Arc::new(CreatedProcessor));
        registry.register(Arc::new(UpdatedProcessor));
        registry.register(Arc::new(DeletedProcessor));
        registry
    }

    /// Register (or replace) a strategy under its own id.
    pub fn register(&mut self, processor: Arc<dyn Processor>) {
        self.strategies.insert(processor.id().to_string(), processor);
    }

    /// Startup check: every processor id named in configuration must be
    /// registered. `resolve` degrades gracefully regardless; this lets a
    /// host fail fast instead.
    pub fn validate(&self) -> Result<(), AuditError> {
        let configured = std::iter::once(&self.config.default_processor)
            .chain(self.config.overrides.values())
            .chain(self.config.route_processors.iter().map(|b| &b.processor))
            .chain(self.config.controller_processors.values());

        let mut unknown: Vec<&str> = configured
            .filter(|id| !self.strategies.contains_key(id.as_str()))
            .map(String::as_str)
            .collect();
        unknown.sort_unstable();
        unknown.dedup();

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(AuditError::Configuration(format!(
                "unknown processor id(s): {}",
                unknown.join(", ")
            )))
        }
    }

    pub fn clear_cache(&self) {
        self.cache.write().expect("resolution cache poisoned").clear();
    }

    /// Resolve the strategy for a batch, represented by its first event.
    /// Never fails: empty input and unknown configuration both land on the
    /// default strategy.
    pub fn resolve(&self, representative: Option<&ChangeEvent>) -> Arc<dyn Processor> {
        let Some(event) = representative else {
            return self.default_strategy();
        };

        let override_key = self.override_key(event);
        let route = event.route_name().map(str::to_string);
        let controller_action = event.controller_action();

        // The key spans every input the chain below consults, so a cached
        // binding never masks a higher-precedence step that a different
        // context would have matched.
        let cache_key = format!(
            "{override_key}|{}|{}|{}",
            route.as_deref().unwrap_or("-"),
            controller_action.as_deref().unwrap_or("-"),
            event.event_kind,
        );

        {
            let cache = self.cache.read().expect("resolution cache poisoned");
            if let Some(strategy) = cache.get(&cache_key).and_then(|id| self.strategies.get(id)) {
                debug!(key = %cache_key, id = strategy.id(), "processor resolved from cache");
                return strategy.clone();
            }
        }

        // 1. Explicit override.
        if let Some(id) = self.config.overrides.get(&override_key) {
            if let Some(strategy) = self.lookup(id, "override") {
                return self.remember(cache_key, strategy);
            }
        }

        // 2. Route name — exact match, then declared-order glob patterns.
        if let Some(route) = &route {
            let binding = self
                .config
                .route_processors
                .iter()
                .find(|b| &b.pattern == route)
                .or_else(|| {
                    self.config
                        .route_processors
                        .iter()
                        .find(|b| wildcard_match(&b.pattern, route))
                });
            if let Some(binding) = binding {
                if let Some(strategy) = self.lookup(&binding.processor, "route") {
                    return self.remember(cache_key, strategy);
                }
            }
        }

        // 3. Controller@action.
        if let Some(ca) = &controller_action {
            if let Some(id) = self.config.controller_processors.get(ca) {
                if let Some(strategy) = self.lookup(id, "controller") {
                    return self.remember(cache_key, strategy);
                }
            }
        }

        // 4. Standard event kinds map to built-ins.
        if let Some(kind) = ActionKind::from_str(&event.event_kind).filter(ActionKind::is_standard)
        {
            if let Some(strategy) = self.strategies.get(kind.as_str()) {
                return self.remember(cache_key, strategy.clone());
            }
        }

        // 5. Default.
        let strategy = self.default_strategy();
        self.remember(cache_key, strategy)
    }

    pub fn default_strategy(&self) -> Arc<dyn Processor> {
        self.strategies
            .get(&self.config.default_processor)
            .or_else(|| self.strategies.get(crate::config::PROCESSOR_BATCH))
            .expect("built-in batch strategy is always registered")
            .clone()
    }

    fn override_key(&self, event: &ChangeEvent) -> String {
        use crate::config::OverrideKeyStyle::*;
        match self.config.override_key {
            EventKind => event.event_kind.clone(),
            EntityAndEventKind => format!("{}.{}", event.entity_type, event.event_kind),
        }
    }

    /// Look up a configured strategy id; a miss is a configuration problem
    /// that degrades to the next resolution step.
    fn lookup(&self, id: &str, step: &str) -> Option<Arc<dyn Processor>> {
        match self.strategies.get(id) {
            Some(strategy) => Some(strategy.clone()),
            None => {
                warn!(id, step, "configured processor is not registered; falling through");
                None
            }
        }
    }

    fn remember(&self, key: String, strategy: Arc<dyn Processor>) -> Arc<dyn Processor> {
        debug!(key = %key, id = strategy.id(), "processor resolved");
        self.cache
            .write()
            .expect("resolution cache poisoned")
            .insert(key, strategy.id().to_string());
        strategy
    }

    #[cfg(test)]
    fn cached_binding(&self, key: &str) -> Option<String> {
        self.cache.read().unwrap().get(key).cloned()
    }
}

/// `*`-wildcard match, anchored at both ends. Literal segments must appear
/// left to right; `*` spans any run of characters, including none.
pub(crate) fn wildcard_match(pattern: &str, value: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == value;
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    let last = parts.len() - 1;
    let mut pos = 0;

    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            if !value.starts_with(part) {
                return false;
            }
            pos = part.len();
        } else if i == last {
            return value.len() >= pos + part.len() && value[pos..].ends_with(part);
        } else {
            match value[pos..].find(part) {
                Some(idx) => pos += idx + part.len(),
                None => return false,
            }
        }
    }
    true
}
