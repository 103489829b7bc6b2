//! ActivityService — the central facade for the audit layer.
//!
//! Takes the store port via `Arc<dyn EventStore>` so that the same logic
//! works against a real log table or the in-memory test double, resolves a
//! processor per batch through the registry, and hands back [`BatchResult`]s.

use std::collections::HashMap;
use std::sync::Arc;

use crate::aggregate::build_view;
use crate::error::AuditError;
use crate::resolver::ProcessorRegistry;
use crate::store::{EventStore, Result};
use crate::translate::Translator;
use crate::types::{BatchResult, ChangeEvent, EventQuery};

pub struct ActivityService {
    store: Arc<dyn EventStore>,
    registry: ProcessorRegistry,
    translator: Arc<dyn Translator>,
}

impl ActivityService {
    pub fn new(
        store: Arc<dyn EventStore>,
        registry: ProcessorRegistry,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            store,
            registry,
            translator,
        }
    }

    pub fn registry(&self) -> &ProcessorRegistry {
        &self.registry
    }

    /// Render one batch of events through its resolved processor.
    pub fn render(&self, events: &[ChangeEvent]) -> BatchResult {
        let view = build_view(events, self.translator.as_ref());
        let processor = self.registry.resolve(events.first());
        processor.process(&view, self.translator.as_ref())
    }

    /// Process the events of one specific batch.
    /// Errors with `InvalidInput` on a blank id and `NotFound` when the
    /// batch id matches nothing.
    pub async fn process_batch(&self, batch_id: &str) -> Result<BatchResult> {
        if batch_id.trim().is_empty() {
            return Err(AuditError::InvalidInput("batch id must not be blank".into()));
        }
        let events = self.store.query(&EventQuery::for_batch(batch_id)).await?;
        if events.is_empty() {
            return Err(AuditError::NotFound(format!("batch {batch_id}")));
        }
        Ok(self.render(&events))
    }

    /// All activity for one entity, one result per batch.
    /// Errors with `NotFound` when the entity has no recorded activity.
    pub async fn entity_activity(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Vec<BatchResult>> {
        let events = self
            .store
            .query(&EventQuery::for_entity(entity_type, entity_id))
            .await?;
        if events.is_empty() {
            return Err(AuditError::NotFound(format!(
                "no activity for {entity_type} #{entity_id}"
            )));
        }
        Ok(self.render_grouped(events))
    }

    /// All activity caused by one actor, one result per batch.
    /// Errors with `NotFound` when the actor has no recorded activity.
    pub async fn actor_activity(
        &self,
        actor_type: &str,
        actor_id: &str,
    ) -> Result<Vec<BatchResult>> {
        let events = self
            .store
            .query(&EventQuery::for_actor(actor_type, actor_id))
            .await?;
        if events.is_empty() {
            return Err(AuditError::NotFound(format!(
                "no activity for {actor_type} #{actor_id}"
            )));
        }
        Ok(self.render_grouped(events))
    }

    /// Open-ended filtered processing. An empty match is a valid, empty
    /// result — never an error.
    pub async fn process_events(&self, query: &EventQuery) -> Result<Vec<BatchResult>> {
        let events = self.store.query(query).await?;
        Ok(self.render_grouped(events))
    }

    fn render_grouped(&self, events: Vec<ChangeEvent>) -> Vec<BatchResult> {
        group_by_batch(events)
            .iter()
            .map(|group| self.render(group))
            .collect()
    }
}

/// Split events into per-batch groups, preserving first-seen batch order.
/// Events without a batch id form one shared group.
fn group_by_batch(events: Vec<ChangeEvent>) -> Vec<Vec<ChangeEvent>> {
    let mut order: Vec<Option<String>> = Vec::new();
    let mut groups: HashMap<Option<String>, Vec<ChangeEvent>> = HashMap::new();

    for event in events {
        let key = event.batch_id.clone();
        let group = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            Vec::new()
        });
        group.push(event);
    }

    order
        .into_iter()
        .map(|key| groups.remove(&key).expect("group exists for ordered key"))
        .collect()
}
