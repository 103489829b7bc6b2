//! Storage port for the external change-event log.
//! Core logic depends only on this trait — persistence lives elsewhere.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::AuditError;
use crate::types::{BatchMetadata, ChangeEvent, EventQuery};

pub type Result<T> = std::result::Result<T, AuditError>;

/// Durable log of change-events, queried by simple key/value filters.
/// Implementations return events in insertion order — aggregation and
/// representative selection depend on it.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn query(&self, query: &EventQuery) -> Result<Vec<ChangeEvent>>;

    /// Back-fill `batch_id` and metadata onto un-batched events created at
    /// or after `since`. Returns the number of events tagged.
    async fn assign_batch(
        &self,
        batch_id: &str,
        metadata: &BatchMetadata,
        since: DateTime<Utc>,
    ) -> Result<u64>;

    /// Delete the events a discarded batch produced: those already tagged
    /// with `batch_id`, plus un-batched events inside the window that a
    /// commit would have claimed. Returns the number deleted.
    async fn purge_batch(&self, batch_id: &str, since: DateTime<Utc>) -> Result<u64>;
}

// ── In-memory store ───────────────────────────────────────────

/// Vec-backed [`EventStore`] for tests and demos. Insertion order is the
/// query order, like an auto-increment table scan.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: RwLock<Vec<ChangeEvent>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, assigning the next id. Returns the assigned id.
    pub async fn record(&self, mut event: ChangeEvent) -> i64 {
        let mut events = self.events.write().await;
        let id = events.last().map(|e| e.id + 1).unwrap_or(1);
        event.id = id;
        events.push(event);
        id
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

fn matches(event: &ChangeEvent, query: &EventQuery) -> bool {
    fn field(filter: &Option<String>, value: Option<&str>) -> bool {
        match filter {
            Some(wanted) => value == Some(wanted.as_str()),
            None => true,
        }
    }

    field(&query.entity_type, Some(&event.entity_type))
        && field(&query.entity_id, Some(&event.entity_id))
        && field(&query.event_kind, Some(&event.event_kind))
        && field(&query.actor_type, event.actor_type.as_deref())
        && field(&query.actor_id, event.actor_id.as_deref())
        && field(&query.batch_id, event.batch_id.as_deref())
        && query.created_from.map_or(true, |from| event.created_at >= from)
        && query.created_to.map_or(true, |to| event.created_at <= to)
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn query(&self, query: &EventQuery) -> Result<Vec<ChangeEvent>> {
        let events = self.events.read().await;
        Ok(events.iter().filter(|e| matches(e, query)).cloned().collect())
    }

    async fn assign_batch(
        &self,
        batch_id: &str,
        metadata: &BatchMetadata,
        since: DateTime<Utc>,
    ) -> Result<u64> {
        let context = context_from(metadata);
        let mut events = self.events.write().await;
        let mut tagged = 0;
        for event in events.iter_mut() {
            if event.batch_id.is_none() && event.created_at >= since {
                event.batch_id = Some(batch_id.to_string());
                event.context_metadata = Some(context.clone());
                tagged += 1;
            }
        }
        Ok(tagged)
    }

    async fn purge_batch(&self, batch_id: &str, since: DateTime<Utc>) -> Result<u64> {
        let mut events = self.events.write().await;
        let before = events.len();
        events.retain(|event| {
            let tagged = event.batch_id.as_deref() == Some(batch_id);
            let claimable = event.batch_id.is_none() && event.created_at >= since;
            !(tagged || claimable)
        });
        Ok((before - events.len()) as u64)
    }
}

fn context_from(metadata: &BatchMetadata) -> crate::types::ContextMetadata {
    crate::types::ContextMetadata {
        route_name: metadata.route_name.clone(),
        controller: metadata.controller.clone(),
        action: metadata.action.clone(),
        method: None,
        path: None,
    }
}
