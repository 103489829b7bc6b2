//! Batch lifecycle — start / commit / discard for one unit of work.
//!
//! A [`BatchSession`] is an explicit value owned by one logical unit of work
//! (typically one inbound request). There is no process-wide "current batch"
//! pointer; concurrent units of work each carry their own session.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::config::AuditConfig;
use crate::store::{EventStore, Result};
use crate::types::{BatchMetadata, BatchStatus};

#[derive(Debug, Clone)]
struct OpenBatch {
    id: String,
    started_at: DateTime<Utc>,
    metadata: BatchMetadata,
}

/// State machine: Closed → Open → {Committed, Discarded} → Closed.
/// Starting a batch while one is open silently replaces it — no nesting.
pub struct BatchSession {
    store: Arc<dyn EventStore>,
    config: AuditConfig,
    open: Option<OpenBatch>,
    last_status: Option<BatchStatus>,
}

impl BatchSession {
    pub fn new(store: Arc<dyn EventStore>, config: AuditConfig) -> Self {
        Self {
            store,
            config,
            open: None,
            last_status: None,
        }
    }

    /// Open a batch, generating an opaque id when none is supplied.
    /// Returns the batch id.
    pub fn start_batch(&mut self, id: Option<String>, metadata: BatchMetadata) -> String {
        let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
        if let Some(replaced) = &self.open {
            debug!(replaced = %replaced.id, new = %id, "open batch replaced");
        }
        self.open = Some(OpenBatch {
            id: id.clone(),
            started_at: Utc::now(),
            metadata,
        });
        self.last_status = Some(BatchStatus::Open);
        id
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Id of the open batch, for writers that tag events at write time.
    /// Tagging at write time makes the commit back-fill a no-op for those
    /// events and avoids the window-scan race entirely.
    pub fn batch_id(&self) -> Option<&str> {
        self.open.as_ref().map(|b| b.id.as_str())
    }

    pub fn status(&self) -> Option<BatchStatus> {
        self.last_status
    }

    /// Close the open batch and back-fill its id and metadata onto
    /// un-batched events inside the lookback window. Returns `false` when
    /// no batch is open.
    pub async fn commit_batch(&mut self) -> Result<bool> {
        let Some(mut batch) = self.open.take() else {
            return Ok(false);
        };

        let now = Utc::now();
        batch.metadata.status = Some("completed".to_string());
        batch.metadata.completed_at = Some(now);

        // The lookback bound keeps the scan from claiming stale events when
        // a session stays open far longer than expected.
        let since = batch.started_at.max(now - self.config.lookback());
        let tagged = self
            .store
            .assign_batch(&batch.id, &batch.metadata, since)
            .await?;
        debug!(batch_id = %batch.id, tagged, "batch committed");

        self.last_status = Some(BatchStatus::Committed);
        Ok(true)
    }

    /// Abandon the open batch. With `delete_on_discard` set, the events the
    /// batch produced are deleted; otherwise they are left un-batched.
    /// Returns `false` when no batch is open.
    pub async fn discard_batch(&mut self) -> Result<bool> {
        let Some(batch) = self.open.take() else {
            return Ok(false);
        };

        if self.config.delete_on_discard {
            let since = batch.started_at.max(Utc::now() - self.config.lookback());
            let removed = self.store.purge_batch(&batch.id, since).await?;
            debug!(batch_id = %batch.id, removed, "batch discarded with delete");
        } else {
            debug!(batch_id = %batch.id, "batch discarded");
        }

        self.last_status = Some(BatchStatus::Discarded);
        Ok(true)
    }
}
