//! action-logger — activity-audit batch formatting.
//!
//! Groups low-level change-events into human-readable batches, resolves the
//! formatting strategy for a batch from its route/controller context, diffs
//! attribute snapshots, and renders localized summary messages.
//!
//! - `types`: pure domain value types (events, queries, results).
//! - `differ` + `aggregate`: the shared diff/aggregate pipeline.
//! - `processors` + `resolver`: rendering strategies and the layered lookup
//!   that picks one per batch.
//! - `batch`: the start/commit/discard lifecycle for one unit of work.
//! - `store` + `translate`: ports to the external event log and translator.
//! - `service`: the facade tying the above together.

pub mod aggregate;
pub mod batch;
pub mod config;
pub mod differ;
pub mod error;
pub mod processors;
pub mod resolver;
pub mod service;
pub mod store;
pub mod translate;
pub mod types;

pub use aggregate::{build_view, BatchView};
pub use batch::BatchSession;
pub use config::{AuditConfig, OverrideKeyStyle, RouteBinding};
pub use error::AuditError;
pub use processors::{
    BatchProcessor, CreatedProcessor, DeletedProcessor, Processor, UpdatedProcessor,
};
pub use resolver::ProcessorRegistry;
pub use service::ActivityService;
pub use store::{EventStore, MemoryEventStore};
pub use translate::{MapTranslator, Translator};
pub use types::{
    ActionKind, AttributeChange, AttributeMap, BatchMetadata, BatchResult, BatchStatus,
    ChangeEvent, ChangeStats, ContextMetadata, EntityChanges, EventQuery, ACTION_MODIFIED,
};
