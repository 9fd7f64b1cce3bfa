//! Event persistence.
//!
//! The scheduler and the bid ledger only talk to an [`EventStore`]. Upserts
//! are atomic per event; a `get` after a successful write observes it.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileEventStore;
pub use memory::InMemoryEventStore;

use crate::entities::Event;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while reading or writing events.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem error
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    /// Document could not be encoded or decoded
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Document store keyed by event id.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Fetch one event, draft or published.
    async fn get(&self, id: Uuid) -> Result<Option<Event>, StoreError>;

    /// All published events.
    async fn list_published(&self) -> Result<Vec<Event>, StoreError>;

    /// Every event, drafts included.
    async fn list_all(&self) -> Result<Vec<Event>, StoreError>;

    /// Insert or replace the event with `event.id`.
    async fn upsert(&self, event: Event) -> Result<(), StoreError>;

    /// Remove an event. Returns whether it existed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Re-read the backing storage, discarding in-memory state.
    async fn reload(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
