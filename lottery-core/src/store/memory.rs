use super::{EventStore, StoreError};
use crate::entities::Event;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Non-durable store, used by tests and as a scratch backend.
#[derive(Default)]
pub struct InMemoryEventStore {
    events: RwLock<HashMap<Uuid, Event>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: RwLock::new(events.into_iter().map(|e| (e.id, e)).collect()),
        }
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn get(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        Ok(self.events.read().await.get(&id).cloned())
    }

    async fn list_published(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self
            .events
            .read()
            .await
            .values()
            .filter(|e| e.is_published())
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.events.read().await.values().cloned().collect())
    }

    async fn upsert(&self, event: Event) -> Result<(), StoreError> {
        self.events.write().await.insert(event.id, event);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.events.write().await.remove(&id).is_some())
    }
}
