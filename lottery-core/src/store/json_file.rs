//! JSON document store.
//!
//! All events live in memory and the whole document is rewritten on every
//! mutation. Writes go to a sibling temp file that is then renamed over the
//! document, so a crash never leaves a half-written file behind.

use super::{EventStore, StoreError};
use crate::entities::Event;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// On-disk layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    events: Vec<Event>,
}

pub struct JsonFileEventStore {
    path: PathBuf,
    document: RwLock<Document>,
}

impl JsonFileEventStore {
    /// Open the document at `path`. A missing file starts an empty store.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let document = read_document(&path).await?;
        info!(
            path = %path.display(),
            events = document.events.len(),
            "Opened event store"
        );
        Ok(Self {
            path,
            document: RwLock::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, document: &Document) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(document)?;
        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, json).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        debug!(path = %self.path.display(), events = document.events.len(), "Persisted event store");
        Ok(())
    }
}

async fn read_document(path: &Path) -> Result<Document, StoreError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::default()),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl EventStore for JsonFileEventStore {
    async fn get(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        let document = self.document.read().await;
        Ok(document.events.iter().find(|e| e.id == id).cloned())
    }

    async fn list_published(&self) -> Result<Vec<Event>, StoreError> {
        let document = self.document.read().await;
        Ok(document
            .events
            .iter()
            .filter(|e| e.is_published())
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.document.read().await.events.clone())
    }

    #[tracing::instrument(skip_all, err, fields(event_id = %event.id), name = "Store:Upsert")]
    async fn upsert(&self, event: Event) -> Result<(), StoreError> {
        let mut document = self.document.write().await;
        let index = document.events.iter().position(|e| e.id == event.id);
        let previous = match index {
            Some(index) => Some(std::mem::replace(&mut document.events[index], event)),
            None => {
                document.events.push(event);
                None
            }
        };
        if let Err(e) = self.persist(&document).await {
            // Keep memory in line with what is on disk.
            match (index, previous) {
                (Some(index), Some(previous)) => document.events[index] = previous,
                _ => {
                    document.events.pop();
                }
            }
            return Err(e);
        }
        Ok(())
    }

    #[tracing::instrument(skip_all, err, fields(event_id = %id), name = "Store:Delete")]
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut document = self.document.write().await;
        let Some(index) = document.events.iter().position(|e| e.id == id) else {
            return Ok(false);
        };
        let removed = document.events.remove(index);
        if let Err(e) = self.persist(&document).await {
            document.events.insert(index, removed);
            return Err(e);
        }
        Ok(true)
    }

    #[tracing::instrument(skip_all, err, name = "Store:Reload")]
    async fn reload(&self) -> Result<(), StoreError> {
        let fresh = read_document(&self.path).await?;
        info!(path = %self.path.display(), events = fresh.events.len(), "Reloaded event store");
        *self.document.write().await = fresh;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::{Bid, EventStatus};
    use time::OffsetDateTime;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir().join(format!("lottery-store-{}.json", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let store = JsonFileEventStore::open(scratch_path()).await.unwrap();
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_writes_survive_reopen() {
        let path = scratch_path();
        let now = OffsetDateTime::now_utc();

        let mut published = Event::draft("Published", now);
        published.status = EventStatus::Published;
        published.bids.push(Bid::new("alice", 3, now));
        let draft = Event::draft("Draft", now);

        {
            let store = JsonFileEventStore::open(&path).await.unwrap();
            store.upsert(published.clone()).await.unwrap();
            store.upsert(draft.clone()).await.unwrap();
        }

        let store = JsonFileEventStore::open(&path).await.unwrap();
        assert_eq!(store.get(published.id).await.unwrap(), Some(published.clone()));
        let listed = store.list_published().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, published.id);

        assert!(store.delete(draft.id).await.unwrap());
        assert!(!store.delete(draft.id).await.unwrap());

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_reload_picks_up_external_edits() {
        let path = scratch_path();
        let store = JsonFileEventStore::open(&path).await.unwrap();
        let event = Event::draft("Edited", OffsetDateTime::now_utc());
        store.upsert(event.clone()).await.unwrap();

        let other = JsonFileEventStore::open(&path).await.unwrap();
        other.delete(event.id).await.unwrap();

        assert!(store.get(event.id).await.unwrap().is_some());
        store.reload().await.unwrap();
        assert!(store.get(event.id).await.unwrap().is_none());

        let _ = tokio::fs::remove_file(&path).await;
    }
}
