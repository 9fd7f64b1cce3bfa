//! Per-event mutual exclusion.
//!
//! Every mutation of a single event (bid intake, admin edit, timer arming,
//! timer firing) runs while holding that event's lock. Unrelated events never
//! contend with each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// Registry of async mutexes keyed by event id.
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone, Default)]
pub struct EventLocks {
    inner: Arc<Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>>,
}

/// Guard returned by [`EventLocks::lock`]. The event stays locked until it drops.
pub type EventGuard = OwnedMutexGuard<()>;

impl EventLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `event_id`.
    pub async fn lock(&self, event_id: Uuid) -> EventGuard {
        let mutex = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(map.entry(event_id).or_default())
        };
        mutex.lock_owned().await
    }

    /// Drop registry entries nobody holds or waits on.
    pub fn prune(&self) {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.retain(|_, mutex| Arc::strong_count(mutex) > 1);
    }

    /// Number of ids currently tracked.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
