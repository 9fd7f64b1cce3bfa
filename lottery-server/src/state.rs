//! Application state shared across all request handlers.

use lottery_core::framework::EventLocks;
use lottery_core::processors::{BidLedger, EventScheduler};
use lottery_core::store::EventStore;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Event document store.
    pub store: Arc<dyn EventStore>,
    /// Timer registry; every admin mutation ends with `update_schedule`.
    pub scheduler: EventScheduler,
    /// Bid intake.
    pub ledger: BidLedger,
    /// Per-event locks shared with the scheduler and the ledger.
    pub locks: EventLocks,
}

impl AppState {
    pub fn new(
        store: Arc<dyn EventStore>,
        scheduler: EventScheduler,
        ledger: BidLedger,
        locks: EventLocks,
    ) -> Self {
        Self {
            store,
            scheduler,
            ledger,
            locks,
        }
    }

    /// State over an in-memory store whose announcements go nowhere.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        use lottery_core::events::announcement_channel;
        use lottery_core::notifier::ChannelNotifier;
        use lottery_core::store::InMemoryEventStore;

        let store: Arc<dyn EventStore> = Arc::new(InMemoryEventStore::new());
        let locks = EventLocks::new();
        let (announcement_tx, _) = announcement_channel();
        let scheduler = EventScheduler::new(
            store.clone(),
            Arc::new(ChannelNotifier::new(announcement_tx)),
            locks.clone(),
        );
        let ledger = BidLedger::new(store.clone(), locks.clone());
        Self::new(store, scheduler, ledger, locks)
    }
}
