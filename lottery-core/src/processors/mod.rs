//! Processors that act on lottery events.
//!
//! - `EventScheduler`: Owns DRAW/ANNOUNCE timers, runs draws, notifies
//! - `BidLedger`: Accepts bids under the per-participant cap
//! - `AnnouncementDispatcher`: Receives `Announcement`, delivers webhooks

pub mod announcement_dispatcher;
pub mod bid_ledger;
pub mod scheduler;

pub use announcement_dispatcher::{AnnouncementDispatcher, DispatchError};
pub use bid_ledger::{BidLedger, LedgerError, SubmitBids};
pub use scheduler::{
    EventScheduler, JobKind, ScheduleOutcome, ScheduledJob, SchedulerError,
};
