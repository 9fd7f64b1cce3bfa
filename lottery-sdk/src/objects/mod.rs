pub mod bid;
pub mod event;
pub mod webhook;

pub use bid::{BidResponse, SubmitBidsRequest, SubmitBidsResponse};
pub use event::{
    ActiveEventResponse, CreateEventRequest, EventResponse, EventStatus, ReconcileResponse,
    ScheduledJobKind, ScheduledJobResponse, SelectionRule, UpdateEventRequest,
};
pub use webhook::{AnnouncementPayload, WinnerEntry};
