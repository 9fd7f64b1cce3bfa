pub mod event;

pub use event::{Bid, Event, EventStatus, SelectionRule};
