//! Announcement events.
//!
//! # Event Flow
//!
//! 1. `EventScheduler` fires an announce or draw timer
//! 2. `ChannelNotifier` turns it into an `Announcement` on the channel
//! 3. `AnnouncementDispatcher` enriches it from the store and posts the webhook
//!
//! Announcements carry identifiers and draw outcomes only; the dispatcher
//! re-fetches event metadata.

pub mod channels;
pub mod types;

pub use channels::{
    AnnouncementReceiver, AnnouncementSender, DEFAULT_CHANNEL_BUFFER, announcement_channel,
};
pub use types::Announcement;
