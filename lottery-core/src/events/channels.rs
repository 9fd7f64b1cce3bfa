//! Announcement channel factory and handles.

use super::types::Announcement;
use tokio::sync::mpsc;

/// Default buffer size for event channels.
///
/// Large enough to absorb a burst of draws firing together.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for Announcement events.
pub type AnnouncementSender = mpsc::Sender<Announcement>;
/// Receiver handle for Announcement events.
pub type AnnouncementReceiver = mpsc::Receiver<Announcement>;

/// Create a new Announcement channel.
///
/// Returns a (sender, receiver) pair. Multiple senders can be cloned from
/// the returned sender.
pub fn announcement_channel() -> (AnnouncementSender, AnnouncementReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
