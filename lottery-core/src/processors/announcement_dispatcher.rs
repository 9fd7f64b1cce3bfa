//! AnnouncementDispatcher processor.
//!
//! The AnnouncementDispatcher is responsible for:
//! - Receiving `Announcement` from the queue
//! - Looking up the event for its title, channel and prize
//! - Sending one HTTP POST with the JSON payload to the configured webhook
//!
//! Delivery is best effort. A failed POST is logged and dropped; draws are
//! never replayed because a webhook was down. Without a webhook URL the
//! announcement is only logged.

use crate::entities::Event;
use crate::events::{Announcement, AnnouncementReceiver};
use crate::store::{EventStore, StoreError};
use lottery_sdk::objects::{AnnouncementPayload, WinnerEntry};
use std::sync::Arc;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::{debug, error, info};
use url::Url;
use uuid::Uuid;

/// Errors that can occur during announcement delivery.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Store error
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Event was deleted before its announcement went out
    #[error("event not found: {0}")]
    EventNotFound(Uuid),

    /// Webhook answered with a non-success status
    #[error("webhook delivery failed with status {status}: {body}")]
    DeliveryFailed { status: u16, body: String },
}

/// Delivers announcements to the configured webhook.
pub struct AnnouncementDispatcher {
    store: Arc<dyn EventStore>,
    webhook_url: Option<Url>,
    http_client: reqwest::Client,
}

impl AnnouncementDispatcher {
    /// Create a new AnnouncementDispatcher.
    ///
    /// `timeout` bounds each webhook request.
    pub fn new(
        store: Arc<dyn EventStore>,
        webhook_url: Option<Url>,
        timeout: std::time::Duration,
    ) -> Self {
        Self {
            store,
            webhook_url,
            http_client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Run until shutdown is signaled or every sender is gone.
    pub async fn run(
        self,
        mut shutdown_rx: watch::Receiver<bool>,
        mut announcement_rx: AnnouncementReceiver,
    ) {
        info!(
            webhook = self.webhook_url.as_ref().map(Url::as_str),
            "AnnouncementDispatcher started"
        );

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("AnnouncementDispatcher received shutdown signal");
                        break;
                    }
                }

                Some(announcement) = announcement_rx.recv() => {
                    debug!(announcement = ?announcement, "Received Announcement");

                    if let Err(e) = self.dispatch(announcement).await {
                        error!(error = %e, "Failed to deliver announcement");
                    }
                }

                else => {
                    info!("Announcement channel closed");
                    break;
                }
            }
        }

        info!("AnnouncementDispatcher shutdown complete");
    }

    async fn dispatch(&self, announcement: Announcement) -> Result<(), DispatchError> {
        let event_id = announcement.event_id();
        let event = self
            .store
            .get(event_id)
            .await?
            .ok_or(DispatchError::EventNotFound(event_id))?;
        let payload = build_payload(&event, &announcement, OffsetDateTime::now_utc());

        let Some(url) = &self.webhook_url else {
            info!(%event_id, payload = ?payload, "No webhook configured, announcement logged only");
            return Ok(());
        };

        let response = self.http_client.post(url.clone()).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::DeliveryFailed {
                status: status.as_u16(),
                body,
            });
        }

        info!(%event_id, "Announcement delivered");
        Ok(())
    }
}

/// Build the webhook payload for `announcement` using the current event metadata.
pub fn build_payload(
    event: &Event,
    announcement: &Announcement,
    now: OffsetDateTime,
) -> AnnouncementPayload {
    match announcement {
        Announcement::Opened { event_id } => AnnouncementPayload::EventOpened {
            event_id: *event_id,
            title: event.title.clone(),
            channel: event.channel.clone(),
            prize: event.prize.clone(),
            timestamp: now.unix_timestamp(),
        },
        Announcement::Concluded {
            event_id,
            winning_value,
            winners,
        } => AnnouncementPayload::DrawConcluded {
            event_id: *event_id,
            title: event.title.clone(),
            channel: event.channel.clone(),
            winning_value: *winning_value,
            winners: winners
                .iter()
                .map(|bid| WinnerEntry {
                    bid_id: bid.id,
                    participant: bid.participant.clone(),
                    value: bid.value,
                })
                .collect(),
            timestamp: now.unix_timestamp(),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::entities::Bid;
    use crate::events::announcement_channel;
    use crate::store::InMemoryEventStore;
    use time::macros::datetime;

    fn sample_event() -> Event {
        let mut event = Event::draft("Friday raffle", datetime!(2024-05-03 18:00 UTC));
        event.channel = Some("#raffles".to_string());
        event.prize = Some("Coffee mug".to_string());
        event
    }

    #[test]
    fn test_opened_payload_carries_metadata() {
        let event = sample_event();
        let now = datetime!(2024-05-03 18:00 UTC);
        let payload = build_payload(&event, &Announcement::Opened { event_id: event.id }, now);

        assert_eq!(
            payload,
            AnnouncementPayload::EventOpened {
                event_id: event.id,
                title: "Friday raffle".to_string(),
                channel: Some("#raffles".to_string()),
                prize: Some("Coffee mug".to_string()),
                timestamp: now.unix_timestamp(),
            }
        );
    }

    #[test]
    fn test_concluded_payload_lists_winners() {
        let event = sample_event();
        let winner = Bid::new("carol", 7, datetime!(2024-05-03 18:05 UTC));
        let announcement = Announcement::Concluded {
            event_id: event.id,
            winning_value: Some(7),
            winners: vec![winner.clone()],
        };
        let payload = build_payload(&event, &announcement, datetime!(2024-05-10 18:00 UTC));

        let AnnouncementPayload::DrawConcluded {
            winning_value,
            winners,
            ..
        } = payload
        else {
            panic!("expected a draw payload");
        };
        assert_eq!(winning_value, Some(7));
        assert_eq!(
            winners,
            vec![WinnerEntry {
                bid_id: winner.id,
                participant: "carol".to_string(),
                value: 7,
            }]
        );
    }

    #[tokio::test]
    async fn test_dispatch_without_webhook_only_logs() {
        let event = sample_event();
        let id = event.id;
        let store = Arc::new(InMemoryEventStore::with_events([event]));
        let dispatcher =
            AnnouncementDispatcher::new(store, None, std::time::Duration::from_secs(1));

        dispatcher
            .dispatch(Announcement::Opened { event_id: id })
            .await
            .unwrap();
        assert!(matches!(
            dispatcher
                .dispatch(Announcement::Opened {
                    event_id: Uuid::new_v4()
                })
                .await,
            Err(DispatchError::EventNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let store = Arc::new(InMemoryEventStore::new());
        let dispatcher =
            AnnouncementDispatcher::new(store, None, std::time::Duration::from_secs(1));
        let (_tx, rx) = announcement_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(dispatcher.run(shutdown_rx, rx));
        shutdown_tx.send(true).unwrap();

        assert!(
            tokio::time::timeout(std::time::Duration::from_secs(1), handle)
                .await
                .is_ok()
        );
    }
}
