//! Converts filtered history events into notifications

use anyhow::{anyhow, Context, Result};
use tracing::{debug, warn};

use crate::client::TrackerApi;
use crate::event::{last_comment, EventData, HistoryEvent};
use crate::format::strip_html;
use crate::notification::sink::{Notification, NotificationSink, SendResult};
use crate::notification::store::{NotificationRecord, NotificationStore};
use crate::target::{strip_fragment, UnreadTarget};

/// Per-tick notification dispatcher, bound to the tick's API client and
/// config snapshot.
pub struct Notifier<'a> {
    api: &'a dyn TrackerApi,
    sink: &'a dyn NotificationSink,
    store: Option<&'a NotificationStore>,
    host: &'a str,
    show_previews: bool,
}

impl<'a> Notifier<'a> {
    pub fn new(
        api: &'a dyn TrackerApi,
        sink: &'a dyn NotificationSink,
        host: &'a str,
        show_previews: bool,
    ) -> Self {
        Self {
            api,
            sink,
            store: None,
            host,
            show_previews,
        }
    }

    /// Also log delivered notifications to the local store
    pub fn with_store(mut self, store: &'a NotificationStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Notify for each event carrying display data.
    ///
    /// Events run sequentially: preview enrichment costs one extra request
    /// per event, and a burst of activity must not turn into a request
    /// storm.
    pub async fn notify_all(&self, events: &[HistoryEvent]) {
        for event in events {
            let Some(data) = &event.data else {
                debug!(
                    module_id = event.module_id,
                    record_id = event.record_id,
                    "skipping event without display data"
                );
                continue;
            };

            let notification = if self.show_previews {
                self.preview(data).await
            } else {
                Notification::basic(&data.url, &data.title)
            };

            self.emit(&notification);
        }
    }

    /// Preview notification: last-comment body and author avatar.
    ///
    /// Falls back to the basic notification when any part of the enrichment
    /// fails — a degraded notification beats a dropped one.
    async fn preview(&self, data: &EventData) -> Notification {
        match self.enrich(data).await {
            Ok(notification) => notification,
            Err(err) => {
                debug!(url = %data.url, error = %err, "preview enrichment failed, falling back to basic");
                Notification::basic(&data.url, &data.title)
            }
        }
    }

    async fn enrich(&self, data: &EventData) -> Result<Notification> {
        let payload = self
            .api
            .item_full(strip_fragment(&data.url))
            .await?
            .ok_or_else(|| anyhow!("empty item payload for {}", data.url))?;

        // Opening the item marked it read server-side; compensate so the
        // unread counter stays truthful.
        let target = UnreadTarget::parse(&data.url)?;
        self.api.mark_unread(&target).await?;

        let comment = last_comment(&payload)
            .with_context(|| format!("no comments object for {}", data.url))?;

        Ok(Notification {
            id: data.url.clone(),
            title: data.title.clone(),
            body: strip_html(&comment.text),
            icon: comment
                .author_image
                .map(|image| format!("{}{}", self.host, image)),
        })
    }

    fn emit(&self, notification: &Notification) {
        match self.sink.deliver(notification) {
            Ok(SendResult::Sent) => {
                debug!(id = %notification.id, sink = self.sink.name(), "notification delivered");
                if let Some(store) = self.store {
                    if let Err(err) =
                        store.append(&NotificationRecord::from_notification(notification))
                    {
                        warn!(error = %err, "failed to log notification");
                    }
                }
            }
            Ok(SendResult::Failed(reason)) => {
                warn!(id = %notification.id, sink = self.sink.name(), reason = %reason, "notification delivery failed");
            }
            Err(err) => {
                warn!(id = %notification.id, sink = self.sink.name(), error = %err, "notification sink error");
            }
        }
    }
}
