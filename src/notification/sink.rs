//! Notification sink trait and message type

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One user-visible notification.
///
/// `id` is the canonical item URL; delivering another notification with the
/// same id replaces the visible one, so at most one bubble per item stays
/// on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Item URL, used as the replacement key
    pub id: String,
    pub title: String,
    /// Empty for basic notifications, last-comment text for previews
    #[serde(default)]
    pub body: String,
    /// Absolute icon URL, when a comment author image is known
    #[serde(default)]
    pub icon: Option<String>,
}

impl Notification {
    pub fn basic(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: String::new(),
            icon: None,
        }
    }
}

/// Delivery result for one notification
#[derive(Debug, Clone, PartialEq)]
pub enum SendResult {
    Sent,
    Failed(String),
}

/// Delivery backend for notifications
pub trait NotificationSink: Send + Sync {
    /// Sink name, for logs
    fn name(&self) -> &str;

    /// Deliver one notification
    fn deliver(&self, notification: &Notification) -> Result<SendResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_notification_has_empty_body() {
        let note = Notification::basic("/tasks/view/1", "A task");
        assert_eq!(note.id, "/tasks/view/1");
        assert_eq!(note.title, "A task");
        assert!(note.body.is_empty());
        assert!(note.icon.is_none());
    }
}
