//! Desktop notification sink backed by OS-native tooling
//!
//! macOS gets `osascript` with a `display notification` script; everything
//! else gets `notify-send`. On `notify-send` the item URL rides along as a
//! synchronous hint so a repeat notification for the same item replaces the
//! visible one instead of stacking.

use anyhow::{Context, Result};
use std::process::Command;
use tracing::debug;

use super::sink::{Notification, NotificationSink, SendResult};

pub struct DesktopSink;

impl DesktopSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DesktopSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the notify-send invocation for a notification
fn notify_send_command(notification: &Notification) -> Vec<String> {
    let mut command = vec![
        "notify-send".to_string(),
        "--app-name".to_string(),
        "tracker-monitor".to_string(),
        "--hint".to_string(),
        format!(
            "string:x-canonical-private-synchronous:{}",
            notification.id
        ),
    ];

    if let Some(icon) = &notification.icon {
        command.push("--icon".to_string());
        command.push(icon.clone());
    }

    command.push(notification.title.clone());
    command.push(notification.body.clone());
    command
}

/// Build the osascript invocation for a notification
fn osascript_command(notification: &Notification) -> Vec<String> {
    let script = format!(
        r#"display notification "{}" with title "{}""#,
        escape_applescript(&notification.body),
        escape_applescript(&notification.title),
    );

    vec!["osascript".to_string(), "-e".to_string(), script]
}

fn escape_applescript(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn platform_command(notification: &Notification) -> Vec<String> {
    if cfg!(target_os = "macos") {
        osascript_command(notification)
    } else {
        notify_send_command(notification)
    }
}

impl NotificationSink for DesktopSink {
    fn name(&self) -> &str {
        "desktop"
    }

    fn deliver(&self, notification: &Notification) -> Result<SendResult> {
        let command = platform_command(notification);
        debug!(id = %notification.id, program = %command[0], "delivering desktop notification");

        let output = Command::new(&command[0])
            .args(&command[1..])
            .output()
            .with_context(|| format!("failed to run {}", command[0]))?;

        if output.status.success() {
            Ok(SendResult::Sent)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Ok(SendResult::Failed(stderr))
        }
    }
}
