//! Local JSONL log of delivered notifications
//!
//! Best-effort history so a restarted watcher (or the user) can see what
//! was already surfaced. Appends take a file lock; the file is trimmed back
//! once it grows past the cap.

use anyhow::Result;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use super::sink::Notification;

const MAX_RECORDS: usize = 200;
const KEEP_AFTER_CLEANUP: usize = 100;

/// One delivered notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub ts: DateTime<Utc>,
    /// Item URL the notification was keyed on
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
}

impl NotificationRecord {
    pub fn from_notification(notification: &Notification) -> Self {
        Self {
            ts: Utc::now(),
            id: notification.id.clone(),
            title: notification.title.clone(),
            body: notification.body.clone(),
        }
    }
}

/// Append-only notification log
pub struct NotificationStore {
    path: PathBuf,
}

impl NotificationStore {
    pub fn new() -> Self {
        let path = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("tracker-monitor")
            .join("notifications.jsonl");

        Self { path }
    }

    /// Store at an explicit path, for tests
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Append one record, trimming the log when it grows past the cap
    pub fn append(&self, record: &NotificationRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()?;

        let result = (|| -> Result<()> {
            let mut writer = &file;
            let line = serde_json::to_string(record)?;
            writeln!(writer, "{}", line)?;
            Ok(())
        })();

        let _ = fs2::FileExt::unlock(&file);
        result?;

        self.cleanup_if_needed()
    }

    /// Read the most recent `limit` records
    pub fn recent(&self, limit: usize) -> Result<Vec<NotificationRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)?;
        let mut records: Vec<NotificationRecord> = content
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();

        let skip = records.len().saturating_sub(limit);
        Ok(records.split_off(skip))
    }

    fn cleanup_if_needed(&self) -> Result<()> {
        let content = fs::read_to_string(&self.path)?;
        let lines: Vec<&str> = content.lines().collect();
        if lines.len() <= MAX_RECORDS {
            return Ok(());
        }

        let keep = &lines[lines.len() - KEEP_AFTER_CLEANUP..];
        let mut trimmed = keep.join("\n");
        trimmed.push('\n');
        fs::write(&self.path, trimmed)?;
        Ok(())
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}
