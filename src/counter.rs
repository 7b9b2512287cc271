//! Unread counter derived from a full history refetch

use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::client::{ApiError, TrackerApi};
use crate::event::{TrackedItem, ALL_MODULES, FLAG_NEW};
use crate::filter::{by_module_and_flag, by_tracked};

/// Where the current unread count is published.
///
/// `None` blanks the display (preview mode shows no number).
pub trait BadgeSink: Send + Sync {
    fn set_count(&self, count: Option<usize>);
}

/// Badge published as a small file next to the config, so status bars and
/// prompts can read it. An empty file means "no badge".
pub struct FileBadge {
    path: PathBuf,
}

impl FileBadge {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl BadgeSink for FileBadge {
    fn set_count(&self, count: Option<usize>) {
        let text = count.map(|n| n.to_string()).unwrap_or_default();
        debug!(badge = %text, "publishing unread badge");

        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Err(err) = fs::write(&self.path, text) {
            warn!(path = %self.path.display(), error = %err, "failed to write badge file");
        }
    }
}

/// Recompute the unread count from the full history and publish it.
///
/// Always refetches from cursor 0: flag-0 events are only "currently
/// unread" in aggregate if none were later marked read, and recomputing
/// from server truth avoids a running total that can drift. O(full history)
/// per call, which is fine because it only runs when a relevant change was
/// detected.
pub async fn update_unread_counter(
    api: &dyn TrackerApi,
    tracked: &[TrackedItem],
    badge: &dyn BadgeSink,
) -> Result<usize, ApiError> {
    let result = api.history(0).await?;

    let unread = by_tracked(
        &by_module_and_flag(&result.history, &ALL_MODULES, Some(FLAG_NEW)),
        tracked,
    );

    badge.set_count(Some(unread.len()));
    Ok(unread.len())
}
