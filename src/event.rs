//! Wire types for the tracker's event history feed

use serde::{Deserialize, Serialize};

/// Module ID for tasks
pub const MODULE_TASKS: i64 = 4;
/// Module ID for service desk tickets
pub const MODULE_SERVICE_DESK: i64 = 22;
/// Module ID for boards
pub const MODULE_BOARD: i64 = 8;

/// Every module the watcher cares about
pub const ALL_MODULES: [i64; 3] = [MODULE_TASKS, MODULE_SERVICE_DESK, MODULE_BOARD];

/// Flag value for new / unread-worthy events
pub const FLAG_NEW: i64 = 0;
/// Flag value for events marked read elsewhere
pub const FLAG_READ: i64 = 1;

/// Human-facing payload attached to a history event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    /// Item URL, relative to the tracker host (e.g. `/tasks/view/123`)
    pub url: String,
    /// Item title
    #[serde(default)]
    pub title: String,
}

/// One activity record from the server's history feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub module_id: i64,
    pub record_id: i64,
    pub flags: i64,
    /// Absent on records the server emits without display data
    #[serde(default)]
    pub data: Option<EventData>,
}

/// Result of one incremental history fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollResult {
    /// Cursor to resume from on the next fetch
    pub next_tid: u64,
    /// Ordered activity since the requested cursor; empty when nothing changed
    #[serde(default)]
    pub history: Vec<HistoryEvent>,
}

impl PollResult {
    /// An empty result that leaves the cursor where it was
    pub fn empty(tid: u64) -> Self {
        Self {
            next_tid: tid,
            history: Vec::new(),
        }
    }
}

/// A user-configured watch entry; identity is `(module_id, record_id)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedItem {
    pub module_id: i64,
    pub record_id: i64,
    /// The URL the user pasted, kept for display and round-tripping
    #[serde(default)]
    pub original_url: String,
}

impl TrackedItem {
    /// Parse a tracker item URL into a watch entry.
    ///
    /// Recognizes `/tasks/view/<id>` and `/servicedesk/view/<id>` paths;
    /// anything else returns `None`.
    pub fn parse_url(url: &str) -> Option<Self> {
        let re = regex::Regex::new(r"/(tasks|servicedesk)/view/(\d+)").unwrap();
        let caps = re.captures(url)?;

        let module_id = match &caps[1] {
            "tasks" => MODULE_TASKS,
            "servicedesk" => MODULE_SERVICE_DESK,
            _ => return None,
        };
        let record_id = caps[2].parse().ok()?;

        Some(Self {
            module_id,
            record_id,
            original_url: url.to_string(),
        })
    }

    /// Whether this entry matches the given history event
    pub fn matches(&self, event: &HistoryEvent) -> bool {
        self.module_id == event.module_id && self.record_id == event.record_id
    }
}

/// One comment from an item's `?json=full` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub text: String,
    /// Host-relative path to the author's avatar
    #[serde(rename = "authorImage", default)]
    pub author_image: Option<String>,
}

/// Extract the latest comment from an item's full JSON payload.
///
/// The payload nests the list at `comments.comments`; the last element is
/// the most recent.
pub fn last_comment(payload: &serde_json::Value) -> Option<Comment> {
    let comments = payload.get("comments")?.get("comments")?.as_array()?;
    let last = comments.last()?;
    serde_json::from_value(last.clone()).ok()
}
