//! Tracker Monitor - watch a Teamwork-style project tracker and surface
//! new activity as desktop notifications and an unread badge

pub mod client;
pub mod config;
pub mod counter;
pub mod event;
pub mod filter;
pub mod format;
pub mod history;
pub mod notification;
pub mod poll;
pub mod target;

pub use client::{ApiClient, ApiError, TrackerApi};
pub use config::{Config, ConfigStore};
pub use counter::{update_unread_counter, BadgeSink, FileBadge};
pub use event::{
    last_comment, Comment, EventData, HistoryEvent, PollResult, TrackedItem, ALL_MODULES,
    FLAG_NEW, FLAG_READ, MODULE_BOARD, MODULE_SERVICE_DESK, MODULE_TASKS,
};
pub use filter::{by_module_and_flag, by_tracked};
pub use format::strip_html;
pub use history::{fetch_history, FetchError, PollState};
pub use notification::{
    DesktopSink, Notification, NotificationRecord, NotificationSink, NotificationStore, Notifier,
    SendResult,
};
pub use poll::{run_poll_loop, run_tick, TickOutcome};
pub use target::{strip_fragment, UnreadTarget, UnsupportedTarget};
