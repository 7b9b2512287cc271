//! Shared test doubles for driving the watcher without a server
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use tracker_monitor::{
    ApiError, BadgeSink, EventData, HistoryEvent, Notification, NotificationSink, PollResult,
    SendResult, TrackerApi, UnreadTarget,
};

/// Shared ordered log of observable side effects
pub type SideEffectLog = Arc<Mutex<Vec<String>>>;

pub fn side_effect_log() -> SideEffectLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Scripted server: queued history responses, canned item payloads, and
/// call recording.
pub struct ScriptedApi {
    history: Mutex<VecDeque<Result<PollResult, ApiError>>>,
    items: Mutex<HashMap<String, Result<Option<serde_json::Value>, ApiError>>>,
    pub history_calls: Mutex<Vec<u64>>,
    pub unread_calls: Mutex<Vec<UnreadTarget>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self {
            history: Mutex::new(VecDeque::new()),
            items: Mutex::new(HashMap::new()),
            history_calls: Mutex::new(Vec::new()),
            unread_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn push_history(&self, response: Result<PollResult, ApiError>) {
        self.history.lock().unwrap().push_back(response);
    }

    pub fn set_item(&self, url: &str, response: Result<Option<serde_json::Value>, ApiError>) {
        self.items.lock().unwrap().insert(url.to_string(), response);
    }
}

#[async_trait]
impl TrackerApi for ScriptedApi {
    async fn history(&self, tid: u64) -> Result<PollResult, ApiError> {
        self.history_calls.lock().unwrap().push(tid);
        self.history
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(PollResult::empty(tid)))
    }

    async fn item_full(&self, url: &str) -> Result<Option<serde_json::Value>, ApiError> {
        self.items
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or(Ok(None))
    }

    async fn mark_unread(&self, target: &UnreadTarget) -> Result<(), ApiError> {
        self.unread_calls.lock().unwrap().push(target.clone());
        Ok(())
    }
}

/// Sink that records every delivered notification
pub struct RecordingSink {
    pub notes: Mutex<Vec<Notification>>,
    log: SideEffectLog,
}

impl RecordingSink {
    pub fn new(log: SideEffectLog) -> Self {
        Self {
            notes: Mutex::new(Vec::new()),
            log,
        }
    }
}

impl NotificationSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    fn deliver(&self, notification: &Notification) -> anyhow::Result<SendResult> {
        self.log
            .lock()
            .unwrap()
            .push(format!("notify:{}", notification.id));
        self.notes.lock().unwrap().push(notification.clone());
        Ok(SendResult::Sent)
    }
}

/// Badge that records every published count
pub struct RecordingBadge {
    pub counts: Mutex<Vec<Option<usize>>>,
    log: SideEffectLog,
}

impl RecordingBadge {
    pub fn new(log: SideEffectLog) -> Self {
        Self {
            counts: Mutex::new(Vec::new()),
            log,
        }
    }
}

impl BadgeSink for RecordingBadge {
    fn set_count(&self, count: Option<usize>) {
        let entry = match count {
            Some(n) => format!("badge:{}", n),
            None => "badge:clear".to_string(),
        };
        self.log.lock().unwrap().push(entry);
        self.counts.lock().unwrap().push(count);
    }
}

pub fn event(module_id: i64, record_id: i64, flags: i64) -> HistoryEvent {
    HistoryEvent {
        module_id,
        record_id,
        flags,
        data: None,
    }
}

pub fn event_with_data(
    module_id: i64,
    record_id: i64,
    flags: i64,
    url: &str,
    title: &str,
) -> HistoryEvent {
    HistoryEvent {
        module_id,
        record_id,
        flags,
        data: Some(EventData {
            url: url.to_string(),
            title: title.to_string(),
        }),
    }
}
