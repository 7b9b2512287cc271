//! Preview enrichment: last-comment bodies, unread compensation, and the
//! basic-notification fallback

mod common;

use common::{event_with_data, side_effect_log, RecordingBadge, RecordingSink, ScriptedApi};
use serde_json::json;
use tempfile::tempdir;
use tracker_monitor::{
    run_tick, ApiError, Config, ConfigStore, NotificationStore, PollResult, PollState,
    UnreadTarget, MODULE_BOARD, MODULE_SERVICE_DESK, MODULE_TASKS,
};

fn preview_config() -> Config {
    Config {
        tw_host: "https://tw.example.com".to_string(),
        show_previews: true,
        ..Config::default()
    }
}

struct Harness {
    store: ConfigStore,
    log: NotificationStore,
    sink: RecordingSink,
    badge: RecordingBadge,
    _dir: tempfile::TempDir,
}

impl Harness {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let effects = side_effect_log();
        Self {
            store: ConfigStore::with_dir(dir.path()),
            log: NotificationStore::with_path(dir.path().join("log.jsonl")),
            sink: RecordingSink::new(effects.clone()),
            badge: RecordingBadge::new(effects),
            _dir: dir,
        }
    }
}

#[tokio::test]
async fn test_preview_uses_last_comment_and_marks_unread() {
    let api = ScriptedApi::new();
    api.push_history(Ok(PollResult {
        next_tid: 2,
        history: vec![event_with_data(
            MODULE_TASKS,
            10,
            0,
            "/tasks/view/10#comment-3",
            "Fix the widget",
        )],
    }));
    // The fragment is stripped before the item fetch
    api.set_item(
        "/tasks/view/10",
        Ok(Some(json!({
            "comments": {
                "comments": [
                    {"text": "older"},
                    {"text": "<p>hello &amp; welcome</p>", "authorImage": "/avatars/9.png"}
                ]
            }
        }))),
    );

    let h = Harness::new();
    let mut state = PollState::new(0);

    run_tick(&api, &preview_config(), &mut state, &h.store, &h.sink, &h.log, &h.badge).await;

    let notes = h.sink.notes.lock().unwrap();
    assert_eq!(notes.len(), 1);
    // The notification keeps the original URL (fragment included) as its key
    assert_eq!(notes[0].id, "/tasks/view/10#comment-3");
    assert_eq!(notes[0].title, "Fix the widget");
    assert_eq!(notes[0].body, "hello & welcome\n");
    assert_eq!(
        notes[0].icon.as_deref(),
        Some("https://tw.example.com/avatars/9.png")
    );

    // Viewing the item marked it read; the watcher compensated
    assert_eq!(
        *api.unread_calls.lock().unwrap(),
        vec![UnreadTarget::Task { id: 10 }]
    );
}

#[tokio::test]
async fn test_preview_servicedesk_unread_target() {
    let api = ScriptedApi::new();
    api.push_history(Ok(PollResult {
        next_tid: 2,
        history: vec![event_with_data(
            MODULE_SERVICE_DESK,
            55,
            0,
            "/servicedesk/view/55",
            "Ticket",
        )],
    }));
    api.set_item(
        "/servicedesk/view/55",
        Ok(Some(json!({"comments": {"comments": [{"text": "reply"}]}}))),
    );

    let h = Harness::new();
    let mut state = PollState::new(0);

    run_tick(&api, &preview_config(), &mut state, &h.store, &h.sink, &h.log, &h.badge).await;

    assert_eq!(
        *api.unread_calls.lock().unwrap(),
        vec![UnreadTarget::ServiceDesk {
            path: "/servicedesk/make_unread/55".to_string()
        }]
    );
    let notes = h.sink.notes.lock().unwrap();
    assert_eq!(notes[0].body, "reply");
    assert!(notes[0].icon.is_none());
}

#[tokio::test]
async fn test_preview_falls_back_to_basic_on_fetch_failure() {
    let api = ScriptedApi::new();
    api.push_history(Ok(PollResult {
        next_tid: 2,
        history: vec![event_with_data(MODULE_TASKS, 10, 0, "/tasks/view/10", "t1")],
    }));
    api.set_item("/tasks/view/10", Err(ApiError::Status(500)));

    let h = Harness::new();
    let mut state = PollState::new(0);

    run_tick(&api, &preview_config(), &mut state, &h.store, &h.sink, &h.log, &h.badge).await;

    let notes = h.sink.notes.lock().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "t1");
    assert!(notes[0].body.is_empty());
    assert!(notes[0].icon.is_none());
}

#[tokio::test]
async fn test_preview_falls_back_when_comments_missing() {
    let api = ScriptedApi::new();
    api.push_history(Ok(PollResult {
        next_tid: 2,
        history: vec![event_with_data(MODULE_TASKS, 10, 0, "/tasks/view/10", "t1")],
    }));
    api.set_item("/tasks/view/10", Ok(Some(json!({"no": "comments"}))));

    let h = Harness::new();
    let mut state = PollState::new(0);

    run_tick(&api, &preview_config(), &mut state, &h.store, &h.sink, &h.log, &h.badge).await;

    let notes = h.sink.notes.lock().unwrap();
    assert_eq!(notes.len(), 1);
    assert!(notes[0].body.is_empty());
}

#[tokio::test]
async fn test_preview_falls_back_on_unsupported_unread_target() {
    let api = ScriptedApi::new();
    api.push_history(Ok(PollResult {
        next_tid: 2,
        history: vec![event_with_data(MODULE_BOARD, 5, 0, "/boards/view/5", "Board card")],
    }));
    api.set_item(
        "/boards/view/5",
        Ok(Some(json!({"comments": {"comments": [{"text": "note"}]}}))),
    );

    let h = Harness::new();
    let mut state = PollState::new(0);

    run_tick(&api, &preview_config(), &mut state, &h.store, &h.sink, &h.log, &h.badge).await;

    let notes = h.sink.notes.lock().unwrap();
    assert_eq!(notes.len(), 1);
    // Enrichment aborted at the unread step, so the basic shape survives
    assert!(notes[0].body.is_empty());
    assert!(api.unread_calls.lock().unwrap().is_empty());
}
