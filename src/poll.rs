//! The poll loop: fixed-interval ticks over the history feed
//!
//! Each tick reloads the config, fetches incremental history, decides
//! counter vs. notification side effects, and persists the advanced
//! cursor. Ticks are awaited inside the interval loop, so at most one
//! fetch cycle is ever in flight and the shared `PollState` stays
//! single-writer.

use anyhow::Result;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::client::{ApiClient, TrackerApi};
use crate::config::{Config, ConfigStore};
use crate::counter::{update_unread_counter, BadgeSink};
use crate::event::{ALL_MODULES, FLAG_NEW, FLAG_READ};
use crate::filter::{by_module_and_flag, by_tracked};
use crate::history::{fetch_history, FetchError, PollState};
use crate::notification::{NotificationSink, NotificationStore, Notifier};

/// What one tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Fetch succeeded but nothing relevant changed; cursor advanced
    Quiet { next_tid: u64 },
    /// Fetch succeeded and side effects ran; cursor advanced
    Notified {
        next_tid: u64,
        new_events: usize,
        counter: Option<usize>,
    },
    /// Fetch failed; cursor unchanged, next tick retries
    Skipped(FetchError),
}

/// Run one poll tick against an already-constructed API client.
///
/// The cursor in `state` advances only on a successful fetch, and always
/// advances then — even when no event was relevant — so history is never
/// reprocessed. The advanced cursor is persisted through `store`.
pub async fn run_tick(
    api: &dyn TrackerApi,
    config: &Config,
    state: &mut PollState,
    store: &ConfigStore,
    sink: &dyn NotificationSink,
    log: &NotificationStore,
    badge: &dyn BadgeSink,
) -> TickOutcome {
    let result = match fetch_history(api, state).await {
        Ok(result) => result,
        Err(err) => {
            match &err {
                FetchError::ForbiddenRecoverable => {
                    warn!("history fetch forbidden, retrying next tick")
                }
                FetchError::ForbiddenSuppressed => {
                    warn!("history fetch forbidden again, skipping tick")
                }
                FetchError::Transport(cause) => {
                    warn!(error = %cause, "history fetch failed, skipping tick")
                }
            }
            return TickOutcome::Skipped(err);
        }
    };

    let new_events = by_tracked(
        &by_module_and_flag(&result.history, &ALL_MODULES, Some(FLAG_NEW)),
        &config.tracked,
    );
    let read_events = by_tracked(
        &by_module_and_flag(&result.history, &ALL_MODULES, Some(FLAG_READ)),
        &config.tracked,
    );

    let notifier =
        Notifier::new(api, sink, &config.tw_host, config.show_previews).with_store(log);
    let relevant = !new_events.is_empty() || !read_events.is_empty();
    let mut counter = None;

    if config.show_previews {
        // Preview mode shows no number; the notifications are the signal
        badge.set_count(None);
        notifier.notify_all(&new_events).await;
    } else if relevant {
        // Counter refresh happens before dispatch so the badge is already
        // right when the first bubble appears
        match update_unread_counter(api, &config.tracked, badge).await {
            Ok(count) => counter = Some(count),
            Err(err) => warn!(error = %err, "unread counter refresh failed"),
        }
        notifier.notify_all(&new_events).await;
    }

    state.cursor = result.next_tid;
    if let Err(err) = store.save_last_tid(result.next_tid) {
        warn!(error = %err, "failed to persist cursor");
    }

    if relevant {
        info!(
            next_tid = result.next_tid,
            new_events = new_events.len(),
            read_events = read_events.len(),
            "tick processed"
        );
        TickOutcome::Notified {
            next_tid: result.next_tid,
            new_events: new_events.len(),
            counter,
        }
    } else {
        debug!(next_tid = result.next_tid, "tick quiet");
        TickOutcome::Quiet {
            next_tid: result.next_tid,
        }
    }
}

/// Run the watcher until the process is stopped.
///
/// The interval comes from the config at startup (or the override); host,
/// tracked list, and preview flag are re-read every tick so option edits
/// apply live.
pub async fn run_poll_loop(
    store: &ConfigStore,
    sink: &dyn NotificationSink,
    badge: &dyn BadgeSink,
    interval_override_ms: Option<u64>,
) -> Result<()> {
    let initial = store.load()?;
    let mut state = PollState::new(initial.last_tid);
    let log = NotificationStore::new();

    info!(
        host = %initial.tw_host,
        cursor = initial.last_tid,
        previews = initial.show_previews,
        "starting watcher"
    );

    // Seed the badge before the first tick
    if initial.show_previews {
        badge.set_count(None);
    } else {
        match ApiClient::new(&initial.tw_host) {
            Ok(api) => {
                if let Err(err) = update_unread_counter(&api, &initial.tracked, badge).await {
                    warn!(error = %err, "initial unread counter failed");
                }
            }
            Err(err) => warn!(error = %err, "could not build client for initial counter"),
        }
    }

    let ping_ms = interval_override_ms.unwrap_or(initial.ping_ms).max(250);
    let period = Duration::from_millis(ping_ms);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let config = match store.load() {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "config reload failed, skipping tick");
                continue;
            }
        };

        let api = match ApiClient::new(&config.tw_host) {
            Ok(api) => api,
            Err(err) => {
                warn!(error = %err, "client construction failed, skipping tick");
                continue;
            }
        };

        let outcome = run_tick(&api, &config, &mut state, store, sink, &log, badge).await;
        debug!(?outcome, "tick finished");
    }
}
