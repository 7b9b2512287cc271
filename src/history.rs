//! Incremental history fetch with one-shot forbidden recovery
//!
//! The server transiently 403s once after certain operations (session
//! refresh being the known one). The first 403 is reported as recoverable
//! and retried naturally on the next tick; a second 403 before any success
//! is suppressed so a real permission problem can't loop forever. Any
//! success resets the probe.

use thiserror::Error;

use crate::client::{ApiError, TrackerApi};
use crate::event::PollResult;

/// Mutable poll state, owned by the loop and threaded through each tick.
///
/// Invariant: at most one unacknowledged forbidden probe is outstanding.
#[derive(Debug, Clone, PartialEq)]
pub struct PollState {
    /// Last-seen position in the server's event history
    pub cursor: u64,
    /// Whether a forbidden-recovery attempt is already in flight
    pub forbidden_probed: bool,
}

impl PollState {
    pub fn new(cursor: u64) -> Self {
        Self {
            cursor,
            forbidden_probed: false,
        }
    }
}

/// Why a history fetch produced no events this tick
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Non-403 failure; skip this tick
    #[error("history fetch failed: {0}")]
    Transport(ApiError),
    /// First 403 after a clean state; the next tick retries silently
    #[error("forbidden by server, retrying next tick")]
    ForbiddenRecoverable,
    /// 403 while a recovery attempt was already outstanding
    #[error("forbidden by server again, waiting for recovery")]
    ForbiddenSuppressed,
}

impl FetchError {
    /// Whether the next tick is expected to succeed without intervention
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FetchError::ForbiddenRecoverable)
    }
}

/// Fetch history since `state.cursor`.
///
/// This is the only path that may advance the cursor, and it never does so
/// itself — the caller advances it, and only on `Ok`.
pub async fn fetch_history(
    api: &dyn TrackerApi,
    state: &mut PollState,
) -> Result<PollResult, FetchError> {
    match api.history(state.cursor).await {
        Ok(result) => {
            state.forbidden_probed = false;
            Ok(result)
        }
        Err(ApiError::Status(403)) => {
            if state.forbidden_probed {
                Err(FetchError::ForbiddenSuppressed)
            } else {
                state.forbidden_probed = true;
                Err(FetchError::ForbiddenRecoverable)
            }
        }
        Err(err) => Err(FetchError::Transport(err)),
    }
}
