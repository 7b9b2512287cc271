//! Pure, order-preserving filters over history events

use crate::event::{HistoryEvent, TrackedItem};

/// Keep events belonging to one of `modules`, optionally restricted to a
/// single flag value. `None` keeps every flag.
pub fn by_module_and_flag(
    events: &[HistoryEvent],
    modules: &[i64],
    flag: Option<i64>,
) -> Vec<HistoryEvent> {
    events
        .iter()
        .filter(|event| {
            modules.contains(&event.module_id)
                && flag.map_or(true, |wanted| event.flags == wanted)
        })
        .cloned()
        .collect()
}

/// Keep events matching a tracked item by `(module_id, record_id)`.
///
/// An empty tracked list means "watch everything" and passes the input
/// through unchanged.
pub fn by_tracked(events: &[HistoryEvent], tracked: &[TrackedItem]) -> Vec<HistoryEvent> {
    if tracked.is_empty() {
        return events.to_vec();
    }

    events
        .iter()
        .filter(|event| tracked.iter().any(|item| item.matches(event)))
        .cloned()
        .collect()
}
