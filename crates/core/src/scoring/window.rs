//! Time-window helpers shared by the engines.
//!
//! Windows are half-open ranges measured back from the snapshot's `as_of`:
//! an event belongs to `(start, end]` days ago when
//! `as_of - start < occurred_at <= as_of - end`.

use chrono::{DateTime, Duration, Utc};

use crate::fleet::SafetyEvent;

pub(crate) const DAYS_30: i64 = 30;
pub(crate) const DAYS_28: i64 = 28;
pub(crate) const DAYS_14: i64 = 14;
pub(crate) const DAYS_7: i64 = 7;

pub(crate) fn in_window(
    event: &SafetyEvent,
    as_of: DateTime<Utc>,
    start_days_ago: i64,
    end_days_ago: i64,
) -> bool {
    let lower = as_of - Duration::days(start_days_ago);
    let upper = as_of - Duration::days(end_days_ago);
    event.occurred_at > lower && event.occurred_at <= upper
}

/// Count events within `(start, end]` days ago.
pub(crate) fn count_in_window(
    events: &[&SafetyEvent],
    as_of: DateTime<Utc>,
    start_days_ago: i64,
    end_days_ago: i64,
) -> u32 {
    events
        .iter()
        .filter(|e| in_window(e, as_of, start_days_ago, end_days_ago))
        .count() as u32
}

/// Events within the last `days` days.
pub(crate) fn last_days<'a>(
    events: &[&'a SafetyEvent],
    as_of: DateTime<Utc>,
    days: i64,
) -> Vec<&'a SafetyEvent> {
    events
        .iter()
        .copied()
        .filter(|e| in_window(e, as_of, days, 0))
        .collect()
}

/// Events in the last 14 days vs the 14 days before that.
pub(crate) fn recent_and_previous(events: &[&SafetyEvent], as_of: DateTime<Utc>) -> (u32, u32) {
    (
        count_in_window(events, as_of, DAYS_14, 0),
        count_in_window(events, as_of, DAYS_28, DAYS_14),
    )
}
