//! Deadline badges
//!
//! Pure functions of the deadline and "now". Nothing is cached: callers pass
//! the current time on every render.

use chrono::{NaiveDate, NaiveDateTime};

/// Days considered "approaching"
pub const APPROACHING_WINDOW_DAYS: i64 = 30;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Badge for a deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineStatus {
    /// No deadline set
    None,
    /// More than the window away
    Open,
    /// Within the window; `days` whole days left, rounded up
    Approaching { days: i64 },
    Passed,
}

/// Whole days from `now` until the start of `deadline`, rounded up
pub fn days_until(deadline: NaiveDate, now: NaiveDateTime) -> i64 {
    let start = deadline.and_hms_opt(0, 0, 0).unwrap_or_default();
    let millis = (start - now).num_milliseconds();
    // ceil(millis / day) for either sign
    -((-millis).div_euclid(MILLIS_PER_DAY))
}

/// Deadline is strictly before now
pub fn is_passed(deadline: Option<NaiveDate>, now: NaiveDateTime) -> bool {
    match deadline {
        Some(d) => d.and_hms_opt(0, 0, 0).unwrap_or_default() < now,
        None => false,
    }
}

/// Deadline is 1..=30 days away
pub fn is_approaching(deadline: Option<NaiveDate>, now: NaiveDateTime) -> bool {
    match deadline {
        Some(d) => {
            let days = days_until(d, now);
            days > 0 && days <= APPROACHING_WINDOW_DAYS
        }
        None => false,
    }
}

pub fn classify(deadline: Option<NaiveDate>, now: NaiveDateTime) -> DeadlineStatus {
    let Some(d) = deadline else {
        return DeadlineStatus::None;
    };
    if is_passed(deadline, now) {
        DeadlineStatus::Passed
    } else if is_approaching(deadline, now) {
        DeadlineStatus::Approaching {
            days: days_until(d, now),
        }
    } else {
        DeadlineStatus::Open
    }
}
