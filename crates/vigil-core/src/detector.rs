use crate::checkin::CheckIn;
use crate::schedule::Schedule;
use chrono::{DateTime, Utc};

/// Result of evaluating one worker against one schedule at an instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Whole minutes past the due instant, truncated toward zero.
    /// Zero or negative means the worker is not yet due.
    pub overdue_by_minutes: i64,
    pub grace_expired: bool,
    pub next_due: DateTime<Utc>,
}

impl Evaluation {
    pub fn is_overdue(&self) -> bool {
        self.overdue_by_minutes > 0
    }
}

/// Compute how overdue a worker is. Pure computation.
///
/// The due instant is the latest check-in plus the schedule interval. A
/// worker with no check-in history is treated as already overdue by one
/// full interval: unseen workers are immediately eligible for overdue
/// processing rather than granted a free first interval.
///
/// Minute-floor truncation is the defined rounding rule; 59 seconds late
/// is zero minutes overdue.
pub fn evaluate(schedule: &Schedule, latest: Option<&CheckIn>, now: DateTime<Utc>) -> Evaluation {
    let next_due = match latest {
        Some(checkin) => checkin.timestamp + schedule.check_in_interval(),
        None => now - schedule.check_in_interval(),
    };
    let overdue_by_minutes = (now - next_due).num_minutes();
    Evaluation {
        overdue_by_minutes,
        grace_expired: overdue_by_minutes > schedule.grace_period_minutes,
        next_due,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
