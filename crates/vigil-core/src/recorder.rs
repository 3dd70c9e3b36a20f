//! Episode recording: the single idempotence guard of the engine.
//!
//! Because check-ins are append-only and ordered by timestamp, "the latest
//! check-in is already overdue" is all the state needed to avoid flagging
//! the same unresolved episode on every evaluator pass. A later manual
//! `ok` check-in resets eligibility for a fresh episode.

use crate::checkin::{CheckIn, CheckInMeta, CheckInStatus};
use crate::detector::Evaluation;
use crate::error::Result;
use crate::schedule::Schedule;
use crate::store::MonitorStore;
use chrono::{DateTime, Utc};

/// Insert one `overdue` check-in for a grace-expired episode, unless the
/// episode was already recorded. Returns whether a row was written.
pub fn record_if_needed<S: MonitorStore + ?Sized>(
    store: &S,
    schedule: &Schedule,
    worker_id: &str,
    eval: &Evaluation,
    latest: Option<&CheckIn>,
    now: DateTime<Utc>,
) -> Result<bool> {
    if !eval.grace_expired {
        return Ok(false);
    }
    if already_recorded(latest) {
        return Ok(false);
    }

    let checkin = CheckIn::automatic_overdue(
        worker_id,
        schedule.organization_id.clone(),
        now,
        CheckInMeta {
            schedule_id: schedule.slug.clone(),
            overdue_by_minutes: eval.overdue_by_minutes,
            processed_at: now,
        },
    );
    store.insert_checkin(checkin)?;
    Ok(true)
}

/// True when the worker's latest check-in already marks this episode.
pub fn already_recorded(latest: Option<&CheckIn>) -> bool {
    matches!(latest, Some(c) if c.status == CheckInStatus::Overdue)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
