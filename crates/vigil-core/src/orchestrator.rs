//! The periodic evaluator pass.
//!
//! Each invocation is a complete, independent pass:
//!
//!   loading_schedules → evaluating → dispatching → completed | failed
//!
//! Only a failure to load schedules aborts the run. Everything else —
//! a worker whose check-in history cannot be read, a failed overdue
//! write, an undelivered escalation — is logged and skipped so the rest
//! of the pass completes. Idempotence across passes rests entirely on
//! the recorder's "latest check-in already overdue" guard; the
//! orchestrator keeps no cross-run state of its own.

use crate::clock::Clock;
use crate::detector::{evaluate, Evaluation};
use crate::error::Result;
use crate::escalate::{
    dispatch_all, log_failed, EpisodeType, EscalationRequest, Escalator,
};
use crate::recorder;
use crate::schedule::Schedule;
use crate::store::MonitorStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// RunPhase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    LoadingSchedules,
    Evaluating,
    Dispatching,
    Completed,
    Failed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunPhase::Idle => "idle",
            RunPhase::LoadingSchedules => "loading_schedules",
            RunPhase::Evaluating => "evaluating",
            RunPhase::Dispatching => "dispatching",
            RunPhase::Completed => "completed",
            RunPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Run output
// ---------------------------------------------------------------------------

/// One overdue worker/schedule pair, reported even before the grace period
/// expires so operators can see episodes building up.
#[derive(Debug, Clone, Serialize)]
pub struct OverdueDetail {
    pub worker_id: String,
    pub schedule_id: String,
    pub overdue_by_minutes: i64,
    pub grace_expired: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub success: bool,
    pub processed_at: DateTime<Utc>,
    /// Schedules that were in session this pass.
    pub schedules_processed: usize,
    /// Total overdue entries found (grace-expired or not).
    pub overdue_checkins: usize,
    pub overdue_details: Vec<OverdueDetail>,
    /// Overdue check-in rows actually written this pass.
    pub recorded_episodes: usize,
    pub failed_dispatches: usize,
    /// Workers skipped because their check-in history could not be read.
    pub skipped_workers: usize,
}

// ---------------------------------------------------------------------------
// RunOptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Maximum escalation dispatches in flight at once.
    pub dispatch_limit: usize,
    /// Per-dispatch timeout.
    pub dispatch_timeout: Duration,
    /// Past this instant no new schedule evaluation or dispatch batch
    /// begins; in-flight work completes and committed writes stand.
    pub deadline: Option<Instant>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dispatch_limit: 8,
            dispatch_timeout: Duration::from_secs(10),
            deadline: None,
        }
    }
}

impl RunOptions {
    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// A grace-expired entry carried from evaluation into dispatch.
struct PendingEpisode {
    schedule_idx: usize,
    worker_id: String,
    eval: Evaluation,
    latest: Option<crate::checkin::CheckIn>,
}

pub struct Orchestrator<S, E, C> {
    store: S,
    escalator: E,
    clock: C,
    options: RunOptions,
}

impl<S: MonitorStore, E: Escalator, C: Clock> Orchestrator<S, E, C> {
    pub fn new(store: S, escalator: E, clock: C, options: RunOptions) -> Self {
        Self {
            store,
            escalator,
            clock,
            options,
        }
    }

    /// Run one complete evaluator pass.
    pub async fn run(&self) -> Result<RunSummary> {
        let now = self.clock.now();
        let today = now.date_naive();

        // -- loading_schedules ------------------------------------------------
        tracing::debug!(phase = %RunPhase::LoadingSchedules, "loading active schedules");
        let schedules = self.store.active_schedules().map_err(|e| {
            tracing::error!(
                phase = %RunPhase::Failed,
                processed_at = %now,
                error = %e,
                "could not load schedules, aborting run"
            );
            e
        })?;

        // -- evaluating -------------------------------------------------------
        tracing::debug!(
            phase = %RunPhase::Evaluating,
            schedules = schedules.len(),
            "evaluating schedules"
        );
        let mut schedules_processed = 0;
        let mut skipped_workers = 0;
        let mut details: Vec<OverdueDetail> = Vec::new();
        let mut pending: Vec<PendingEpisode> = Vec::new();

        for (schedule_idx, schedule) in schedules.iter().enumerate() {
            if self.options.deadline_passed() {
                tracing::warn!(
                    schedule = %schedule.slug,
                    "run deadline reached, stopping schedule evaluation"
                );
                break;
            }
            if !schedule.is_in_session(now) {
                tracing::debug!(schedule = %schedule.slug, "not in session, skipped");
                continue;
            }
            schedules_processed += 1;

            let assignments = match self.store.assignments_for(&schedule.slug) {
                Ok(assignments) => assignments,
                Err(e) => {
                    tracing::warn!(
                        schedule = %schedule.slug,
                        error = %e,
                        "could not load assignments, schedule skipped"
                    );
                    continue;
                }
            };

            for assignment in assignments.iter().filter(|a| a.in_effect_on(today)) {
                let latest = match self.store.latest_checkin(&assignment.worker_id) {
                    Ok(latest) => latest,
                    Err(e) => {
                        tracing::warn!(
                            worker = %assignment.worker_id,
                            schedule = %schedule.slug,
                            error = %e,
                            "could not read check-in history, worker skipped"
                        );
                        skipped_workers += 1;
                        continue;
                    }
                };

                let eval = evaluate(schedule, latest.as_ref(), now);
                if !eval.is_overdue() {
                    continue;
                }
                details.push(OverdueDetail {
                    worker_id: assignment.worker_id.clone(),
                    schedule_id: schedule.slug.clone(),
                    overdue_by_minutes: eval.overdue_by_minutes,
                    grace_expired: eval.grace_expired,
                });
                if eval.grace_expired {
                    pending.push(PendingEpisode {
                        schedule_idx,
                        worker_id: assignment.worker_id.clone(),
                        eval,
                        latest,
                    });
                }
            }
        }

        // -- dispatching ------------------------------------------------------
        let mut recorded_episodes = 0;
        let mut requests: Vec<EscalationRequest> = Vec::new();

        if !pending.is_empty() && self.options.deadline_passed() {
            tracing::warn!(
                episodes = pending.len(),
                "run deadline reached, leaving grace-expired episodes for the next pass"
            );
        } else if !pending.is_empty() {
            tracing::debug!(phase = %RunPhase::Dispatching, episodes = pending.len(), "dispatching");
            for episode in &pending {
                let schedule: &Schedule = &schedules[episode.schedule_idx];

                // The same latest-status guard gates both the write and the
                // dispatch: an episode already flagged on a previous pass is
                // neither re-recorded nor re-escalated.
                if recorder::already_recorded(episode.latest.as_ref()) {
                    tracing::debug!(
                        worker = %episode.worker_id,
                        schedule = %schedule.slug,
                        "episode already flagged, nothing to do"
                    );
                    continue;
                }

                match recorder::record_if_needed(
                    &self.store,
                    schedule,
                    &episode.worker_id,
                    &episode.eval,
                    episode.latest.as_ref(),
                    now,
                ) {
                    Ok(true) => recorded_episodes += 1,
                    Ok(false) => {}
                    // The write failed but the episode is real: escalate
                    // anyway, and the next pass will retry the write.
                    Err(e) => {
                        tracing::warn!(
                            worker = %episode.worker_id,
                            schedule = %schedule.slug,
                            error = %e,
                            "could not write overdue check-in"
                        );
                    }
                }

                requests.push(EscalationRequest {
                    worker_id: episode.worker_id.clone(),
                    schedule_id: schedule.slug.clone(),
                    organization_id: schedule.organization_id.clone(),
                    overdue_by_minutes: episode.eval.overdue_by_minutes,
                    episode_type: EpisodeType::MissedCheckIn,
                });
            }
        }

        let outcomes = dispatch_all(
            &self.escalator,
            requests,
            self.options.dispatch_limit,
            self.options.dispatch_timeout,
        )
        .await;
        let failed_dispatches = log_failed(&outcomes, now);

        // -- completed --------------------------------------------------------
        let summary = RunSummary {
            success: true,
            processed_at: now,
            schedules_processed,
            overdue_checkins: details.len(),
            overdue_details: details,
            recorded_episodes,
            failed_dispatches,
            skipped_workers,
        };
        tracing::info!(
            phase = %RunPhase::Completed,
            schedules_processed = summary.schedules_processed,
            overdue_checkins = summary.overdue_checkins,
            recorded_episodes = summary.recorded_episodes,
            failed_dispatches = summary.failed_dispatches,
            skipped_workers = summary.skipped_workers,
            "run completed"
        );
        Ok(summary)
    }
}

// ---------------------------------------------------------------------------
// Convenience entry point
// ---------------------------------------------------------------------------

/// Run one pass against the file-backed store rooted at `root`, using the
/// engine config to pick and bound the escalation collaborator. Shared by
/// the CLI `run` command and the HTTP run trigger.
pub async fn run_once(root: &std::path::Path) -> Result<RunSummary> {
    use crate::clock::SystemClock;
    use crate::config::Config;
    use crate::escalate::{NoopEscalator, WebhookEscalator};
    use crate::store::YamlStore;

    let config = Config::load(root)?;
    let store = YamlStore::new(root.to_path_buf());
    let options = RunOptions {
        dispatch_limit: config.escalation.max_concurrent,
        dispatch_timeout: Duration::from_secs(config.escalation.timeout_seconds),
        deadline: None,
    };

    match config.escalation.webhook_url {
        Some(url) => {
            Orchestrator::new(store, WebhookEscalator::new(url), SystemClock, options)
                .run()
                .await
        }
        None => {
            Orchestrator::new(store, NoopEscalator, SystemClock, options)
                .run()
                .await
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
