//! Escalation dispatch — fan out alerts to the external notification
//! collaborator with bounded concurrency and per-call timeouts.
//!
//! A failed dispatch is collected, never propagated: it is picked up again
//! only if the episode remains unresolved by the next scheduled run
//! (at-least-once-but-usually-once, not exactly-once).

use crate::error::{Result, VigilError};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeType {
    MissedCheckIn,
}

impl fmt::Display for EpisodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpisodeType::MissedCheckIn => f.write_str("missed_check_in"),
        }
    }
}

/// The payload handed to the escalation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationRequest {
    pub worker_id: String,
    pub schedule_id: String,
    pub organization_id: String,
    pub overdue_by_minutes: i64,
    pub episode_type: EpisodeType,
}

/// Per-episode dispatch result; failures carry the error text for the run
/// summary and logs, nothing more.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchOutcome {
    pub request: EscalationRequest,
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Escalator
// ---------------------------------------------------------------------------

/// The external escalation collaborator, fire-and-forget per episode.
pub trait Escalator: Send + Sync {
    fn escalate(&self, request: EscalationRequest) -> impl Future<Output = Result<()>> + Send;
}

/// POSTs the escalation request as JSON to a configured webhook.
#[derive(Debug, Clone)]
pub struct WebhookEscalator {
    client: reqwest::Client,
    url: String,
}

impl WebhookEscalator {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

impl Escalator for WebhookEscalator {
    async fn escalate(&self, request: EscalationRequest) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| VigilError::Escalation(e.to_string()))?;
        if !response.status().is_success() {
            return Err(VigilError::Escalation(format!(
                "webhook returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Used when no webhook is configured: logs the alert and succeeds, so the
/// rest of the engine (recording, summaries) behaves identically.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEscalator;

impl Escalator for NoopEscalator {
    async fn escalate(&self, request: EscalationRequest) -> Result<()> {
        tracing::info!(
            worker = %request.worker_id,
            schedule = %request.schedule_id,
            overdue_by_minutes = request.overdue_by_minutes,
            "no escalation webhook configured, alert logged only"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fan-out
// ---------------------------------------------------------------------------

/// Dispatch every request with at most `limit` calls in flight and a
/// per-call timeout. No retry within a run; outcomes are collected, not
/// propagated.
pub async fn dispatch_all<E: Escalator>(
    escalator: &E,
    requests: Vec<EscalationRequest>,
    limit: usize,
    per_call_timeout: Duration,
) -> Vec<DispatchOutcome> {
    futures::stream::iter(requests)
        .map(|request| async move {
            let result =
                tokio::time::timeout(per_call_timeout, escalator.escalate(request.clone())).await;
            match result {
                Ok(Ok(())) => DispatchOutcome {
                    request,
                    delivered: true,
                    error: None,
                },
                Ok(Err(e)) => {
                    tracing::warn!(
                        worker = %request.worker_id,
                        schedule = %request.schedule_id,
                        error = %e,
                        "escalation dispatch failed"
                    );
                    DispatchOutcome {
                        request,
                        delivered: false,
                        error: Some(e.to_string()),
                    }
                }
                Err(_) => {
                    tracing::warn!(
                        worker = %request.worker_id,
                        schedule = %request.schedule_id,
                        timeout_ms = per_call_timeout.as_millis() as u64,
                        "escalation dispatch timed out"
                    );
                    DispatchOutcome {
                        request,
                        delivered: false,
                        error: Some("dispatch timed out".to_string()),
                    }
                }
            }
        })
        .buffer_unordered(limit.max(1))
        .collect()
        .await
}

/// Timestamped failure report, logged with enough context for manual replay.
pub fn log_failed(outcomes: &[DispatchOutcome], processed_at: DateTime<Utc>) -> usize {
    let failed: Vec<&DispatchOutcome> = outcomes.iter().filter(|o| !o.delivered).collect();
    for outcome in &failed {
        tracing::warn!(
            worker = %outcome.request.worker_id,
            schedule = %outcome.request.schedule_id,
            processed_at = %processed_at,
            error = outcome.error.as_deref().unwrap_or("unknown"),
            "escalation not delivered this run"
        );
    }
    failed.len()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn request(worker: &str) -> EscalationRequest {
        EscalationRequest {
            worker_id: worker.to_string(),
            schedule_id: "patrol".to_string(),
            organization_id: "acme".to_string(),
            overdue_by_minutes: 15,
            episode_type: EpisodeType::MissedCheckIn,
        }
    }

    /// Escalator that records calls and fails for selected workers.
    #[derive(Default)]
    struct RecordingEscalator {
        calls: Mutex<Vec<String>>,
        fail_for: Vec<String>,
    }

    impl Escalator for RecordingEscalator {
        async fn escalate(&self, request: EscalationRequest) -> Result<()> {
            self.calls.lock().unwrap().push(request.worker_id.clone());
            if self.fail_for.contains(&request.worker_id) {
                return Err(VigilError::Escalation("refused".to_string()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn dispatches_every_request() {
        let escalator = RecordingEscalator::default();
        let requests = vec![request("w-1"), request("w-2"), request("w-3")];
        let outcomes = dispatch_all(&escalator, requests, 2, Duration::from_secs(1)).await;
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(|o| o.delivered));
        let mut calls = escalator.calls.lock().unwrap().clone();
        calls.sort();
        assert_eq!(calls, vec!["w-1", "w-2", "w-3"]);
    }

    #[tokio::test]
    async fn failure_is_isolated_per_request() {
        let escalator = RecordingEscalator {
            fail_for: vec!["w-2".to_string()],
            ..Default::default()
        };
        let requests = vec![request("w-1"), request("w-2"), request("w-3")];
        let outcomes = dispatch_all(&escalator, requests, 8, Duration::from_secs(1)).await;
        let delivered: Vec<&str> = outcomes
            .iter()
            .filter(|o| o.delivered)
            .map(|o| o.request.worker_id.as_str())
            .collect();
        assert_eq!(delivered.len(), 2);
        let failed: Vec<&DispatchOutcome> = outcomes.iter().filter(|o| !o.delivered).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].request.worker_id, "w-2");
        assert!(failed[0].error.as_deref().unwrap().contains("refused"));
    }

    /// Escalator that never completes, to exercise the per-call timeout.
    struct StalledEscalator(AtomicUsize);

    impl Escalator for StalledEscalator {
        async fn escalate(&self, _request: EscalationRequest) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            std::future::pending::<()>().await;
            unreachable!()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn per_call_timeout_applies() {
        let escalator = StalledEscalator(AtomicUsize::new(0));
        let outcomes =
            dispatch_all(&escalator, vec![request("w-1")], 1, Duration::from_millis(50)).await;
        assert_eq!(outcomes.len(), 1);
        assert!(!outcomes[0].delivered);
        assert_eq!(outcomes[0].error.as_deref(), Some("dispatch timed out"));
        assert_eq!(escalator.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn webhook_escalator_posts_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/alerts")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "worker_id": "w-1",
                "schedule_id": "patrol",
                "episode_type": "missed_check_in",
            })))
            .with_status(200)
            .create_async()
            .await;

        let escalator = WebhookEscalator::new(format!("{}/alerts", server.url()));
        escalator.escalate(request("w-1")).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn webhook_escalator_surfaces_http_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/alerts")
            .with_status(503)
            .create_async()
            .await;

        let escalator = WebhookEscalator::new(format!("{}/alerts", server.url()));
        let err = escalator.escalate(request("w-1")).await.unwrap_err();
        assert!(matches!(err, VigilError::Escalation(_)));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn episode_type_serializes_as_tag() {
        let json = serde_json::to_string(&EpisodeType::MissedCheckIn).unwrap();
        assert_eq!(json, "\"missed_check_in\"");
        assert_eq!(EpisodeType::MissedCheckIn.to_string(), "missed_check_in");
    }
}
