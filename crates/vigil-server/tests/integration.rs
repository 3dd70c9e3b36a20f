use axum::http::StatusCode;
use chrono::{Duration, NaiveDate, Utc};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use vigil_core::assignment::Assignment;
use vigil_core::checkin::{CheckIn, CheckInStatus};
use vigil_core::config::Config;
use vigil_core::schedule::{Frequency, Schedule};
use vigil_core::store::{MonitorStore, YamlStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Bootstrap a minimal vigil project inside the given temp directory.
fn init_project(dir: &TempDir) -> YamlStore {
    vigil_core::io::ensure_dir(&dir.path().join(".vigil")).unwrap();
    Config::new("acme").save(dir.path()).unwrap();
    YamlStore::new(dir.path())
}

/// A schedule with `once` frequency so tests pass on any day of the week.
fn any_day_schedule(slug: &str, interval: i64, grace: i64) -> Schedule {
    Schedule {
        slug: slug.to_string(),
        organization_id: "acme".to_string(),
        name: slug.to_string(),
        check_in_interval_minutes: interval,
        grace_period_minutes: grace,
        active_window: None,
        frequency: Frequency::Once,
        days_of_week: Vec::new(),
        is_active: true,
        created_at: Utc::now(),
    }
}

fn assignment(slug: &str, worker: &str) -> Assignment {
    Assignment {
        schedule_id: slug.to_string(),
        worker_id: worker.to_string(),
        start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        end_date: None,
        is_active: true,
    }
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a POST request with a JSON body via `oneshot` and return (status, parsed JSON body).
async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// POST with an empty body (the run trigger takes none).
async fn post_empty(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_ok() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = vigil_server::build_router(dir.path().to_path_buf());
    let (status, json) = get(app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

// ---------------------------------------------------------------------------
// Run trigger
// ---------------------------------------------------------------------------

#[tokio::test]
async fn run_on_uninitialized_root_is_500() {
    let dir = TempDir::new().unwrap();
    let app = vigil_server::build_router(dir.path().to_path_buf());
    let (status, json) = post_empty(app, "/api/run").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("not initialized"));
}

#[tokio::test]
async fn run_with_no_schedules_reports_empty_summary() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = vigil_server::build_router(dir.path().to_path_buf());
    let (status, json) = post_empty(app, "/api/run").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["schedules_processed"], 0);
    assert_eq!(json["overdue_checkins"], 0);
    assert_eq!(json["overdue_details"], serde_json::json!([]));
}

#[tokio::test]
async fn run_records_and_reports_grace_expired_worker() {
    let dir = TempDir::new().unwrap();
    let store = init_project(&dir);
    store
        .create_schedule(any_day_schedule("patrol", 15, 5))
        .unwrap();
    store.create_assignment(assignment("patrol", "w-alice")).unwrap();
    store
        .insert_checkin(CheckIn::manual_ok(
            "w-alice",
            "acme",
            Utc::now() - Duration::minutes(25),
        ))
        .unwrap();

    let app = vigil_server::build_router(dir.path().to_path_buf());
    let (status, json) = post_empty(app, "/api/run").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["schedules_processed"], 1);
    assert_eq!(json["overdue_checkins"], 1);
    assert_eq!(json["recorded_episodes"], 1);
    let detail = &json["overdue_details"][0];
    assert_eq!(detail["worker_id"], "w-alice");
    assert_eq!(detail["schedule_id"], "patrol");
    assert_eq!(detail["overdue_by_minutes"], 10);
    assert_eq!(detail["grace_expired"], true);

    // One overdue row written, carrying the episode metadata.
    let rows = store.checkins_for("w-alice").unwrap();
    let overdue: Vec<_> = rows
        .iter()
        .filter(|c| c.status == CheckInStatus::Overdue)
        .collect();
    assert_eq!(overdue.len(), 1);
    assert!(!overdue[0].is_manual);
    assert_eq!(overdue[0].meta.as_ref().unwrap().schedule_id, "patrol");
}

#[tokio::test]
async fn second_run_does_not_duplicate_the_episode() {
    let dir = TempDir::new().unwrap();
    let store = init_project(&dir);
    store
        .create_schedule(any_day_schedule("patrol", 15, 5))
        .unwrap();
    store.create_assignment(assignment("patrol", "w-alice")).unwrap();
    store
        .insert_checkin(CheckIn::manual_ok(
            "w-alice",
            "acme",
            Utc::now() - Duration::minutes(25),
        ))
        .unwrap();

    let app = vigil_server::build_router(dir.path().to_path_buf());
    let (status, _) = post_empty(app.clone(), "/api/run").await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = post_empty(app, "/api/run").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["recorded_episodes"], 0);

    let rows = store.checkins_for("w-alice").unwrap();
    assert_eq!(
        rows.iter()
            .filter(|c| c.status == CheckInStatus::Overdue)
            .count(),
        1
    );
}

#[tokio::test]
async fn fresh_manual_checkin_means_no_overdue() {
    let dir = TempDir::new().unwrap();
    let store = init_project(&dir);
    store
        .create_schedule(any_day_schedule("patrol", 15, 5))
        .unwrap();
    store.create_assignment(assignment("patrol", "w-alice")).unwrap();

    let app = vigil_server::build_router(dir.path().to_path_buf());
    let (status, checkin) = post_json(
        app.clone(),
        "/api/checkins",
        serde_json::json!({ "worker_id": "w-alice" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(checkin["status"], "ok");
    assert_eq!(checkin["is_manual"], true);
    assert_eq!(checkin["organization_id"], "acme");

    let (status, json) = post_empty(app, "/api/run").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["overdue_checkins"], 0);
    assert_eq!(json["recorded_episodes"], 0);
}

// ---------------------------------------------------------------------------
// Check-ins
// ---------------------------------------------------------------------------

#[tokio::test]
async fn latest_checkin_roundtrip() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = vigil_server::build_router(dir.path().to_path_buf());

    let (status, _) = post_json(
        app.clone(),
        "/api/checkins",
        serde_json::json!({ "worker_id": "w-alice", "organization_id": "other" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = get(app, "/api/workers/w-alice/checkins/latest").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["worker_id"], "w-alice");
    assert_eq!(json["organization_id"], "other");
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn latest_checkin_for_unknown_worker_is_404() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = vigil_server::build_router(dir.path().to_path_buf());
    let (status, _) = get(app, "/api/workers/w-ghost/checkins/latest").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_and_get_schedules() {
    let dir = TempDir::new().unwrap();
    let store = init_project(&dir);
    store
        .create_schedule(any_day_schedule("patrol", 30, 10))
        .unwrap();
    store.set_schedule_active("patrol", false).unwrap();

    let app = vigil_server::build_router(dir.path().to_path_buf());
    let (status, json) = get(app.clone(), "/api/schedules").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["slug"], "patrol");
    assert_eq!(json[0]["is_active"], false);

    let (status, json) = get(app.clone(), "/api/schedules/patrol").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["check_in_interval_minutes"], 30);

    let (status, _) = get(app, "/api/schedules/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
