use axum::extract::{Path, State};
use axum::Json;

use vigil_core::schedule::Schedule;
use vigil_core::store::YamlStore;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/schedules — all schedules, active and inactive.
pub async fn list_schedules(
    State(app): State<AppState>,
) -> Result<Json<Vec<Schedule>>, AppError> {
    let root = app.root.clone();
    let schedules = tokio::task::spawn_blocking(move || {
        let store = YamlStore::new(root);
        store.list_schedules()
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(schedules))
}

/// GET /api/schedules/:slug — single schedule detail.
pub async fn get_schedule(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Schedule>, AppError> {
    let root = app.root.clone();
    let schedule = tokio::task::spawn_blocking(move || {
        let store = YamlStore::new(root);
        store.get_schedule(&slug)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(schedule))
}
