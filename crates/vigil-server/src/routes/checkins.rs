use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use vigil_core::checkin::CheckIn;
use vigil_core::config::Config;
use vigil_core::store::{MonitorStore, YamlStore};
use vigil_core::VigilError;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RecordBody {
    pub worker_id: String,
    /// Defaults to the configured organization.
    pub organization_id: Option<String>,
}

/// POST /api/checkins — record a manual `ok` check-in for a worker.
pub async fn record_checkin(
    State(app): State<AppState>,
    Json(body): Json<RecordBody>,
) -> Result<Json<CheckIn>, AppError> {
    let root = app.root.clone();
    let checkin = tokio::task::spawn_blocking(move || {
        let organization_id = match body.organization_id {
            Some(org) => org,
            None => Config::load(&root)?.organization_id,
        };
        let store = YamlStore::new(root);
        let checkin = CheckIn::manual_ok(body.worker_id, organization_id, Utc::now());
        store.insert_checkin(checkin.clone())?;
        Ok::<_, VigilError>(checkin)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(checkin))
}

/// GET /api/workers/:id/checkins/latest — latest check-in, 404 when the
/// worker has never checked in.
pub async fn latest_checkin(
    State(app): State<AppState>,
    Path(worker_id): Path<String>,
) -> Result<Json<CheckIn>, AppError> {
    let root = app.root.clone();
    let checkin = tokio::task::spawn_blocking(move || {
        let store = YamlStore::new(root);
        store
            .latest_checkin(&worker_id)?
            .ok_or(VigilError::NoCheckIns(worker_id))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(checkin))
}
