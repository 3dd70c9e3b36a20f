use axum::extract::State;
use axum::Json;

use vigil_core::orchestrator::{run_once, RunSummary};

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/run — run one evaluator pass.
///
/// Invoked by an external scheduler on a fixed cadence, or manually. No
/// request body. Responds 200 with the run summary even when individual
/// workers or dispatches failed; 500 only when loading the schedules (or
/// the engine config) failed, in which case nothing was evaluated.
pub async fn trigger_run(State(app): State<AppState>) -> Result<Json<RunSummary>, AppError> {
    let summary = run_once(&app.root).await?;
    Ok(Json(summary))
}
