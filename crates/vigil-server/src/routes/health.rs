use axum::Json;

/// GET /api/health — liveness probe for the external scheduler.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
