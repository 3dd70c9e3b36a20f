pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf) -> Router {
    let app_state = state::AppState::new(root);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/api/health", get(routes::health::health))
        // Run trigger
        .route("/api/run", post(routes::run::trigger_run))
        // Schedules
        .route("/api/schedules", get(routes::schedules::list_schedules))
        .route("/api/schedules/{slug}", get(routes::schedules::get_schedule))
        // Check-ins
        .route("/api/checkins", post(routes::checkins::record_checkin))
        .route(
            "/api/workers/{id}/checkins/latest",
            get(routes::checkins::latest_checkin),
        )
        .layer(cors)
        .with_state(app_state)
}

/// Start the vigil HTTP server.
pub async fn serve(root: PathBuf, port: u16) -> anyhow::Result<()> {
    let app = build_router(root);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("vigil server listening on http://localhost:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}
