use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use vigil_core::VigilError;

/// Unified error type for HTTP responses.
///
/// The run trigger contract: 200 with a summary even when individual
/// workers or dispatches failed, 500 only when the run could not load its
/// inputs at all. That falls out of the mapping below because everything
/// recoverable is absorbed inside the orchestrator and never reaches here.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if let Some(e) = self.0.downcast_ref::<VigilError>() {
            match e {
                VigilError::ScheduleNotFound(_)
                | VigilError::AssignmentNotFound { .. }
                | VigilError::NoCheckIns(_) => StatusCode::NOT_FOUND,
                VigilError::ScheduleExists(_) => StatusCode::CONFLICT,
                VigilError::InvalidSlug(_)
                | VigilError::InvalidFrequency(_)
                | VigilError::InvalidCheckInStatus(_)
                | VigilError::InvalidSchedule { .. } => StatusCode::BAD_REQUEST,
                VigilError::NotInitialized
                | VigilError::Escalation(_)
                | VigilError::Io(_)
                | VigilError::Yaml(_)
                | VigilError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
