use thiserror::Error;

#[derive(Debug, Error)]
pub enum VigilError {
    #[error("not initialized: run 'vigil init'")]
    NotInitialized,

    #[error("schedule not found: {0}")]
    ScheduleNotFound(String),

    #[error("schedule already exists: {0}")]
    ScheduleExists(String),

    #[error("assignment not found: schedule '{schedule}' worker '{worker}'")]
    AssignmentNotFound { schedule: String, worker: String },

    #[error("no check-ins recorded for worker: {0}")]
    NoCheckIns(String),

    #[error("invalid slug '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidSlug(String),

    #[error("invalid frequency: {0}")]
    InvalidFrequency(String),

    #[error("invalid check-in status: {0}")]
    InvalidCheckInStatus(String),

    #[error("invalid schedule '{slug}': {reason}")]
    InvalidSchedule { slug: String, reason: String },

    #[error("escalation failed: {0}")]
    Escalation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VigilError>;
