use crate::error::VigilError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// CheckInStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInStatus {
    Ok,
    Overdue,
}

impl CheckInStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckInStatus::Ok => "ok",
            CheckInStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for CheckInStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CheckInStatus {
    type Err = VigilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ok" => Ok(CheckInStatus::Ok),
            "overdue" => Ok(CheckInStatus::Overdue),
            _ => Err(VigilError::InvalidCheckInStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// CheckIn
// ---------------------------------------------------------------------------

/// What the engine writes alongside an automatic overdue check-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInMeta {
    pub schedule_id: String,
    pub overdue_by_minutes: i64,
    pub processed_at: DateTime<Utc>,
}

/// A check-in event. Append-only: the engine never mutates or deletes one,
/// it only inserts new rows. The latest check-in for a worker is the one
/// with the greatest timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: uuid::Uuid,
    pub worker_id: String,
    pub organization_id: String,
    pub timestamp: DateTime<Utc>,
    pub status: CheckInStatus,
    pub is_manual: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<CheckInMeta>,
}

impl CheckIn {
    /// A worker's own safety confirmation.
    pub fn manual_ok(
        worker_id: impl Into<String>,
        organization_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            worker_id: worker_id.into(),
            organization_id: organization_id.into(),
            timestamp,
            status: CheckInStatus::Ok,
            is_manual: true,
            meta: None,
        }
    }

    /// An engine-written overdue marker for a grace-expired episode.
    pub fn automatic_overdue(
        worker_id: impl Into<String>,
        organization_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        meta: CheckInMeta,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            worker_id: worker_id.into(),
            organization_id: organization_id.into(),
            timestamp,
            status: CheckInStatus::Overdue,
            is_manual: false,
            meta: Some(meta),
        }
    }
}
