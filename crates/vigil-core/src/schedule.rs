use crate::error::{Result, VigilError};
use crate::paths;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Frequency
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Custom,
    Once,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Custom => "custom",
            Frequency::Once => "once",
        }
    }

    /// Weekly and custom schedules are meaningless without a day set.
    pub fn requires_days(self) -> bool {
        matches!(self, Frequency::Weekly | Frequency::Custom)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Frequency {
    type Err = VigilError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "custom" => Ok(Frequency::Custom),
            "once" => Ok(Frequency::Once),
            _ => Err(VigilError::InvalidFrequency(format!(
                "unknown frequency '{s}': must be daily, weekly, custom, or once"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ActiveWindow
// ---------------------------------------------------------------------------

/// Daily time-of-day window, stored as `"HH:MM"` strings and compared
/// lexically (both bounds inclusive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveWindow {
    pub start: String,
    pub end: String,
}

impl ActiveWindow {
    pub fn contains(&self, time_of_day: &str) -> bool {
        self.start.as_str() <= time_of_day && time_of_day <= self.end.as_str()
    }

    fn validate(&self) -> std::result::Result<(), String> {
        for bound in [&self.start, &self.end] {
            if !is_hhmm(bound) {
                return Err(format!("window bound '{bound}' is not HH:MM"));
            }
        }
        if self.start > self.end {
            return Err(format!(
                "window start '{}' is after end '{}'",
                self.start, self.end
            ));
        }
        Ok(())
    }
}

fn is_hhmm(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let digits = s[..2]
        .chars()
        .chain(s[3..].chars())
        .all(|c| c.is_ascii_digit());
    if !digits {
        return false;
    }
    s[..2].parse::<u8>().is_ok_and(|h| h < 24) && s[3..].parse::<u8>().is_ok_and(|m| m < 60)
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// A monitoring policy: how often a worker must check in, how much grace
/// they get past the due instant, and when the policy is in session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub slug: String,
    pub organization_id: String,
    pub name: String,
    pub check_in_interval_minutes: i64,
    pub grace_period_minutes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_window: Option<ActiveWindow>,
    pub frequency: Frequency,
    /// Weekday numbers 1–7, Monday=1. Required non-empty for weekly/custom.
    #[serde(default)]
    pub days_of_week: Vec<u8>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Schedule {
    pub fn check_in_interval(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.check_in_interval_minutes)
    }

    /// Structural validation, enforced at creation time. A schedule that
    /// slips through malformed (e.g. hand-edited YAML) is simply treated as
    /// never-in-session by `is_in_session`, not a crash.
    pub fn validate(&self) -> Result<()> {
        paths::validate_slug(&self.slug)?;
        let invalid = |reason: String| VigilError::InvalidSchedule {
            slug: self.slug.clone(),
            reason,
        };
        if self.check_in_interval_minutes <= 0 {
            return Err(invalid("check-in interval must be positive".to_string()));
        }
        if self.grace_period_minutes < 0 {
            return Err(invalid("grace period must not be negative".to_string()));
        }
        if self.frequency.requires_days() && self.days_of_week.is_empty() {
            return Err(invalid(format!(
                "frequency '{}' requires at least one day of week",
                self.frequency
            )));
        }
        if let Some(day) = self.days_of_week.iter().find(|d| !(1..=7).contains(*d)) {
            return Err(invalid(format!("day of week {day} out of range 1-7")));
        }
        if let Some(window) = &self.active_window {
            window.validate().map_err(invalid)?;
        }
        Ok(())
    }

    /// Is this schedule in session at `now`? Pure; no side effects.
    ///
    /// Day gating:
    /// - weekly/custom: only on listed days; an empty day set (malformed)
    ///   means never in session
    /// - daily: Monday–Friday only, a deliberate policy
    /// - once: no day gating (one-time schedules are deactivated after
    ///   completion by their administrator, not here)
    ///
    /// Then the optional active window gates on time of day, lexical HH:MM,
    /// both bounds inclusive.
    pub fn is_in_session(&self, now: DateTime<Utc>) -> bool {
        let weekday = weekday_number(now);

        match self.frequency {
            Frequency::Weekly | Frequency::Custom => {
                if !self.days_of_week.contains(&weekday) {
                    return false;
                }
            }
            Frequency::Daily => {
                if weekday > 5 {
                    return false;
                }
            }
            Frequency::Once => {}
        }

        if let Some(window) = &self.active_window {
            let time_of_day = now.format("%H:%M").to_string();
            if !window.contains(&time_of_day) {
                return false;
            }
        }

        true
    }
}

/// Weekday as 1=Monday..7=Sunday. Derived from the raw Sunday=0 numbering
/// with Sunday remapped to 7, preserving the upstream convention.
pub fn weekday_number(now: DateTime<Utc>) -> u8 {
    let raw = now.weekday().num_days_from_sunday() as u8;
    if raw == 0 {
        7
    } else {
        raw
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
