use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Links a schedule to a worker for a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub schedule_id: String,
    pub worker_id: String,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
}

impl Assignment {
    /// An assignment is in effect on `date` iff it is active, has started,
    /// and has not ended (an unset end date means open-ended).
    pub fn in_effect_on(&self, date: NaiveDate) -> bool {
        self.is_active
            && self.start_date <= date
            && self.end_date.map_or(true, |end| end >= date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn assignment(start: NaiveDate, end: Option<NaiveDate>) -> Assignment {
        Assignment {
            schedule_id: "night-shift".to_string(),
            worker_id: "w-alice".to_string(),
            start_date: start,
            end_date: end,
            is_active: true,
        }
    }

    #[test]
    fn open_ended_assignment() {
        let a = assignment(date(2025, 1, 1), None);
        assert!(a.in_effect_on(date(2025, 1, 1)));
        assert!(a.in_effect_on(date(2030, 12, 31)));
        assert!(!a.in_effect_on(date(2024, 12, 31)));
    }

    #[test]
    fn end_date_is_inclusive() {
        let a = assignment(date(2025, 1, 1), Some(date(2025, 1, 31)));
        assert!(a.in_effect_on(date(2025, 1, 31)));
        assert!(!a.in_effect_on(date(2025, 2, 1)));
    }

    #[test]
    fn inactive_assignment_never_in_effect() {
        let mut a = assignment(date(2025, 1, 1), None);
        a.is_active = false;
        assert!(!a.in_effect_on(date(2025, 6, 1)));
    }
}
