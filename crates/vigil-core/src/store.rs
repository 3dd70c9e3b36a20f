//! Data access for schedules, assignments, and check-ins.
//!
//! The orchestrator only sees the `MonitorStore` trait, injected explicitly
//! so tests run against `MemoryStore` instead of a live store. `YamlStore`
//! is the file-backed implementation used by the CLI and server:
//!
//!   .vigil/schedules.yaml    — all schedules
//!   .vigil/assignments.yaml  — all assignments
//!   .vigil/checkins.yaml     — append-only check-in log

use crate::assignment::Assignment;
use crate::checkin::CheckIn;
use crate::error::{Result, VigilError};
use crate::io;
use crate::paths;
use crate::schedule::Schedule;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// MonitorStore trait
// ---------------------------------------------------------------------------

/// The read/write surface the evaluator needs from a data store.
pub trait MonitorStore: Send + Sync {
    /// All schedules with `is_active` set.
    fn active_schedules(&self) -> Result<Vec<Schedule>>;

    /// All assignments for a schedule, active or not; the caller applies
    /// the `in_effect_on` date filter.
    fn assignments_for(&self, schedule_id: &str) -> Result<Vec<Assignment>>;

    /// The worker's check-in with the greatest timestamp, if any.
    fn latest_checkin(&self, worker_id: &str) -> Result<Option<CheckIn>>;

    /// Append one check-in row. Check-ins are never mutated or deleted.
    fn insert_checkin(&self, checkin: CheckIn) -> Result<()>;
}

fn latest_of(checkins: impl Iterator<Item = CheckIn>) -> Option<CheckIn> {
    checkins.max_by_key(|c| c.timestamp)
}

// ---------------------------------------------------------------------------
// YamlStore
// ---------------------------------------------------------------------------

/// File-backed store rooted at a project directory.
#[derive(Debug, Clone)]
pub struct YamlStore {
    root: PathBuf,
}

impl YamlStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn load_list<T: serde::de::DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    fn save_list<T: serde::Serialize>(&self, path: &Path, items: &[T]) -> Result<()> {
        let content = serde_yaml::to_string(items)?;
        io::atomic_write(path, content.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Schedule administration
    // -----------------------------------------------------------------------

    pub fn list_schedules(&self) -> Result<Vec<Schedule>> {
        self.load_list(&paths::schedules_path(&self.root))
    }

    pub fn get_schedule(&self, slug: &str) -> Result<Schedule> {
        self.list_schedules()?
            .into_iter()
            .find(|s| s.slug == slug)
            .ok_or_else(|| VigilError::ScheduleNotFound(slug.to_string()))
    }

    /// Create a schedule. Validates it first and rejects duplicate slugs.
    pub fn create_schedule(&self, schedule: Schedule) -> Result<Schedule> {
        schedule.validate()?;
        let mut schedules = self.list_schedules()?;
        if schedules.iter().any(|s| s.slug == schedule.slug) {
            return Err(VigilError::ScheduleExists(schedule.slug));
        }
        schedules.push(schedule.clone());
        self.save_list(&paths::schedules_path(&self.root), &schedules)?;
        Ok(schedule)
    }

    pub fn set_schedule_active(&self, slug: &str, is_active: bool) -> Result<Schedule> {
        let mut schedules = self.list_schedules()?;
        let schedule = schedules
            .iter_mut()
            .find(|s| s.slug == slug)
            .ok_or_else(|| VigilError::ScheduleNotFound(slug.to_string()))?;
        schedule.is_active = is_active;
        let updated = schedule.clone();
        self.save_list(&paths::schedules_path(&self.root), &schedules)?;
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Assignment administration
    // -----------------------------------------------------------------------

    pub fn list_assignments(&self) -> Result<Vec<Assignment>> {
        self.load_list(&paths::assignments_path(&self.root))
    }

    /// Create an assignment. The schedule must exist.
    pub fn create_assignment(&self, assignment: Assignment) -> Result<Assignment> {
        self.get_schedule(&assignment.schedule_id)?;
        let mut assignments = self.list_assignments()?;
        assignments.push(assignment.clone());
        self.save_list(&paths::assignments_path(&self.root), &assignments)?;
        Ok(assignment)
    }

    /// End the active assignment of `worker_id` on `schedule_id` as of
    /// `end_date`.
    pub fn end_assignment(
        &self,
        schedule_id: &str,
        worker_id: &str,
        end_date: NaiveDate,
    ) -> Result<Assignment> {
        let mut assignments = self.list_assignments()?;
        let assignment = assignments
            .iter_mut()
            .find(|a| a.schedule_id == schedule_id && a.worker_id == worker_id && a.is_active)
            .ok_or_else(|| VigilError::AssignmentNotFound {
                schedule: schedule_id.to_string(),
                worker: worker_id.to_string(),
            })?;
        assignment.end_date = Some(end_date);
        let updated = assignment.clone();
        self.save_list(&paths::assignments_path(&self.root), &assignments)?;
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Check-in queries
    // -----------------------------------------------------------------------

    pub fn checkins_for(&self, worker_id: &str) -> Result<Vec<CheckIn>> {
        let mut checkins: Vec<CheckIn> = self
            .load_list::<CheckIn>(&paths::checkins_path(&self.root))?
            .into_iter()
            .filter(|c| c.worker_id == worker_id)
            .collect();
        checkins.sort_by_key(|c| c.timestamp);
        Ok(checkins)
    }
}

impl MonitorStore for YamlStore {
    fn active_schedules(&self) -> Result<Vec<Schedule>> {
        if !paths::vigil_dir(&self.root).is_dir() {
            return Err(VigilError::NotInitialized);
        }
        Ok(self
            .list_schedules()?
            .into_iter()
            .filter(|s| s.is_active)
            .collect())
    }

    fn assignments_for(&self, schedule_id: &str) -> Result<Vec<Assignment>> {
        Ok(self
            .list_assignments()?
            .into_iter()
            .filter(|a| a.schedule_id == schedule_id)
            .collect())
    }

    fn latest_checkin(&self, worker_id: &str) -> Result<Option<CheckIn>> {
        let checkins: Vec<CheckIn> = self.load_list(&paths::checkins_path(&self.root))?;
        Ok(latest_of(
            checkins.into_iter().filter(|c| c.worker_id == worker_id),
        ))
    }

    fn insert_checkin(&self, checkin: CheckIn) -> Result<()> {
        let path = paths::checkins_path(&self.root);
        let mut checkins: Vec<CheckIn> = self.load_list(&path)?;
        checkins.push(checkin);
        self.save_list(&path, &checkins)
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemoryInner {
    schedules: Vec<Schedule>,
    assignments: Vec<Assignment>,
    checkins: Vec<CheckIn>,
}

/// In-memory store for deterministic tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_schedule(&self, schedule: Schedule) {
        self.inner.lock().unwrap().schedules.push(schedule);
    }

    pub fn add_assignment(&self, assignment: Assignment) {
        self.inner.lock().unwrap().assignments.push(assignment);
    }

    pub fn add_checkin(&self, checkin: CheckIn) {
        self.inner.lock().unwrap().checkins.push(checkin);
    }

    pub fn checkins(&self) -> Vec<CheckIn> {
        self.inner.lock().unwrap().checkins.clone()
    }
}

impl MonitorStore for MemoryStore {
    fn active_schedules(&self) -> Result<Vec<Schedule>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .schedules
            .iter()
            .filter(|s| s.is_active)
            .cloned()
            .collect())
    }

    fn assignments_for(&self, schedule_id: &str) -> Result<Vec<Assignment>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .assignments
            .iter()
            .filter(|a| a.schedule_id == schedule_id)
            .cloned()
            .collect())
    }

    fn latest_checkin(&self, worker_id: &str) -> Result<Option<CheckIn>> {
        let inner = self.inner.lock().unwrap();
        Ok(latest_of(
            inner
                .checkins
                .iter()
                .filter(|c| c.worker_id == worker_id)
                .cloned(),
        ))
    }

    fn insert_checkin(&self, checkin: CheckIn) -> Result<()> {
        self.inner.lock().unwrap().checkins.push(checkin);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
