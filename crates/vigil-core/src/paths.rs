use crate::error::{Result, VigilError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const VIGIL_DIR: &str = ".vigil";

pub const CONFIG_FILE: &str = ".vigil/config.yaml";
pub const SCHEDULES_FILE: &str = ".vigil/schedules.yaml";
pub const ASSIGNMENTS_FILE: &str = ".vigil/assignments.yaml";
pub const CHECKINS_FILE: &str = ".vigil/checkins.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn vigil_dir(root: &Path) -> PathBuf {
    root.join(VIGIL_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn schedules_path(root: &Path) -> PathBuf {
    root.join(SCHEDULES_FILE)
}

pub fn assignments_path(root: &Path) -> PathBuf {
    root.join(ASSIGNMENTS_FILE)
}

pub fn checkins_path(root: &Path) -> PathBuf {
    root.join(CHECKINS_FILE)
}

// ---------------------------------------------------------------------------
// Slug validation
// ---------------------------------------------------------------------------

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

/// Validate a schedule slug: lowercase alphanumeric segments separated by
/// single hyphens.
pub fn validate_slug(slug: &str) -> Result<()> {
    let re = SLUG_RE.get_or_init(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap());
    if re.is_match(slug) {
        Ok(())
    } else {
        Err(VigilError::InvalidSlug(slug.to_string()))
    }
}
