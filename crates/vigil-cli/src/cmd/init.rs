use anyhow::Result;
use std::path::Path;
use vigil_core::config::Config;
use vigil_core::{io, paths};

/// Initialize a vigil project: the `.vigil` directory, a default config,
/// and empty state files. Idempotent; existing files are left alone.
pub fn run(root: &Path, organization: &str) -> Result<()> {
    io::ensure_dir(&paths::vigil_dir(root))?;

    let wrote_config = if paths::config_path(root).exists() {
        false
    } else {
        Config::new(organization).save(root)?;
        true
    };

    io::write_if_missing(&paths::schedules_path(root), b"[]\n")?;
    io::write_if_missing(&paths::assignments_path(root), b"[]\n")?;
    io::write_if_missing(&paths::checkins_path(root), b"[]\n")?;

    if wrote_config {
        println!("Initialized vigil project in {}", root.display());
    } else {
        println!("vigil project already initialized in {}", root.display());
    }
    Ok(())
}
