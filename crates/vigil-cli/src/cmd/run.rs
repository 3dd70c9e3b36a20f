use crate::output::{print_json, print_table};
use anyhow::Result;
use std::path::Path;
use vigil_core::orchestrator::run_once;

/// One evaluator pass against the project at `root`.
pub fn run(root: &Path, json: bool) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let summary = runtime.block_on(run_once(root))?;

    if json {
        print_json(&summary)?;
        return Ok(());
    }

    println!(
        "Run completed at {}: {} schedule(s) in session, {} overdue worker(s), {} episode(s) recorded",
        summary.processed_at,
        summary.schedules_processed,
        summary.overdue_checkins,
        summary.recorded_episodes
    );
    if summary.failed_dispatches > 0 {
        println!("  {} escalation(s) failed to deliver", summary.failed_dispatches);
    }
    if summary.skipped_workers > 0 {
        println!("  {} worker(s) skipped (history unreadable)", summary.skipped_workers);
    }
    if !summary.overdue_details.is_empty() {
        let rows = summary
            .overdue_details
            .iter()
            .map(|d| {
                vec![
                    d.worker_id.clone(),
                    d.schedule_id.clone(),
                    format!("{}m", d.overdue_by_minutes),
                    if d.grace_expired { "yes" } else { "no" }.to_string(),
                ]
            })
            .collect();
        print_table(&["WORKER", "SCHEDULE", "OVERDUE BY", "GRACE EXPIRED"], rows);
    }
    Ok(())
}
