use crate::output::{print_json, print_table};
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use std::path::Path;
use vigil_core::assignment::Assignment;
use vigil_core::store::YamlStore;

// ---------------------------------------------------------------------------
// Subcommand definition
// ---------------------------------------------------------------------------

#[derive(Subcommand, Debug)]
pub enum AssignSubcommand {
    /// Put a worker on a schedule
    Add {
        /// Schedule slug
        schedule: String,
        /// Worker identifier
        worker: String,
        /// First date the assignment applies, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last date the assignment applies, YYYY-MM-DD (defaults to open-ended)
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// List assignments
    List {
        /// Only assignments for this schedule
        #[arg(long)]
        schedule: Option<String>,
    },
    /// End a worker's assignment as of a date
    End {
        /// Schedule slug
        schedule: String,
        /// Worker identifier
        worker: String,
        /// Last applicable date, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcommand: AssignSubcommand, json: bool) -> Result<()> {
    let store = YamlStore::new(root);
    let today = Utc::now().date_naive();

    match subcommand {
        AssignSubcommand::Add {
            schedule,
            worker,
            start,
            end,
        } => {
            let assignment = store.create_assignment(Assignment {
                schedule_id: schedule,
                worker_id: worker,
                start_date: start.unwrap_or(today),
                end_date: end,
                is_active: true,
            })?;
            if json {
                print_json(&assignment)?;
            } else {
                println!(
                    "Assigned worker '{}' to schedule '{}' from {}",
                    assignment.worker_id, assignment.schedule_id, assignment.start_date
                );
            }
            Ok(())
        }

        AssignSubcommand::List { schedule } => {
            let assignments: Vec<Assignment> = store
                .list_assignments()?
                .into_iter()
                .filter(|a| schedule.as_deref().map_or(true, |s| a.schedule_id == s))
                .collect();
            if json {
                print_json(&assignments)?;
            } else {
                let rows = assignments
                    .iter()
                    .map(|a| {
                        vec![
                            a.schedule_id.clone(),
                            a.worker_id.clone(),
                            a.start_date.to_string(),
                            a.end_date.map_or("-".to_string(), |d| d.to_string()),
                            if a.in_effect_on(today) { "in effect" } else { "-" }.to_string(),
                        ]
                    })
                    .collect();
                print_table(&["SCHEDULE", "WORKER", "START", "END", "TODAY"], rows);
            }
            Ok(())
        }

        AssignSubcommand::End {
            schedule,
            worker,
            date,
        } => {
            let end_date = date.unwrap_or(today);
            let assignment = store.end_assignment(&schedule, &worker, end_date)?;
            println!(
                "Ended assignment of '{}' on '{}' as of {}",
                assignment.worker_id, assignment.schedule_id, end_date
            );
            Ok(())
        }
    }
}
