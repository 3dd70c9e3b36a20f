use crate::output::{print_json, print_table};
use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use std::path::Path;
use vigil_core::checkin::CheckIn;
use vigil_core::config::Config;
use vigil_core::store::{MonitorStore, YamlStore};
use vigil_core::VigilError;

// ---------------------------------------------------------------------------
// Subcommand definition
// ---------------------------------------------------------------------------

#[derive(Subcommand, Debug)]
pub enum CheckinSubcommand {
    /// Record a manual safety check-in for a worker
    Record {
        /// Worker identifier
        worker: String,
        /// Organization (defaults to the configured one)
        #[arg(long)]
        org: Option<String>,
    },
    /// Show a worker's most recent check-in
    Latest {
        /// Worker identifier
        worker: String,
    },
    /// List a worker's check-in history, oldest first
    List {
        /// Worker identifier
        worker: String,
    },
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcommand: CheckinSubcommand, json: bool) -> Result<()> {
    let store = YamlStore::new(root);
    match subcommand {
        CheckinSubcommand::Record { worker, org } => {
            let organization_id = match org {
                Some(org) => org,
                None => Config::load(root)?.organization_id,
            };
            let checkin = CheckIn::manual_ok(worker, organization_id, Utc::now());
            store.insert_checkin(checkin.clone())?;
            if json {
                print_json(&checkin)?;
            } else {
                println!(
                    "Recorded check-in for '{}' at {}",
                    checkin.worker_id, checkin.timestamp
                );
            }
            Ok(())
        }

        CheckinSubcommand::Latest { worker } => {
            let checkin = store
                .latest_checkin(&worker)?
                .ok_or(VigilError::NoCheckIns(worker))?;
            if json {
                print_json(&checkin)?;
            } else {
                println!(
                    "{}  {}  {}",
                    checkin.timestamp,
                    checkin.status,
                    if checkin.is_manual { "manual" } else { "automatic" }
                );
            }
            Ok(())
        }

        CheckinSubcommand::List { worker } => {
            let checkins = store.checkins_for(&worker)?;
            if json {
                print_json(&checkins)?;
            } else {
                let rows = checkins
                    .iter()
                    .map(|c| {
                        vec![
                            c.timestamp.to_rfc3339(),
                            c.status.to_string(),
                            if c.is_manual { "manual" } else { "automatic" }.to_string(),
                            c.meta
                                .as_ref()
                                .map_or("-".to_string(), |m| m.schedule_id.clone()),
                        ]
                    })
                    .collect();
                print_table(&["TIMESTAMP", "STATUS", "SOURCE", "SCHEDULE"], rows);
            }
            Ok(())
        }
    }
}
