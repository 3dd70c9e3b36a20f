use crate::output::{print_json, print_table};
use anyhow::{bail, Result};
use chrono::Utc;
use clap::Subcommand;
use std::path::Path;
use vigil_core::config::Config;
use vigil_core::schedule::{ActiveWindow, Frequency, Schedule};
use vigil_core::store::YamlStore;

// ---------------------------------------------------------------------------
// Subcommand definition
// ---------------------------------------------------------------------------

#[derive(Subcommand, Debug)]
pub enum ScheduleSubcommand {
    /// Create a monitoring schedule
    Add {
        /// Schedule slug (lowercase alphanumeric with hyphens)
        slug: String,
        /// Human-readable name (defaults to the slug)
        #[arg(long)]
        name: Option<String>,
        /// Owning organization (defaults to the configured one)
        #[arg(long)]
        org: Option<String>,
        /// How often a check-in is required, in minutes
        #[arg(long, default_value = "30")]
        interval_minutes: i64,
        /// Grace past the due instant before escalation, in minutes
        #[arg(long, default_value = "10")]
        grace_minutes: i64,
        /// daily, weekly, custom, or once
        #[arg(long, default_value = "daily")]
        frequency: String,
        /// Comma-separated weekday numbers 1-7 (Monday=1), e.g. "2,4"
        #[arg(long)]
        days: Option<String>,
        /// Active window start, HH:MM
        #[arg(long)]
        window_start: Option<String>,
        /// Active window end, HH:MM
        #[arg(long)]
        window_end: Option<String>,
    },
    /// List schedules
    List,
    /// Reactivate a schedule
    Enable { slug: String },
    /// Deactivate a schedule (stops evaluation, keeps history)
    Disable { slug: String },
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcommand: ScheduleSubcommand, json: bool) -> Result<()> {
    let store = YamlStore::new(root);
    match subcommand {
        ScheduleSubcommand::Add {
            slug,
            name,
            org,
            interval_minutes,
            grace_minutes,
            frequency,
            days,
            window_start,
            window_end,
        } => {
            let organization_id = match org {
                Some(org) => org,
                None => Config::load(root)?.organization_id,
            };
            let frequency: Frequency = frequency.parse()?;
            let days_of_week = match days {
                Some(days) => parse_days(&days)?,
                None => Vec::new(),
            };
            let active_window = match (window_start, window_end) {
                (Some(start), Some(end)) => Some(ActiveWindow { start, end }),
                (None, None) => None,
                _ => bail!("--window-start and --window-end must be given together"),
            };

            let schedule = store.create_schedule(Schedule {
                slug: slug.clone(),
                organization_id,
                name: name.unwrap_or_else(|| slug.clone()),
                check_in_interval_minutes: interval_minutes,
                grace_period_minutes: grace_minutes,
                active_window,
                frequency,
                days_of_week,
                is_active: true,
                created_at: Utc::now(),
            })?;

            if json {
                print_json(&schedule)?;
            } else {
                println!(
                    "Created schedule '{}': every {}m, grace {}m, {}",
                    schedule.slug,
                    schedule.check_in_interval_minutes,
                    schedule.grace_period_minutes,
                    schedule.frequency
                );
            }
            Ok(())
        }

        ScheduleSubcommand::List => {
            let schedules = store.list_schedules()?;
            if json {
                print_json(&schedules)?;
            } else {
                let rows = schedules
                    .iter()
                    .map(|s| {
                        vec![
                            s.slug.clone(),
                            s.frequency.to_string(),
                            format!("{}m", s.check_in_interval_minutes),
                            format!("{}m", s.grace_period_minutes),
                            if s.is_active { "active" } else { "inactive" }.to_string(),
                        ]
                    })
                    .collect();
                print_table(&["SLUG", "FREQUENCY", "INTERVAL", "GRACE", "STATUS"], rows);
            }
            Ok(())
        }

        ScheduleSubcommand::Enable { slug } => {
            let schedule = store.set_schedule_active(&slug, true)?;
            println!("Enabled schedule '{}'", schedule.slug);
            Ok(())
        }

        ScheduleSubcommand::Disable { slug } => {
            let schedule = store.set_schedule_active(&slug, false)?;
            println!("Disabled schedule '{}'", schedule.slug);
            Ok(())
        }
    }
}

fn parse_days(days: &str) -> Result<Vec<u8>> {
    days.split(',')
        .map(|part| {
            part.trim()
                .parse::<u8>()
                .map_err(|_| anyhow::anyhow!("invalid day of week '{part}': expected 1-7"))
        })
        .collect()
}
