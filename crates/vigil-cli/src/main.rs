mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{assign::AssignSubcommand, checkin::CheckinSubcommand, schedule::ScheduleSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "vigil",
    about = "Lone-worker check-in monitoring — schedules, check-ins, and overdue escalation",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .vigil/)
    #[arg(long, global = true, env = "VIGIL_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a vigil project in the current directory
    Init {
        /// Default organization for schedules and check-ins
        #[arg(long, default_value = "default")]
        org: String,
    },

    /// Run one evaluator pass over all active schedules
    Run,

    /// Start the HTTP server (run trigger + check-in API)
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "3470")]
        port: u16,
    },

    /// Manage monitoring schedules
    Schedule {
        #[command(subcommand)]
        subcommand: ScheduleSubcommand,
    },

    /// Manage worker assignments
    Assign {
        #[command(subcommand)]
        subcommand: AssignSubcommand,
    },

    /// Record and inspect check-ins
    Checkin {
        #[command(subcommand)]
        subcommand: CheckinSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        // Keep stdout clean for table/JSON output; RUST_LOG overrides.
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Init { org } => cmd::init::run(&root, &org),
        Commands::Run => cmd::run::run(&root, cli.json),
        Commands::Serve { port } => cmd::serve::run(&root, port),
        Commands::Schedule { subcommand } => cmd::schedule::run(&root, subcommand, cli.json),
        Commands::Assign { subcommand } => cmd::assign::run(&root, subcommand, cli.json),
        Commands::Checkin { subcommand } => cmd::checkin::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
