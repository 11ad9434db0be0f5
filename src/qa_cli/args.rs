use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Autonomous black-box QA engine", long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Path to the framework config JSON file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log verbosity (error, warn, info, debug, trace).
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Shortcut for `--log-level debug`.
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Crawl the target site and persist the discovered site model.
    Crawl,

    /// Generate a test plan from the last saved site model and coverage history.
    Plan,

    /// Execute a test plan and persist the run result into coverage history.
    Execute {
        /// Path to a previously saved plan. Defaults to `.qa-framework/latest_plan.json`.
        #[arg(long)]
        plan: Option<PathBuf>,
    },

    /// Run the full crawl -> plan -> execute -> coverage pipeline in one shot.
    Run,

    /// Inspect the persisted coverage registry.
    Coverage {
        #[command(subcommand)]
        action: CoverageAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum CoverageAction {
    /// Print a human-readable coverage summary.
    Show,
    /// Report untested/stale pages and under-covered categories.
    Gaps,
    /// Delete the persisted coverage registry.
    Reset,
}
