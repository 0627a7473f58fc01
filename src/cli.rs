//! CLI argument definitions: top-level `Cli` struct and `Commands` enum.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

const CLI_LONG_ABOUT: &str =
    "Triage engine for verification-pipeline logs.\n\n\
    Reads captured output from a native build/test toolchain, a model\n\
    checker, and a proof checker, classifies failures into a category\n\
    taxonomy, and writes per-phase plus consolidated plain-text reports\n\
    with suggested remediations.\n\n\
    Typical use:\n  \
    1. verdict run --logs-dir captured/ --out triage-reports/\n  \
    2. verdict probe\n\n\
    Use --phase to restrict a run to specific phases.";

#[derive(Parser)]
#[command(name = "verdict")]
#[command(about = "Triage engine for verification-pipeline logs")]
#[command(long_about = CLI_LONG_ABOUT)]
#[command(version)]
pub struct Cli {
    /// Path to an optional verdict.toml configuration file
    #[arg(long, global = true, default_value = "verdict.toml")]
    pub config: PathBuf,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify captured logs and write triage reports
    Run {
        /// Directory holding captured logs named <phase-id>.log
        #[arg(long)]
        logs_dir: Option<PathBuf>,

        /// Report output directory (overrides the config file)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Restrict the run to these phases (repeatable);
        /// accepts ids like native-build, model-check, tlc, tlaps
        #[arg(long = "phase")]
        phases: Vec<String>,

        /// Generate remediation scripts alongside the reports
        #[arg(long)]
        fix_scripts: bool,

        /// Skip the OS resource probe
        #[arg(long)]
        no_probe: bool,
    },
    /// Probe OS resources and print the advisory findings
    Probe,
}
