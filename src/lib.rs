//! Verdict
//!
//! Library surface of the `verdict` binary: CLI definitions, run
//! configuration, and the triage runner. The actual classification,
//! aggregation, remediation, and rendering logic lives in the
//! `verdict-triage` workspace crate; this crate wires captured log
//! files and the resource probe into that engine and persists the
//! resulting reports.

pub mod cli;
pub mod config;
pub mod runner;

pub use config::RunConfig;
pub use runner::{RunOutcome, Runner, EVENTS_ARCHIVE_NAME};
