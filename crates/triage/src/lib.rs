//! Verdict Triage
//!
//! The phase-aware log classification and remediation-mapping engine:
//! reads raw verification-tool output, recognizes failure signatures,
//! buckets them by phase and category, associates each category with a
//! suggested fix, and renders aggregate reports.
//!
//! - `models` - Core data types (Phase, Level, ErrorCategory, LogEvent, counters)
//! - `sink` - Append-only per-phase event log
//! - `classifier` - Ordered regex rule tables per collaborator kind
//! - `aggregator` - Per-(phase, category) counting and status escalation
//! - `remedy` - Remediation lookup and the generated fix artifact
//! - `report` - Deterministic rendering and atomic report persistence
//! - `probe` - OS resource metrics classified into advisory findings
//!
//! The engine is single-pass and degrades gracefully: unrecognized lines
//! are ignored, partial aggregation is always a valid, renderable
//! snapshot, and only a failed report write propagates as an error.

pub mod aggregator;
pub mod classifier;
pub mod models;
pub mod probe;
pub mod remedy;
pub mod report;
pub mod sink;

// Re-export core model types
pub use models::{
    AggregateCounter, Classification, CollaboratorKind, ErrorCategory, Level, LogEvent, Phase,
    PhaseStatus, RemediationEntry, EXAMPLE_CAP,
};

// Re-export engine components
pub use aggregator::{Aggregator, PhaseLedger, PhaseSnapshot, RunSnapshot};
pub use classifier::PatternClassifier;
pub use probe::{MetricsSource, ResourceProbe, SysinfoSource, HIGH_WATER_PERCENT};
pub use remedy::{RemediationMapper, FIX_SCRIPT_NAME};
pub use report::{ReportRenderer, ReportWriter, SUMMARY_REPORT_NAME};
pub use sink::EventLog;
