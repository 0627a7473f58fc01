//! Triage Runner
//!
//! Orchestrates a full triage run: per-phase ingest pipelines
//! (captured log file -> classifier -> aggregator), resource probe
//! injection, and report persistence. Phases ingest concurrently on
//! isolated ledgers (each phase owns disjoint state, so no cross-phase
//! locking is needed) and `join_all` is the join barrier before the
//! consolidated report is rendered.
//!
//! Nothing here retries or blocks indefinitely: the runner classifies
//! whatever (possibly partial) output was captured, and partial
//! aggregation is always a valid, renderable snapshot.

use std::path::{Path, PathBuf};

use chrono::Utc;
use futures_util::future::join_all;

use verdict_core::CoreResult;
use verdict_triage::{
    Aggregator, CollaboratorKind, EventLog, LogEvent, PatternClassifier, Phase, PhaseLedger,
    RemediationEntry, RemediationMapper, ReportWriter, ResourceProbe, RunSnapshot,
};

use crate::config::RunConfig;

/// Name of the JSON event-stream archive written next to the reports.
pub const EVENTS_ARCHIVE_NAME: &str = "events.json";

/// Outcome of one triage run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Cross-phase aggregate snapshot
    pub snapshot: RunSnapshot,
    /// Per-phase report paths, in phase-declaration order
    pub reports: Vec<PathBuf>,
    /// Consolidated report path
    pub summary_report: PathBuf,
    /// Total events recorded in the sink
    pub events_recorded: usize,
}

/// One-shot triage run over captured collaborator logs.
pub struct Runner {
    config: RunConfig,
    logs_dir: Option<PathBuf>,
    selected: Vec<Phase>,
    probe_enabled: bool,
    classifier: PatternClassifier,
}

impl Runner {
    /// Create a runner over all phases.
    pub fn new(config: RunConfig, logs_dir: Option<PathBuf>) -> Self {
        Self {
            config,
            logs_dir,
            selected: Phase::ALL.to_vec(),
            probe_enabled: true,
            classifier: PatternClassifier::new(),
        }
    }

    /// Restrict the run to the given phases.
    pub fn with_phases(mut self, phases: Vec<Phase>) -> Self {
        self.selected = phases;
        self
    }

    /// Enable or disable the resource probe.
    pub fn with_probe(mut self, enabled: bool) -> Self {
        self.probe_enabled = enabled;
        self
    }

    /// Execute the run: ingest, probe, aggregate, render, persist.
    ///
    /// The only error that propagates is a failed report write;
    /// everything else degrades to logged warnings and partial results.
    pub async fn execute(&self) -> CoreResult<RunOutcome> {
        let run_stamp = Utc::now();
        let mut sink = EventLog::new();
        let mut aggregator = Aggregator::new();

        sink.append(LogEvent::info(Phase::Main, "triage run started"));

        // Ingest every selected phase that has a line-oriented
        // collaborator, concurrently on isolated ledgers.
        let inputs: Vec<(Phase, CollaboratorKind, PathBuf)> = self
            .selected
            .iter()
            .filter_map(|&phase| {
                let kind = CollaboratorKind::for_phase(phase)?;
                let path = self.config.log_path(phase, self.logs_dir.as_deref())?;
                Some((phase, kind, path))
            })
            .collect();

        let pipelines = inputs
            .iter()
            .map(|(phase, kind, path)| self.ingest_phase(*phase, *kind, path));
        let results = join_all(pipelines).await;

        // Join barrier reached: fold the isolated ledgers into run state.
        for (ledger, events) in results {
            aggregator.merge_ledger(ledger);
            sink.merge(events);
        }

        if self.probe_enabled && self.selected.contains(&Phase::Resources) {
            let probe = ResourceProbe::default().with_thresholds(
                self.config.thresholds.memory_percent,
                self.config.thresholds.disk_percent,
            );
            for finding in probe.probe() {
                aggregator.record(&finding);
                sink.append(finding);
            }
        }

        sink.append(LogEvent::info(Phase::Main, "triage run completed"));

        // Remediation mapping; the one generated artifact lands next to
        // the reports when fix-script generation is enabled.
        let mut mapper = RemediationMapper::new();
        if self.config.fix.scripts {
            mapper = mapper.with_fix_dir(&self.config.output.dir);
            if let Some(target) = &self.config.fix.target {
                mapper = mapper.with_fix_target(target);
            }
        }

        let writer = ReportWriter::new(&self.config.output.dir);
        let snapshot = aggregator.snapshot_all();

        let mut reports = Vec::new();
        let mut all_entries: Vec<RemediationEntry> = Vec::new();
        for phase_snapshot in &snapshot.phases {
            let entries = mapper.suggest_all(phase_snapshot);
            reports.push(writer.write_phase(phase_snapshot, &entries, run_stamp)?);
            all_entries.extend(entries);
        }
        let summary_report = writer.write_consolidated(&snapshot, &all_entries, run_stamp)?;

        self.archive_events(&writer, &sink)?;

        tracing::info!(
            errors = snapshot.total_errors,
            warnings = snapshot.total_warnings,
            status = %snapshot.overall_status,
            "triage run finished"
        );

        Ok(RunOutcome {
            snapshot,
            reports,
            summary_report,
            events_recorded: sink.len(),
        })
    }

    /// Ingest one phase's captured log into an isolated ledger.
    ///
    /// A missing or unreadable log file is not a failure: the phase
    /// simply reports zero counts, with an informational event noting
    /// the absent capture.
    async fn ingest_phase(
        &self,
        phase: Phase,
        kind: CollaboratorKind,
        path: &Path,
    ) -> (PhaseLedger, EventLog) {
        let mut ledger = PhaseLedger::new(phase);
        let mut events = EventLog::new();

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(phase = %phase, path = %path.display(), error = %e, "log unavailable");
                events.append(LogEvent::info(
                    phase,
                    format!("no captured output at {}", path.display()),
                ));
                return (ledger, events);
            }
        };

        let lines: Vec<&str> = content.lines().collect();
        for (i, line) in lines.iter().enumerate() {
            let end = (i + 3).min(lines.len());
            let lookahead = &lines[i + 1..end];
            if let Some(tag) = self.classifier.classify_with_context(kind, line, lookahead) {
                let event =
                    LogEvent::classified(phase, tag.level, *line, tag.category, tag.detail);
                ledger.record(&event);
                events.append(event);
            }
        }

        tracing::debug!(
            phase = %phase,
            lines = lines.len(),
            recorded = events.len(),
            "phase ingest complete"
        );
        (ledger, events)
    }

    /// Archive the run's event stream as JSON next to the reports,
    /// with the same atomic visibility as the reports themselves.
    fn archive_events(&self, writer: &ReportWriter, sink: &EventLog) -> CoreResult<()> {
        let body = serde_json::to_string_pretty(&sink.all_events())?;
        writer.write_artifact(EVENTS_ARCHIVE_NAME, &body)?;
        Ok(())
    }
}
