//! Report Renderer
//!
//! Deterministic formatter producing per-phase and consolidated summary
//! reports from aggregator snapshots. The run timestamp appears on a
//! single header line; the body is a pure function of the snapshot, so
//! two runs over identical input differ only in that one line.
//!
//! Report files are named deterministically by phase and written
//! atomically (temp file + rename): a report is fully written before it
//! becomes visible under its final name. Re-running the pipeline
//! regenerates (overwrites) report files; reports are snapshots, not
//! append-only records. A failed write is the one fatal condition in the
//! core and is surfaced as `CoreError::ReportWrite`.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use verdict_core::{CoreError, CoreResult};

use crate::aggregator::{PhaseSnapshot, RunSnapshot};
use crate::models::RemediationEntry;

/// File name of the consolidated cross-phase report.
pub const SUMMARY_REPORT_NAME: &str = "report-summary.txt";

const RULE: &str =
    "================================================================";

/// Renders snapshots into the stable plain-text report layout.
pub struct ReportRenderer;

impl ReportRenderer {
    /// Render one phase's report.
    pub fn render_phase(
        snapshot: &PhaseSnapshot,
        remediations: &[RemediationEntry],
        run_stamp: DateTime<Utc>,
    ) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", RULE);
        let _ = writeln!(out, " Verification Triage Report - {}", snapshot.phase.display_name());
        let _ = writeln!(out, " Generated: {}", run_stamp.to_rfc3339());
        let _ = writeln!(out, "{}", RULE);
        let _ = writeln!(out);
        Self::render_phase_body(&mut out, snapshot, remediations);
        out
    }

    /// Render the consolidated cross-phase report: one section per phase
    /// in phase-declaration order, then the run summary line.
    pub fn render_consolidated(
        run: &RunSnapshot,
        remediations: &[RemediationEntry],
        run_stamp: DateTime<Utc>,
    ) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", RULE);
        let _ = writeln!(out, " Verification Triage Report - Consolidated");
        let _ = writeln!(out, " Generated: {}", run_stamp.to_rfc3339());
        let _ = writeln!(out, "{}", RULE);

        for snapshot in &run.phases {
            let _ = writeln!(out);
            let _ = writeln!(out, "--- {} ---", snapshot.phase.display_name());
            let phase_remediations: Vec<RemediationEntry> = remediations
                .iter()
                .filter(|r| r.phase == snapshot.phase)
                .cloned()
                .collect();
            Self::render_phase_body(&mut out, snapshot, &phase_remediations);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", RULE);
        let _ = writeln!(
            out,
            " Summary: {} error(s), {} warning(s), overall status: {}",
            run.total_errors, run.total_warnings, run.overall_status
        );
        let _ = writeln!(out, "{}", RULE);
        out
    }

    fn render_phase_body(
        out: &mut String,
        snapshot: &PhaseSnapshot,
        remediations: &[RemediationEntry],
    ) {
        let _ = writeln!(out, "phase: {}", snapshot.phase);
        let _ = writeln!(out, "status: {}", snapshot.status);
        let _ = writeln!(out, "errors: {}", snapshot.error_count);
        let _ = writeln!(out, "warnings: {}", snapshot.warning_count);

        if snapshot.counters.is_empty() {
            let _ = writeln!(out, "categories: none recorded");
            return;
        }

        let _ = writeln!(out, "categories (first seen first):");
        for counter in &snapshot.counters {
            let _ = writeln!(out, "  - {} (count: {})", counter.category, counter.count);
            for example in &counter.examples {
                let _ = writeln!(out, "      * {}", example);
            }
            if let Some(entry) = remediations.iter().find(|r| r.category == counter.category) {
                let _ = writeln!(out, "      remediation: {}", entry.suggestion);
                if let Some(artifact) = &entry.artifact {
                    let _ = writeln!(out, "      fix script: {}", artifact.display());
                }
            }
        }
    }
}

/// Persists rendered reports with atomic visibility.
pub struct ReportWriter {
    out_dir: PathBuf,
}

impl ReportWriter {
    /// Create a writer rooted at the given output directory.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Deterministic report file name for a phase.
    pub fn phase_report_path(&self, snapshot: &PhaseSnapshot) -> PathBuf {
        self.out_dir.join(format!("report-{}.txt", snapshot.phase))
    }

    /// Path of the consolidated report.
    pub fn summary_report_path(&self) -> PathBuf {
        self.out_dir.join(SUMMARY_REPORT_NAME)
    }

    /// Write one phase's report, returning its path.
    pub fn write_phase(
        &self,
        snapshot: &PhaseSnapshot,
        remediations: &[RemediationEntry],
        run_stamp: DateTime<Utc>,
    ) -> CoreResult<PathBuf> {
        let path = self.phase_report_path(snapshot);
        let body = ReportRenderer::render_phase(snapshot, remediations, run_stamp);
        self.write_atomic(&path, &body)?;
        Ok(path)
    }

    /// Write the consolidated report, returning its path.
    pub fn write_consolidated(
        &self,
        run: &RunSnapshot,
        remediations: &[RemediationEntry],
        run_stamp: DateTime<Utc>,
    ) -> CoreResult<PathBuf> {
        let path = self.summary_report_path();
        let body = ReportRenderer::render_consolidated(run, remediations, run_stamp);
        self.write_atomic(&path, &body)?;
        Ok(path)
    }

    /// Write an arbitrary run artifact (e.g. an event-stream archive)
    /// into the output directory with the same atomic visibility as the
    /// reports.
    pub fn write_artifact(&self, file_name: &str, body: &str) -> CoreResult<PathBuf> {
        let path = self.out_dir.join(file_name);
        self.write_atomic(&path, body)?;
        Ok(path)
    }

    /// Write fully to a temp file in the target directory, then rename
    /// into place. Callers never observe a partial report.
    fn write_atomic(&self, path: &Path, body: &str) -> CoreResult<()> {
        std::fs::create_dir_all(&self.out_dir)
            .map_err(|e| CoreError::report_write(format!("{}: {}", self.out_dir.display(), e)))?;

        let file_name = path
            .file_name()
            .ok_or_else(|| CoreError::report_write(format!("bad report path: {}", path.display())))?
            .to_string_lossy();
        let tmp = self.out_dir.join(format!(".{}.tmp", file_name));

        std::fs::write(&tmp, body)
            .map_err(|e| CoreError::report_write(format!("{}: {}", tmp.display(), e)))?;
        std::fs::rename(&tmp, path)
            .map_err(|e| CoreError::report_write(format!("{}: {}", path.display(), e)))?;

        tracing::info!(path = %path.display(), "report written");
        Ok(())
    }
}
