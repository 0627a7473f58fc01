//! Aggregator
//!
//! Accumulates classified events per phase into counts, ordered distinct
//! examples, and running warning/error tallies. Owns the
//! phase -> category -> count table; nothing else holds aggregate state.
//!
//! Within a phase, categories are reported in first-seen order, the order
//! a human debugging the run encountered them, not alphabetically.
//! Counts are monotonically non-decreasing within a run and reset only at
//! process start; no counter state persists across runs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{AggregateCounter, ErrorCategory, Level, LogEvent, Phase, PhaseStatus};

/// Per-phase aggregate state: status, tallies, and counters in
/// first-seen order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseLedger {
    /// Phase this ledger belongs to
    pub phase: Phase,
    /// Current status under the escalation rules
    pub status: PhaseStatus,
    /// Running ERROR/CRITICAL tally
    pub error_count: u64,
    /// Running WARNING tally
    pub warning_count: u64,
    /// Counters in first-seen category order
    pub counters: Vec<AggregateCounter>,
}

impl PhaseLedger {
    /// Create an empty ledger for a phase.
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            status: PhaseStatus::Healthy,
            error_count: 0,
            warning_count: 0,
            counters: Vec::new(),
        }
    }

    /// Record one event into this ledger.
    ///
    /// The count for the event's category always increments; the example
    /// list dedups by exact message text and stays within its cap, so
    /// replaying the same event grows counts but never the example set.
    pub fn record(&mut self, event: &LogEvent) {
        debug_assert_eq!(event.phase, self.phase);

        if event.level.is_error() {
            self.error_count += 1;
        } else if event.level.is_warning() {
            self.warning_count += 1;
        }
        self.escalate(event.level);

        let Some(category) = event.category else {
            return;
        };
        match self.counters.iter_mut().find(|c| c.category == category) {
            Some(counter) => counter.absorb(event),
            None => {
                tracing::debug!(phase = %self.phase, category = %category, "first occurrence");
                self.counters.push(AggregateCounter::new(event, category));
            }
        }
    }

    /// Counter for a category, if any occurrence was recorded.
    pub fn counter(&self, category: ErrorCategory) -> Option<&AggregateCounter> {
        self.counters.iter().find(|c| c.category == category)
    }

    /// Occurrence count for a category (zero if never seen).
    pub fn count(&self, category: ErrorCategory) -> u64 {
        self.counter(category).map(|c| c.count).unwrap_or(0)
    }

    /// Apply the status escalation rules: the first ERROR moves
    /// `Healthy -> Degraded`; a CRITICAL event moves to `Failed`,
    /// terminal for the phase within this run.
    fn escalate(&mut self, level: Level) {
        let next = match level {
            Level::Critical => PhaseStatus::Failed,
            Level::Error => PhaseStatus::Degraded,
            _ => return,
        };
        if next > self.status {
            tracing::debug!(phase = %self.phase, from = %self.status, to = %next, "phase status escalated");
            self.status = next;
        }
    }

    /// Fold another ledger for the same phase into this one. Used at the
    /// join barrier when a phase was ingested on an isolated ledger.
    pub fn merge(&mut self, other: PhaseLedger) {
        debug_assert_eq!(self.phase, other.phase);
        self.error_count += other.error_count;
        self.warning_count += other.warning_count;
        self.status = self.status.worst(other.status);
        for counter in other.counters {
            match self.counters.iter_mut().find(|c| c.category == counter.category) {
                Some(existing) => {
                    existing.count += counter.count;
                    existing.last_seen = existing.last_seen.max(counter.last_seen);
                    existing.first_seen = existing.first_seen.min(counter.first_seen);
                    if counter.detail.is_some() {
                        existing.detail = counter.detail;
                    }
                    for example in counter.examples {
                        if existing.examples.len() >= crate::models::EXAMPLE_CAP {
                            break;
                        }
                        if !existing.examples.iter().any(|e| e == &example) {
                            existing.examples.push(example);
                        }
                    }
                }
                None => self.counters.push(counter),
            }
        }
    }
}

/// Immutable snapshot of one phase's aggregate state.
pub type PhaseSnapshot = PhaseLedger;

/// Cross-phase snapshot: one ledger per phase in declaration order plus
/// run totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSnapshot {
    /// Per-phase snapshots in [`Phase::ALL`] order
    pub phases: Vec<PhaseSnapshot>,
    /// Total ERROR/CRITICAL events across phases
    pub total_errors: u64,
    /// Total WARNING events across phases
    pub total_warnings: u64,
    /// Worst status across all phases
    pub overall_status: PhaseStatus,
}

/// The run-wide aggregator. The only shared mutable state in the
/// pipeline; each phase's table is isolated, so phases may be ingested
/// concurrently on separate [`PhaseLedger`]s and merged here at the
/// consolidated-report join barrier.
#[derive(Debug, Default)]
pub struct Aggregator {
    ledgers: HashMap<Phase, PhaseLedger>,
}

impl Aggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one event under its phase.
    pub fn record(&mut self, event: &LogEvent) {
        self.ledgers
            .entry(event.phase)
            .or_insert_with(|| PhaseLedger::new(event.phase))
            .record(event);
    }

    /// Fold a phase-isolated ledger into the run state.
    pub fn merge_ledger(&mut self, ledger: PhaseLedger) {
        match self.ledgers.get_mut(&ledger.phase) {
            Some(existing) => existing.merge(ledger),
            None => {
                self.ledgers.insert(ledger.phase, ledger);
            }
        }
    }

    /// Immutable view of one phase's aggregate state. A phase with zero
    /// recorded events yields an empty, healthy snapshot, not an error.
    pub fn snapshot(&self, phase: Phase) -> PhaseSnapshot {
        self.ledgers
            .get(&phase)
            .cloned()
            .unwrap_or_else(|| PhaseLedger::new(phase))
    }

    /// Cross-phase view in phase-declaration order.
    pub fn snapshot_all(&self) -> RunSnapshot {
        let phases: Vec<PhaseSnapshot> = Phase::ALL.iter().map(|p| self.snapshot(*p)).collect();
        let total_errors = phases.iter().map(|p| p.error_count).sum();
        let total_warnings = phases.iter().map(|p| p.warning_count).sum();
        let overall_status = phases
            .iter()
            .map(|p| p.status)
            .fold(PhaseStatus::Healthy, PhaseStatus::worst);
        RunSnapshot {
            phases,
            total_errors,
            total_warnings,
            overall_status,
        }
    }
}
