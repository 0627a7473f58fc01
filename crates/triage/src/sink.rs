//! Event Log Sink
//!
//! Append-only, timestamped record store partitioned by phase. Every
//! component writes events here; none of them ever reads another
//! component's in-memory state directly.

use std::collections::HashMap;

use crate::models::{LogEvent, Phase};

/// Append-only event store partitioned by phase.
#[derive(Debug, Default)]
pub struct EventLog {
    streams: HashMap<Phase, Vec<LogEvent>>,
}

impl EventLog {
    /// Create an empty event log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event to its phase's stream. Events are immutable once
    /// appended.
    pub fn append(&mut self, event: LogEvent) {
        self.streams.entry(event.phase).or_default().push(event);
    }

    /// All events recorded for a phase, in arrival order.
    pub fn events(&self, phase: Phase) -> &[LogEvent] {
        self.streams.get(&phase).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of events across all phases.
    pub fn len(&self) -> usize {
        self.streams.values().map(Vec::len).sum()
    }

    /// Whether no events have been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.streams.values().all(Vec::is_empty)
    }

    /// Merge another log's streams into this one, preserving per-phase
    /// arrival order. Used at the consolidated-report join barrier when
    /// phases were ingested on isolated ledgers.
    pub fn merge(&mut self, other: EventLog) {
        for (phase, mut events) in other.streams {
            self.streams.entry(phase).or_default().append(&mut events);
        }
    }

    /// All events across phases, in phase-declaration order then arrival
    /// order. Used when archiving a run's event stream.
    pub fn all_events(&self) -> Vec<&LogEvent> {
        Phase::ALL
            .iter()
            .flat_map(|p| self.events(*p).iter())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Level;

    #[test]
    fn test_append_partitions_by_phase() {
        let mut log = EventLog::new();
        log.append(LogEvent::info(Phase::NativeBuild, "compiling"));
        log.append(LogEvent::info(Phase::ModelCheck, "checking"));
        log.append(LogEvent::info(Phase::NativeBuild, "linking"));

        assert_eq!(log.events(Phase::NativeBuild).len(), 2);
        assert_eq!(log.events(Phase::ModelCheck).len(), 1);
        assert_eq!(log.events(Phase::ProofCheck).len(), 0);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_arrival_order_preserved() {
        let mut log = EventLog::new();
        for i in 0..5 {
            log.append(LogEvent::info(Phase::Main, format!("step {}", i)));
        }
        let messages: Vec<_> = log.events(Phase::Main).iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["step 0", "step 1", "step 2", "step 3", "step 4"]);
    }

    #[test]
    fn test_merge_appends_after_existing() {
        let mut a = EventLog::new();
        a.append(LogEvent::info(Phase::Main, "first"));

        let mut b = EventLog::new();
        b.append(LogEvent::classified(
            Phase::Main,
            Level::Warning,
            "second",
            crate::models::ErrorCategory::General,
            None,
        ));

        a.merge(b);
        assert_eq!(a.events(Phase::Main).len(), 2);
        assert_eq!(a.events(Phase::Main)[1].message, "second");
    }

    #[test]
    fn test_empty_log() {
        let log = EventLog::new();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
    }
}
