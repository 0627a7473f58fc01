//! Resource Probe
//!
//! Queries OS-level metrics (memory utilization, disk utilization,
//! logical core count) and classifies them against fixed thresholds into
//! advisory findings. Findings are synthetic [`LogEvent`]s with
//! phase `resources`, so they flow through the same aggregation and
//! reporting path as classified tool output.
//!
//! Metrics come through the [`MetricsSource`] trait so tests can inject
//! fixed values; the default source is sysinfo-backed. A metric that
//! cannot be queried degrades to an "unknown" informational finding,
//! never a false failure.

use sysinfo::{Disks, System};

use crate::models::{ErrorCategory, Level, LogEvent, Phase};

/// Utilization percentage at or above which a WARNING finding is raised.
pub const HIGH_WATER_PERCENT: f64 = 90.0;

/// Source of raw OS metrics. `None` means the metric could not be
/// queried on this host.
pub trait MetricsSource: Send + Sync {
    /// Memory utilization as a percentage of total.
    fn memory_percent(&self) -> Option<f64>;
    /// Utilization of the fullest mounted disk, as a percentage.
    fn disk_percent(&self) -> Option<f64>;
    /// Logical core count.
    fn core_count(&self) -> Option<usize>;
    /// Total physical memory in bytes.
    fn total_memory_bytes(&self) -> Option<u64>;
}

/// sysinfo-backed metrics source.
pub struct SysinfoSource;

impl MetricsSource for SysinfoSource {
    fn memory_percent(&self) -> Option<f64> {
        let mut sys = System::new();
        sys.refresh_memory();
        let total = sys.total_memory();
        if total == 0 {
            return None;
        }
        Some(sys.used_memory() as f64 / total as f64 * 100.0)
    }

    fn disk_percent(&self) -> Option<f64> {
        let disks = Disks::new_with_refreshed_list();
        disks
            .iter()
            .filter(|d| d.total_space() > 0)
            .map(|d| {
                let used = d.total_space() - d.available_space();
                used as f64 / d.total_space() as f64 * 100.0
            })
            .fold(None, |acc: Option<f64>, pct| {
                Some(acc.map_or(pct, |a| a.max(pct)))
            })
    }

    fn core_count(&self) -> Option<usize> {
        let mut sys = System::new();
        sys.refresh_cpu();
        let n = sys.cpus().len();
        (n > 0).then_some(n)
    }

    fn total_memory_bytes(&self) -> Option<u64> {
        let mut sys = System::new();
        sys.refresh_memory();
        let total = sys.total_memory();
        (total > 0).then_some(total)
    }
}

/// Threshold-driven resource advisor.
pub struct ResourceProbe<S: MetricsSource = SysinfoSource> {
    source: S,
    memory_threshold: f64,
    disk_threshold: f64,
}

impl Default for ResourceProbe<SysinfoSource> {
    fn default() -> Self {
        Self::new(SysinfoSource)
    }
}

impl<S: MetricsSource> ResourceProbe<S> {
    /// Create a probe over the given metrics source with default thresholds.
    pub fn new(source: S) -> Self {
        Self {
            source,
            memory_threshold: HIGH_WATER_PERCENT,
            disk_threshold: HIGH_WATER_PERCENT,
        }
    }

    /// Override both utilization thresholds.
    pub fn with_thresholds(mut self, memory_percent: f64, disk_percent: f64) -> Self {
        self.memory_threshold = memory_percent;
        self.disk_threshold = disk_percent;
        self
    }

    /// Query all metrics and return the resulting findings.
    ///
    /// Utilization at or above the high-water mark yields a WARNING
    /// finding with the matching resource category; below it, no finding
    /// at all. The sizing heuristic always yields one informational
    /// finding (possibly "unknown").
    pub fn probe(&self) -> Vec<LogEvent> {
        let mut findings = Vec::new();

        match self.source.memory_percent() {
            Some(pct) if pct >= self.memory_threshold => {
                findings.push(LogEvent::classified(
                    Phase::Resources,
                    Level::Warning,
                    format!(
                        "memory utilization {:.1}% exceeds high-water mark {:.0}%",
                        pct, self.memory_threshold
                    ),
                    ErrorCategory::ResourceMemory,
                    None,
                ));
            }
            Some(pct) => {
                tracing::debug!(percent = pct, "memory utilization below threshold");
            }
            None => {
                findings.push(LogEvent::info(
                    Phase::Resources,
                    "memory utilization unknown (metric unavailable)",
                ));
            }
        }

        match self.source.disk_percent() {
            Some(pct) if pct >= self.disk_threshold => {
                findings.push(LogEvent::classified(
                    Phase::Resources,
                    Level::Warning,
                    format!(
                        "disk utilization {:.1}% exceeds high-water mark {:.0}%",
                        pct, self.disk_threshold
                    ),
                    ErrorCategory::ResourceDisk,
                    None,
                ));
            }
            Some(pct) => {
                tracing::debug!(percent = pct, "disk utilization below threshold");
            }
            None => {
                findings.push(LogEvent::info(
                    Phase::Resources,
                    "disk utilization unknown (metric unavailable)",
                ));
            }
        }

        findings.push(self.sizing_finding());
        findings
    }

    /// Sizing advice for the model checker from core count and total
    /// memory: a recommended heap tier plus a worker count.
    fn sizing_finding(&self) -> LogEvent {
        let cores = self.source.core_count();
        let total = self.source.total_memory_bytes();

        let message = match (cores, total) {
            (Some(cores), Some(total)) => format!(
                "model checker sizing: {} worker(s), recommended heap {}",
                cores,
                Self::heap_tier(total)
            ),
            (Some(cores), None) => format!(
                "model checker sizing: {} worker(s), heap recommendation unknown (memory metric unavailable)",
                cores
            ),
            (None, Some(total)) => format!(
                "model checker sizing: worker count unknown (cpu metric unavailable), recommended heap {}",
                Self::heap_tier(total)
            ),
            (None, None) => {
                "model checker sizing unknown (cpu and memory metrics unavailable)".to_string()
            }
        };
        LogEvent::info(Phase::Resources, message)
    }

    /// Working-memory allocation tier for a given total memory.
    fn heap_tier(total_bytes: u64) -> &'static str {
        const GIB: u64 = 1024 * 1024 * 1024;
        match total_bytes {
            t if t < 4 * GIB => "1g",
            t if t < 8 * GIB => "2g",
            t if t < 16 * GIB => "4g",
            t if t < 32 * GIB => "8g",
            _ => "12g",
        }
    }
}
