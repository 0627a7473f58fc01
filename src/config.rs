//! Run Configuration
//!
//! Optional `verdict.toml` file read by the CLI layer and merged with
//! command-line flags. The triage engine itself only ever sees plain
//! parameters derived from this; no environment coupling inside the core.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use verdict_core::{CoreError, CoreResult};
use verdict_triage::{Phase, HIGH_WATER_PERCENT};

/// Top-level run configuration, all sections optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Report output settings
    pub output: OutputConfig,
    /// Resource probe thresholds
    pub thresholds: ThresholdConfig,
    /// Explicit per-phase log file paths, keyed by phase id
    pub logs: HashMap<String, PathBuf>,
    /// Fix-artifact generation settings
    pub fix: FixConfig,
}

/// `[output]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory report files are written to
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("triage-reports"),
        }
    }
}

/// `[thresholds]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Memory utilization high-water mark, percent
    pub memory_percent: f64,
    /// Disk utilization high-water mark, percent
    pub disk_percent: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            memory_percent: HIGH_WATER_PERCENT,
            disk_percent: HIGH_WATER_PERCENT,
        }
    }
}

/// `[fix]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FixConfig {
    /// Whether to generate remediation scripts alongside reports
    pub scripts: bool,
    /// Target file baked into generated scripts
    pub target: Option<String>,
}

impl RunConfig {
    /// Load a config file. A missing file yields the defaults; a present
    /// but malformed file is a hard configuration error.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: RunConfig = toml::from_str(&content)
            .map_err(|e| CoreError::parse(format!("{}: {}", path.display(), e)))?;

        // Aliases ("tlc", "model-check") resolve to the same phase; two
        // [logs] keys for one phase would make path resolution ambiguous.
        let mut seen: HashMap<Phase, &String> = HashMap::new();
        for key in config.logs.keys() {
            let Some(phase) = Phase::parse(key) else {
                return Err(CoreError::config(format!(
                    "unknown phase id in [logs]: {}",
                    key
                )));
            };
            if let Some(previous) = seen.insert(phase, key) {
                return Err(CoreError::config(format!(
                    "[logs] names phase {} twice: {} and {}",
                    phase, previous, key
                )));
            }
        }
        Ok(config)
    }

    /// Resolve the log file for a phase: an explicit `[logs]` entry wins,
    /// otherwise `<logs_dir>/<phase-id>.log` when a logs dir was given.
    pub fn log_path(&self, phase: Phase, logs_dir: Option<&Path>) -> Option<PathBuf> {
        for (key, path) in &self.logs {
            if Phase::parse(key) == Some(phase) {
                return Some(path.clone());
            }
        }
        logs_dir.map(|dir| dir.join(format!("{}.log", phase)))
    }
}
