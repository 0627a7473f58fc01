//! Triage Models
//!
//! Data structures for phase-aware log classification and aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of distinct example messages kept per (phase, category)
/// pair. Counts keep incrementing past the cap; only the example list is
/// bounded.
pub const EXAMPLE_CAP: usize = 5;

/// Verification-run phases. Each phase owns its own event stream and
/// derived counters; phases are independent and never nested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Toolchain/environment preflight
    Environment,
    /// Native compilation and test run
    NativeBuild,
    /// Model-checker run
    ModelCheck,
    /// Proof-checker run
    ProofCheck,
    /// Review of previously captured logs
    LogReview,
    /// Synthetic findings from the resource probe
    Resources,
    /// Run orchestration itself
    Main,
}

impl Phase {
    /// All phases in declaration order. The consolidated report renders
    /// its sections in this order.
    pub const ALL: [Phase; 7] = [
        Phase::Environment,
        Phase::NativeBuild,
        Phase::ModelCheck,
        Phase::ProofCheck,
        Phase::LogReview,
        Phase::Resources,
        Phase::Main,
    ];

    /// Stable identifier used in report file names.
    pub fn id(&self) -> &'static str {
        match self {
            Phase::Environment => "environment",
            Phase::NativeBuild => "native-build",
            Phase::ModelCheck => "model-check",
            Phase::ProofCheck => "proof-check",
            Phase::LogReview => "log-review",
            Phase::Resources => "resources",
            Phase::Main => "main",
        }
    }

    /// Human-readable name for report headers.
    pub fn display_name(&self) -> &'static str {
        match self {
            Phase::Environment => "Environment Check",
            Phase::NativeBuild => "Native Build & Test",
            Phase::ModelCheck => "Model Checking",
            Phase::ProofCheck => "Proof Checking",
            Phase::LogReview => "Log Review",
            Phase::Resources => "Resource Advisory",
            Phase::Main => "Run Orchestration",
        }
    }

    /// Parse a phase id as it appears in config files and CLI flags.
    pub fn parse(s: &str) -> Option<Phase> {
        match s {
            "environment" => Some(Phase::Environment),
            "native-build" | "rust" => Some(Phase::NativeBuild),
            "model-check" | "tlc" => Some(Phase::ModelCheck),
            "proof-check" | "tlaps" => Some(Phase::ProofCheck),
            "log-review" | "logs" => Some(Phase::LogReview),
            "resources" => Some(Phase::Resources),
            "main" => Some(Phase::Main),
            _ => None,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Severity level of a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
    Success,
    Highlight,
    Warning,
    Error,
    Critical,
}

impl Level {
    /// Whether this level counts toward the error tally.
    pub fn is_error(&self) -> bool {
        matches!(self, Level::Error | Level::Critical)
    }

    /// Whether this level counts toward the warning tally.
    pub fn is_warning(&self) -> bool {
        matches!(self, Level::Warning)
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Info => write!(f, "INFO"),
            Level::Success => write!(f, "SUCCESS"),
            Level::Highlight => write!(f, "HIGHLIGHT"),
            Level::Warning => write!(f, "WARNING"),
            Level::Error => write!(f, "ERROR"),
            Level::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Enumerated failure-signature tag. The `(phase, category)` pair is the
/// unit of aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCategory {
    /// Compiler type mismatch
    TypeMismatch,
    /// The fixed-size-byte-array vs. integer-width confusion sub-case of
    /// a type mismatch. One historical bug signature, not a general
    /// width-analysis capability.
    BlockHashMismatch,
    /// Unresolved symbol (cannot find value/function/type)
    MissingSymbol,
    /// Borrow-checker conflict
    BorrowConflict,
    /// Named test failure
    TestFailure,
    /// Tool-side parse exception
    ParseError,
    /// Invariant or temporal-property violation from the model checker
    PropertyViolation,
    /// Failed proof obligation
    ProofFailure,
    /// Memory utilization above the high-water mark
    ResourceMemory,
    /// Disk utilization above the high-water mark
    ResourceDisk,
    /// Recognized failure with no more specific signature
    General,
}

impl ErrorCategory {
    /// Stable identifier used in reports.
    pub fn id(&self) -> &'static str {
        match self {
            ErrorCategory::TypeMismatch => "type-mismatch",
            ErrorCategory::BlockHashMismatch => "type-mismatch/block-hash",
            ErrorCategory::MissingSymbol => "missing-symbol",
            ErrorCategory::BorrowConflict => "borrow-conflict",
            ErrorCategory::TestFailure => "test-failure",
            ErrorCategory::ParseError => "parse-error",
            ErrorCategory::PropertyViolation => "property-violation",
            ErrorCategory::ProofFailure => "proof-failure",
            ErrorCategory::ResourceMemory => "resource-memory",
            ErrorCategory::ResourceDisk => "resource-disk",
            ErrorCategory::General => "general",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Overall status of a phase within a run.
///
/// Transitions are one-way within a run: the first ERROR-level event moves
/// `Healthy -> Degraded`, a CRITICAL event moves to `Failed` (terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Healthy,
    Degraded,
    Failed,
}

impl PhaseStatus {
    /// Worst of two statuses, `Failed > Degraded > Healthy`.
    pub fn worst(self, other: PhaseStatus) -> PhaseStatus {
        self.max(other)
    }
}

impl std::fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseStatus::Healthy => write!(f, "healthy"),
            PhaseStatus::Degraded => write!(f, "degraded"),
            PhaseStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One timestamped record in the event log. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    /// When the event was recorded
    pub timestamp: DateTime<Utc>,
    /// Owning phase
    pub phase: Phase,
    /// Severity level
    pub level: Level,
    /// Raw message text
    pub message: String,
    /// Classified category, if any
    pub category: Option<ErrorCategory>,
    /// Extra structure captured by the classifier (e.g. a test name)
    pub detail: Option<String>,
}

impl LogEvent {
    /// Create a classified event for the given phase.
    pub fn classified(
        phase: Phase,
        level: Level,
        message: impl Into<String>,
        category: ErrorCategory,
        detail: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            phase,
            level,
            message: message.into(),
            category: Some(category),
            detail,
        }
    }

    /// Create an informational event with no category.
    pub fn info(phase: Phase, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            phase,
            level: Level::Info,
            message: message.into(),
            category: None,
            detail: None,
        }
    }
}

/// Output of the pattern classifier for one line of collaborator output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Assigned category
    pub category: ErrorCategory,
    /// Severity of the matched signature
    pub level: Level,
    /// Captured detail (test name, width-confusion marker), if any
    pub detail: Option<String>,
}

/// Per (phase, category) aggregate: count, bounded example list, and
/// first/last-seen timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateCounter {
    /// Category this counter tracks
    pub category: ErrorCategory,
    /// Occurrence count; monotonically non-decreasing within a run
    pub count: u64,
    /// Up to [`EXAMPLE_CAP`] distinct example messages, oldest kept
    pub examples: Vec<String>,
    /// Most specific detail seen for this pair, last-wins
    pub detail: Option<String>,
    /// Timestamp of the first occurrence
    pub first_seen: DateTime<Utc>,
    /// Timestamp of the most recent occurrence
    pub last_seen: DateTime<Utc>,
}

impl AggregateCounter {
    /// Start a counter from its first event.
    pub fn new(event: &LogEvent, category: ErrorCategory) -> Self {
        Self {
            category,
            count: 1,
            examples: vec![event.message.clone()],
            detail: event.detail.clone(),
            first_seen: event.timestamp,
            last_seen: event.timestamp,
        }
    }

    /// Fold another occurrence into this counter. The count always
    /// increments; the example list dedups by exact text and is capped.
    pub fn absorb(&mut self, event: &LogEvent) {
        self.count += 1;
        self.last_seen = event.timestamp;
        if event.detail.is_some() {
            self.detail = event.detail.clone();
        }
        if self.examples.len() < EXAMPLE_CAP
            && !self.examples.iter().any(|e| e == &event.message)
        {
            self.examples.push(event.message.clone());
        }
    }
}

/// A suggested fix for one `(phase, category)` pair, optionally paired
/// with a generated fix artifact on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationEntry {
    /// Phase the failure occurred in
    pub phase: Phase,
    /// Category being remediated
    pub category: ErrorCategory,
    /// Human-readable suggested fix
    pub suggestion: String,
    /// Path of a generated, executable remediation script, if one exists
    pub artifact: Option<std::path::PathBuf>,
}

/// Kind of external collaborator whose output is being classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollaboratorKind {
    /// Native build/test toolchain (compiler + test runner diagnostics)
    Build,
    /// Model-checking tool
    ModelChecker,
    /// Proof-checking tool
    ProofChecker,
}

impl CollaboratorKind {
    /// Which collaborator produces a given phase's raw output.
    /// `Environment`, `Resources`, and `Main` have no line-oriented
    /// collaborator; their events are synthesized directly.
    pub fn for_phase(phase: Phase) -> Option<CollaboratorKind> {
        match phase {
            Phase::NativeBuild => Some(CollaboratorKind::Build),
            Phase::ModelCheck => Some(CollaboratorKind::ModelChecker),
            Phase::ProofCheck => Some(CollaboratorKind::ProofChecker),
            // Log review replays previously captured build-tool output.
            Phase::LogReview => Some(CollaboratorKind::Build),
            Phase::Environment | Phase::Resources | Phase::Main => None,
        }
    }
}
