//! Pattern Classifier
//!
//! Maps one line (or a small fixed window of lines, for multi-line
//! diagnostics) of collaborator output to zero or one
//! `(ErrorCategory, Level, detail)` tag.
//!
//! Uses a rule-based approach with regex patterns evaluated in a fixed
//! priority order per collaborator kind: first match wins, so a single
//! diagnostic is never counted under two categories. The rule tables are
//! data-driven; new failure signatures are additive rows.
//!
//! The classifier is a filter, not a full parser. Lines matching no rule
//! classify as a miss (`None`) and are ignored by the aggregator.

use regex::Regex;

use crate::models::{Classification, CollaboratorKind, ErrorCategory, Level};

/// Pattern entry: compiled regex + the tag it assigns.
///
/// The first capture group of the regex, when present and matched, is
/// carried as the classification detail (e.g. a failed test's name).
struct Rule {
    regex: Regex,
    category: ErrorCategory,
    level: Level,
}

/// Rule-based classifier for collaborator output lines.
pub struct PatternClassifier {
    build_rules: Vec<Rule>,
    model_checker_rules: Vec<Rule>,
    proof_checker_rules: Vec<Rule>,
}

impl Default for PatternClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternClassifier {
    /// Create a classifier with compiled rule tables.
    pub fn new() -> Self {
        Self {
            // Priority order matters: the block-hash width confusion must
            // win over the generic type-mismatch rule, and both must win
            // over the bare `error[` fallback.
            build_rules: Self::compile(&[
                (
                    r"(?i)mismatched types.*expected\s+`?(u\d+)`?.*found\s+`?\[u8;\s*32\]`?",
                    ErrorCategory::BlockHashMismatch,
                    Level::Error,
                ),
                (
                    r"(?i)mismatched types.*expected\s+`?\[u8;\s*32\]`?.*found\s+`?(u\d+)`?",
                    ErrorCategory::BlockHashMismatch,
                    Level::Error,
                ),
                (
                    r"(?i)error\[E0308\]|mismatched types",
                    ErrorCategory::TypeMismatch,
                    Level::Error,
                ),
                (
                    r"(?i)cannot find",
                    ErrorCategory::MissingSymbol,
                    Level::Error,
                ),
                (r"(?i)borrow", ErrorCategory::BorrowConflict, Level::Error),
                (
                    r"test\s+(\S+)\s+\.\.\.\s+FAILED",
                    ErrorCategory::TestFailure,
                    Level::Error,
                ),
                (r"^error(\[|:)", ErrorCategory::General, Level::Error),
                (r"^warning(\[|:)", ErrorCategory::General, Level::Warning),
            ]),
            model_checker_rules: Self::compile(&[
                (
                    r"(?i)pars(?:e|er|ing)\s*(?:error|exception)|ParseException",
                    ErrorCategory::ParseError,
                    Level::Error,
                ),
                (
                    r"(?i)invariant\s+(\S+)\s+is violated",
                    ErrorCategory::PropertyViolation,
                    Level::Critical,
                ),
                (
                    r"(?i)temporal properties were violated|deadlock reached",
                    ErrorCategory::PropertyViolation,
                    Level::Critical,
                ),
                (r"(?i)^Error:", ErrorCategory::General, Level::Error),
            ]),
            proof_checker_rules: Self::compile(&[
                (
                    r"(?i)pars(?:e|er|ing)\s*(?:error|exception)",
                    ErrorCategory::ParseError,
                    Level::Error,
                ),
                (
                    r"(?i)obligation\s+(\S+)?\s*(?:failed|could not be proved)",
                    ErrorCategory::ProofFailure,
                    Level::Error,
                ),
                // Summary-line fallback: only a nonzero failure count is a
                // failure. Passing runs print "0 failed" and must classify
                // as a miss.
                (
                    r"(?i)proof failed|[1-9]\d*\s+failed\b",
                    ErrorCategory::ProofFailure,
                    Level::Error,
                ),
                (r"(?i)^Error:", ErrorCategory::General, Level::Error),
            ]),
        }
    }

    /// Classify one line of collaborator output.
    ///
    /// Pure function of `(kind, line)`; returns `None` on a miss.
    pub fn classify(&self, kind: CollaboratorKind, line: &str) -> Option<Classification> {
        let rules = self.rules_for(kind);
        for rule in rules {
            if let Some(caps) = rule.regex.captures(line) {
                let detail = caps
                    .iter()
                    .skip(1)
                    .flatten()
                    .next()
                    .map(|m| m.as_str().to_string());
                return Some(Classification {
                    category: rule.category,
                    level: rule.level,
                    detail,
                });
            }
        }
        tracing::trace!(kind = ?kind, "classification miss");
        None
    }

    /// Classify a line together with a small lookahead window.
    ///
    /// Compiler diagnostics sometimes split a signature across lines
    /// (`error[E0308]` on one line, `expected u64, found [u8; 32]` on the
    /// next). When the line alone classifies as a plain type mismatch, the
    /// joined window is re-checked and the classification upgraded to the
    /// more specific sub-case if it matches. Upgrade only; the window
    /// never produces additional counts for its trailing lines.
    pub fn classify_with_context(
        &self,
        kind: CollaboratorKind,
        line: &str,
        lookahead: &[&str],
    ) -> Option<Classification> {
        let base = self.classify(kind, line)?;
        if base.category != ErrorCategory::TypeMismatch || lookahead.is_empty() {
            return Some(base);
        }

        let mut window = String::from(line);
        for extra in lookahead {
            window.push(' ');
            window.push_str(extra);
        }
        match self.classify(kind, &window) {
            Some(upgraded) if upgraded.category == ErrorCategory::BlockHashMismatch => {
                Some(upgraded)
            }
            _ => Some(base),
        }
    }

    fn rules_for(&self, kind: CollaboratorKind) -> &[Rule] {
        match kind {
            CollaboratorKind::Build => &self.build_rules,
            CollaboratorKind::ModelChecker => &self.model_checker_rules,
            CollaboratorKind::ProofChecker => &self.proof_checker_rules,
        }
    }

    fn compile(raw: &[(&str, ErrorCategory, Level)]) -> Vec<Rule> {
        raw.iter()
            .filter_map(|(pattern, category, level)| {
                Regex::new(pattern).ok().map(|regex| Rule {
                    regex,
                    category: *category,
                    level: *level,
                })
            })
            .collect()
    }
}
