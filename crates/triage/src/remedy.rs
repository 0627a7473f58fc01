//! Remediation Mapper
//!
//! Pure lookup/derivation from `(phase, category)` to a human-readable
//! suggested fix, parameterized with the matched detail when one was
//! captured (a failed test's name, the confused integer width). The
//! mapper never fabricates remediation for failures that did not occur:
//! a pair with zero recorded occurrences yields no suggestion.
//!
//! For exactly one category, the block-hash width confusion in the
//! native-build phase, the mapper also emits a generated fix artifact: a
//! standalone, idempotent shell script that backs up the affected file
//! with a timestamped copy before applying a small fixed set of literal
//! substitutions. Re-running the script against an already-fixed file is
//! a no-op. This is templated text substitution over a reviewed set of
//! edits, never dynamic code execution.

use std::path::{Path, PathBuf};

use verdict_core::CoreResult;

use crate::aggregator::PhaseSnapshot;
use crate::models::{ErrorCategory, Phase, RemediationEntry};

/// File name of the generated block-hash remediation script.
pub const FIX_SCRIPT_NAME: &str = "fix-block-hash.sh";

const FIX_SCRIPT_TEMPLATE: &str = r#"#!/bin/sh
# Remediation for the block-hash width confusion: a block hash declared as
# a plain 64-bit integer but used as a 32-byte array. Applies a fixed set
# of literal substitutions. Safe to re-run: when the known signature is
# absent the script changes nothing and exits successfully.
set -eu

FILE="${1:-__DEFAULT_TARGET__}"

if [ ! -f "$FILE" ]; then
    echo "target file not found: $FILE" >&2
    exit 1
fi

if ! grep -q 'type BlockHash = u64;' "$FILE"; then
    echo "no matching text in $FILE; nothing to do"
    exit 0
fi

STAMP=$(date +%Y%m%d%H%M%S)
cp "$FILE" "$FILE.bak.$STAMP"
echo "backup written to $FILE.bak.$STAMP"

sed -e 's/type BlockHash = u64;/type BlockHash = [u8; 32];/' \
    -e 's/BlockHash = 0;/BlockHash = [0u8; 32];/' \
    "$FILE" > "$FILE.fixtmp"
mv "$FILE.fixtmp" "$FILE"

echo "applied block-hash width fix to $FILE"
"#;

/// Static remediation lookup for aggregated failures.
pub struct RemediationMapper {
    /// Directory the generated fix artifact is written to, when enabled
    fix_dir: Option<PathBuf>,
    /// Default target file baked into the generated script
    fix_target: String,
}

impl Default for RemediationMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl RemediationMapper {
    /// Create a mapper that only produces suggestion text.
    pub fn new() -> Self {
        Self {
            fix_dir: None,
            fix_target: "src/types.rs".to_string(),
        }
    }

    /// Enable fix-artifact generation into the given directory.
    pub fn with_fix_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fix_dir = Some(dir.into());
        self
    }

    /// Set the default target file baked into the generated script.
    pub fn with_fix_target(mut self, target: impl Into<String>) -> Self {
        self.fix_target = target.into();
        self
    }

    /// Suggest a fix for one recorded `(phase, category)` pair.
    ///
    /// Returns `None` when the pair has zero recorded occurrences or no
    /// table entry; "no suggestion" is a valid answer, not an error.
    /// Suggestion text is parameterized with the most recent detail seen
    /// for the pair (last-wins, reflecting escalating specificity).
    pub fn suggest(
        &self,
        snapshot: &PhaseSnapshot,
        category: ErrorCategory,
    ) -> Option<RemediationEntry> {
        let counter = snapshot.counter(category)?;
        if counter.count == 0 {
            return None;
        }
        let detail = counter.detail.as_deref();
        let suggestion = Self::lookup(snapshot.phase, category, detail)?;

        let artifact = if category == ErrorCategory::BlockHashMismatch {
            match self.write_fix_script() {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!(error = %e, "fix artifact generation failed; suggestion text only");
                    None
                }
            }
        } else {
            None
        };

        Some(RemediationEntry {
            phase: snapshot.phase,
            category,
            suggestion,
            artifact,
        })
    }

    /// All remediation entries for a phase, in the snapshot's first-seen
    /// category order. At most one entry per `(phase, category)` pair.
    pub fn suggest_all(&self, snapshot: &PhaseSnapshot) -> Vec<RemediationEntry> {
        snapshot
            .counters
            .iter()
            .filter_map(|c| self.suggest(snapshot, c.category))
            .collect()
    }

    /// The static `(phase, category)` suggestion table.
    fn lookup(phase: Phase, category: ErrorCategory, detail: Option<&str>) -> Option<String> {
        use ErrorCategory::*;

        let text = match (phase, category) {
            (Phase::NativeBuild | Phase::LogReview, BlockHashMismatch) => match detail {
                Some(width) => format!(
                    "The block hash is declared as a plain {} but used as a fixed-size \
                     32-byte array. Align the BlockHash alias with `[u8; 32]`; the \
                     generated fix script applies the known substitutions after taking \
                     a timestamped backup.",
                    width
                ),
                None => "The block hash integer width conflicts with its fixed-size-array \
                         usage. Align the BlockHash alias with `[u8; 32]`; the generated \
                         fix script applies the known substitutions after taking a \
                         timestamped backup."
                    .to_string(),
            },
            (Phase::NativeBuild | Phase::LogReview, TypeMismatch) => {
                "Compare the expected and found types in the diagnostic; adjust the \
                 declaration or insert the appropriate conversion at the use site."
                    .to_string()
            }
            (Phase::NativeBuild | Phase::LogReview, MissingSymbol) => {
                "Check the symbol name for typos and verify the defining module is \
                 imported; a renamed or removed item upstream is the usual cause."
                    .to_string()
            }
            (Phase::NativeBuild | Phase::LogReview, BorrowConflict) => {
                "Restructure the conflicting borrows: narrow the borrow scopes, split \
                 the struct, or clone the contested value if it is small."
                    .to_string()
            }
            (Phase::NativeBuild | Phase::LogReview, TestFailure) => match detail {
                Some(name) => format!(
                    "Re-run `{}` in isolation with `-- --nocapture` and compare the \
                     assertion output against the last known-good run.",
                    name
                ),
                None => "Re-run the failing test in isolation with `-- --nocapture`."
                    .to_string(),
            },
            (Phase::NativeBuild | Phase::LogReview, General) => {
                "Read the first diagnostic in the build output; later errors are \
                 frequently cascades of the first one."
                    .to_string()
            }
            (Phase::ModelCheck, ParseError) => {
                "The specification failed to parse. Check recent edits for unbalanced \
                 delimiters and for format strings interpreted as specification syntax."
                    .to_string()
            }
            (Phase::ModelCheck, PropertyViolation) => match detail {
                Some(prop) => format!(
                    "Property `{}` was violated. Walk the counterexample trace from the \
                     last stuttering step backwards to find the first bad transition.",
                    prop
                ),
                None => "A checked property was violated. Walk the counterexample trace \
                         backwards to find the first bad transition."
                    .to_string(),
            },
            (Phase::ModelCheck, General) => {
                "The model checker reported a generic error; inspect the full tool \
                 output around the first Error: marker."
                    .to_string()
            }
            (Phase::ProofCheck, ProofFailure) => match detail {
                Some(ob) => format!(
                    "Obligation {} failed. Try a larger timeout or a different backend \
                     before weakening the step; failed obligations often need the \
                     preceding lemma strengthened.",
                    ob
                ),
                None => "A proof obligation failed. Try a larger timeout or a different \
                         backend before weakening the step."
                    .to_string(),
            },
            (Phase::ProofCheck, ParseError) => {
                "The proof file failed to parse; check the most recently edited proof \
                 steps for syntax errors."
                    .to_string()
            }
            (Phase::ProofCheck, General) => {
                "The proof checker reported a generic failure; inspect the tool output \
                 around the first failure marker."
                    .to_string()
            }
            (Phase::Resources, ResourceMemory) => {
                "Memory utilization is above the high-water mark. Reduce concurrent \
                 verification load or lower the model checker's worker count before \
                 the next run."
                    .to_string()
            }
            (Phase::Resources, ResourceDisk) => {
                "Disk utilization is above the high-water mark. Prune old state dumps \
                 and report archives before the next run."
                    .to_string()
            }
            _ => return None,
        };
        Some(text)
    }

    /// Write the block-hash fix script, returning its path. Regeneration
    /// overwrites the previous script with identical content; the script
    /// itself carries the idempotence and backup guarantees.
    fn write_fix_script(&self) -> CoreResult<Option<PathBuf>> {
        let Some(dir) = &self.fix_dir else {
            return Ok(None);
        };
        std::fs::create_dir_all(dir)?;
        let path = dir.join(FIX_SCRIPT_NAME);
        let body = FIX_SCRIPT_TEMPLATE.replace("__DEFAULT_TARGET__", &self.fix_target);
        std::fs::write(&path, body)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms)?;
        }

        tracing::info!(path = %path.display(), "wrote remediation script");
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::PhaseLedger;
    use crate::models::{Level, LogEvent};

    fn snapshot_with(
        phase: Phase,
        category: ErrorCategory,
        detail: Option<&str>,
    ) -> PhaseSnapshot {
        let mut ledger = PhaseLedger::new(phase);
        ledger.record(&LogEvent::classified(
            phase,
            Level::Error,
            "example failure line",
            category,
            detail.map(String::from),
        ));
        ledger
    }

    #[test]
    fn test_no_suggestion_for_zero_occurrences() {
        let mapper = RemediationMapper::new();
        let empty = PhaseLedger::new(Phase::NativeBuild);
        assert!(mapper.suggest(&empty, ErrorCategory::TypeMismatch).is_none());
    }

    #[test]
    fn test_suggestion_exists_iff_recorded() {
        let mapper = RemediationMapper::new();
        let snapshot = snapshot_with(Phase::NativeBuild, ErrorCategory::TypeMismatch, None);

        assert!(mapper.suggest(&snapshot, ErrorCategory::TypeMismatch).is_some());
        assert!(mapper.suggest(&snapshot, ErrorCategory::BorrowConflict).is_none());
    }

    #[test]
    fn test_block_hash_suggestion_mentions_confusion() {
        let mapper = RemediationMapper::new();
        let snapshot =
            snapshot_with(Phase::NativeBuild, ErrorCategory::BlockHashMismatch, Some("u64"));

        let entry = mapper
            .suggest(&snapshot, ErrorCategory::BlockHashMismatch)
            .unwrap();
        assert!(entry.suggestion.contains("u64"));
        assert!(entry.suggestion.contains("[u8; 32]"));
        // No fix dir configured: text only.
        assert!(entry.artifact.is_none());
    }

    #[test]
    fn test_test_failure_parameterized_with_name() {
        let mapper = RemediationMapper::new();
        let snapshot = snapshot_with(
            Phase::NativeBuild,
            ErrorCategory::TestFailure,
            Some("consensus::tests::commit_quorum"),
        );

        let entry = mapper.suggest(&snapshot, ErrorCategory::TestFailure).unwrap();
        assert!(entry.suggestion.contains("consensus::tests::commit_quorum"));
    }

    #[test]
    fn test_resource_memory_advises_reduced_load() {
        let mapper = RemediationMapper::new();
        let mut ledger = PhaseLedger::new(Phase::Resources);
        ledger.record(&LogEvent::classified(
            Phase::Resources,
            Level::Warning,
            "memory utilization 92%",
            ErrorCategory::ResourceMemory,
            None,
        ));

        let entry = mapper.suggest(&ledger, ErrorCategory::ResourceMemory).unwrap();
        assert!(entry.suggestion.contains("Reduce concurrent"));
    }

    #[test]
    fn test_suggest_all_order_matches_first_seen() {
        let mapper = RemediationMapper::new();
        let mut ledger = PhaseLedger::new(Phase::NativeBuild);
        for (cat, msg) in [
            (ErrorCategory::BorrowConflict, "b"),
            (ErrorCategory::TypeMismatch, "t"),
        ] {
            ledger.record(&LogEvent::classified(
                Phase::NativeBuild,
                Level::Error,
                msg,
                cat,
                None,
            ));
        }

        let entries = mapper.suggest_all(&ledger);
        let order: Vec<_> = entries.iter().map(|e| e.category).collect();
        assert_eq!(order, vec![ErrorCategory::BorrowConflict, ErrorCategory::TypeMismatch]);
    }

    #[test]
    fn test_fix_script_written_with_exec_bit() {
        let temp = tempfile::tempdir().unwrap();
        let mapper = RemediationMapper::new().with_fix_dir(temp.path());
        let snapshot =
            snapshot_with(Phase::NativeBuild, ErrorCategory::BlockHashMismatch, Some("u64"));

        let entry = mapper
            .suggest(&snapshot, ErrorCategory::BlockHashMismatch)
            .unwrap();
        let path = entry.artifact.expect("artifact path");
        assert!(path.exists());

        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.starts_with("#!/bin/sh"));
        assert!(body.contains("cp \"$FILE\" \"$FILE.bak.$STAMP\""));
        assert!(body.contains("grep -q"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_fix_script_idempotent_with_one_backup_per_modifying_run() {
        use std::process::Command;

        let temp = tempfile::tempdir().unwrap();
        let mapper = RemediationMapper::new().with_fix_dir(temp.path());
        let snapshot =
            snapshot_with(Phase::NativeBuild, ErrorCategory::BlockHashMismatch, Some("u64"));
        let script = mapper
            .suggest(&snapshot, ErrorCategory::BlockHashMismatch)
            .unwrap()
            .artifact
            .unwrap();

        let target = temp.path().join("types.rs");
        std::fs::write(&target, "pub type BlockHash = u64;\nlet genesis: BlockHash = 0;\n")
            .unwrap();

        // First run: modifies the file and takes exactly one backup.
        let status = Command::new("sh")
            .arg(&script)
            .arg(&target)
            .status()
            .unwrap();
        assert!(status.success());
        let fixed = std::fs::read_to_string(&target).unwrap();
        assert!(fixed.contains("type BlockHash = [u8; 32];"));
        assert!(fixed.contains("BlockHash = [0u8; 32];"));
        assert_eq!(count_backups(temp.path()), 1);

        // Second run: no further modification, no further backup.
        let status = Command::new("sh")
            .arg(&script)
            .arg(&target)
            .status()
            .unwrap();
        assert!(status.success());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), fixed);
        assert_eq!(count_backups(temp.path()), 1);
    }

    #[cfg(unix)]
    fn count_backups(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().contains(".bak."))
            .count()
    }
}
