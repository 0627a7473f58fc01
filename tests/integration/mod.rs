//! End-to-end integration tests: captured collaborator logs in, rendered
//! triage reports out.

use std::fs;
use std::path::Path;

use verdict::config::RunConfig;
use verdict::runner::{Runner, EVENTS_ARCHIVE_NAME};
use verdict_triage::{ErrorCategory, Phase, PhaseStatus};

const BUILD_LOG: &str = "\
   Compiling consensus v0.3.0
error[E0308]: mismatched types
  --> src/types.rs:14:27
   = note: expected `u64`, found `[u8; 32]`
error[E0502]: cannot borrow `state` as mutable because it is also borrowed as immutable
  --> src/engine.rs:88:9
warning: unused variable: `epoch`
test consensus::tests::commit_quorum ... FAILED
error: aborting due to 2 previous errors
";

const MODEL_CHECK_LOG: &str = "\
TLC2 Version 2.18
Computing initial states...
Error: Invariant TypeOK is violated.
The behavior up to this point is:
State 1: <Initial predicate>
";

const PROOF_CHECK_LOG: &str = "\
Proof Manager starting
obligation 17 failed (zenon, timeout 10s)
obligation 18 failed (ls4, timeout 10s)
";

fn write_logs(dir: &Path) {
    fs::write(dir.join("native-build.log"), BUILD_LOG).unwrap();
    fs::write(dir.join("model-check.log"), MODEL_CHECK_LOG).unwrap();
    fs::write(dir.join("proof-check.log"), PROOF_CHECK_LOG).unwrap();
}

fn test_config(out_dir: &Path, fix_scripts: bool) -> RunConfig {
    let mut config = RunConfig::default();
    config.output.dir = out_dir.to_path_buf();
    config.fix.scripts = fix_scripts;
    config
}

#[tokio::test]
async fn test_full_run_produces_all_reports() {
    let logs = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_logs(logs.path());

    let runner = Runner::new(
        test_config(out.path(), true),
        Some(logs.path().to_path_buf()),
    )
    .with_probe(false);
    let outcome = runner.execute().await.unwrap();

    // One report per phase plus the consolidated report.
    assert_eq!(outcome.reports.len(), Phase::ALL.len());
    for path in &outcome.reports {
        assert!(path.exists(), "missing report: {}", path.display());
    }
    assert!(outcome.summary_report.exists());

    // The event archive is valid JSON and, like the reports, leaves no
    // temp file behind.
    let archive = fs::read_to_string(out.path().join(EVENTS_ARCHIVE_NAME)).unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&archive)
        .unwrap()
        .is_array());
    assert!(fs::read_dir(out.path())
        .unwrap()
        .filter_map(Result::ok)
        .all(|e| !e.file_name().to_string_lossy().ends_with(".tmp")));

    // The model-check phase saw a CRITICAL violation; the build phase
    // only ERROR-level diagnostics.
    let model = outcome
        .snapshot
        .phases
        .iter()
        .find(|p| p.phase == Phase::ModelCheck)
        .unwrap();
    assert_eq!(model.status, PhaseStatus::Failed);

    let build = outcome
        .snapshot
        .phases
        .iter()
        .find(|p| p.phase == Phase::NativeBuild)
        .unwrap();
    assert_eq!(build.status, PhaseStatus::Degraded);
    assert_eq!(build.count(ErrorCategory::BlockHashMismatch), 1);
    assert_eq!(build.count(ErrorCategory::BorrowConflict), 1);
    assert_eq!(build.count(ErrorCategory::TestFailure), 1);
    assert_eq!(build.warning_count, 1);

    assert_eq!(outcome.snapshot.overall_status, PhaseStatus::Failed);
}

#[tokio::test]
async fn test_build_report_contains_block_hash_remediation() {
    let logs = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_logs(logs.path());

    let runner = Runner::new(
        test_config(out.path(), true),
        Some(logs.path().to_path_buf()),
    )
    .with_probe(false);
    runner.execute().await.unwrap();

    let report = fs::read_to_string(out.path().join("report-native-build.txt")).unwrap();
    assert!(report.contains("type-mismatch/block-hash (count: 1)"));
    assert!(report.contains("remediation:"));
    assert!(report.contains("[u8; 32]"));
    assert!(report.contains("fix script:"));

    let script = out.path().join("fix-block-hash.sh");
    assert!(script.exists());
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&script).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}

#[tokio::test]
async fn test_replayed_log_doubles_counts_same_categories() {
    let logs = tempfile::tempdir().unwrap();
    let out_single = tempfile::tempdir().unwrap();
    let out_double = tempfile::tempdir().unwrap();

    fs::write(logs.path().join("proof-check.log"), PROOF_CHECK_LOG).unwrap();
    let single = Runner::new(
        test_config(out_single.path(), false),
        Some(logs.path().to_path_buf()),
    )
    .with_probe(false)
    .execute()
    .await
    .unwrap();

    let doubled_log = format!("{}{}", PROOF_CHECK_LOG, PROOF_CHECK_LOG);
    fs::write(logs.path().join("proof-check.log"), doubled_log).unwrap();
    let doubled = Runner::new(
        test_config(out_double.path(), false),
        Some(logs.path().to_path_buf()),
    )
    .with_probe(false)
    .execute()
    .await
    .unwrap();

    let proof =
        |o: &verdict::runner::RunOutcome| -> Vec<(ErrorCategory, u64, Vec<String>)> {
            o.snapshot
                .phases
                .iter()
                .find(|p| p.phase == Phase::ProofCheck)
                .unwrap()
                .counters
                .iter()
                .map(|c| (c.category, c.count, c.examples.clone()))
                .collect()
        };

    let single_counters = proof(&single);
    let double_counters = proof(&doubled);

    // Same category set and same distinct examples; counts doubled.
    assert_eq!(single_counters.len(), double_counters.len());
    for ((cat_a, count_a, ex_a), (cat_b, count_b, ex_b)) in
        single_counters.iter().zip(double_counters.iter())
    {
        assert_eq!(cat_a, cat_b);
        assert_eq!(count_a * 2, *count_b);
        assert_eq!(ex_a, ex_b);
    }
}

#[tokio::test]
async fn test_passing_proof_run_stays_healthy() {
    let logs = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fs::write(
        logs.path().join("proof-check.log"),
        "Proof Manager starting\n\
         obligations: 42 proved, 0 failed, 0 omitted\n\
         all obligations proved\n",
    )
    .unwrap();

    let runner = Runner::new(
        test_config(out.path(), false),
        Some(logs.path().to_path_buf()),
    )
    .with_probe(false);
    let outcome = runner.execute().await.unwrap();

    // Success-summary lines mentioning "failed" with a zero count must
    // not be recorded as failures.
    let proof = outcome
        .snapshot
        .phases
        .iter()
        .find(|p| p.phase == Phase::ProofCheck)
        .unwrap();
    assert_eq!(proof.status, PhaseStatus::Healthy);
    assert!(proof.counters.is_empty());
    assert_eq!(proof.error_count, 0);

    let report = fs::read_to_string(out.path().join("report-proof-check.txt")).unwrap();
    assert!(report.contains("categories: none recorded"));
    assert!(!report.contains("remediation:"));
}

#[tokio::test]
async fn test_missing_logs_yield_empty_healthy_reports() {
    let logs = tempfile::tempdir().unwrap(); // no log files at all
    let out = tempfile::tempdir().unwrap();

    let runner = Runner::new(
        test_config(out.path(), false),
        Some(logs.path().to_path_buf()),
    )
    .with_probe(false);
    let outcome = runner.execute().await.unwrap();

    assert_eq!(outcome.snapshot.total_errors, 0);
    assert_eq!(outcome.snapshot.overall_status, PhaseStatus::Healthy);

    let report = fs::read_to_string(out.path().join("report-model-check.txt")).unwrap();
    assert!(report.contains("status: healthy"));
    assert!(report.contains("errors: 0"));
    assert!(report.contains("categories: none recorded"));
    assert!(!report.contains("remediation:"));
}

#[tokio::test]
async fn test_phase_restriction_isolates_state() {
    let logs = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_logs(logs.path());

    let runner = Runner::new(
        test_config(out.path(), false),
        Some(logs.path().to_path_buf()),
    )
    .with_probe(false)
    .with_phases(vec![Phase::NativeBuild]);
    let outcome = runner.execute().await.unwrap();

    let model = outcome
        .snapshot
        .phases
        .iter()
        .find(|p| p.phase == Phase::ModelCheck)
        .unwrap();
    assert_eq!(model.status, PhaseStatus::Healthy);
    assert!(model.counters.is_empty());

    let build = outcome
        .snapshot
        .phases
        .iter()
        .find(|p| p.phase == Phase::NativeBuild)
        .unwrap();
    assert!(build.error_count > 0);
}

#[tokio::test]
async fn test_rerun_overwrites_reports_in_place() {
    let logs = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_logs(logs.path());

    let config = test_config(out.path(), false);
    let runner = Runner::new(config, Some(logs.path().to_path_buf())).with_probe(false);
    runner.execute().await.unwrap();
    let first_count = fs::read_dir(out.path()).unwrap().count();

    runner.execute().await.unwrap();
    let second_count = fs::read_dir(out.path()).unwrap().count();

    // Reports are regenerated, not accumulated. Counters reset at run
    // start, so the rendered counts are identical across reruns.
    assert_eq!(first_count, second_count);
}

#[tokio::test]
async fn test_explicit_log_mapping_overrides_logs_dir() {
    let logs = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let custom = logs.path().join("captured-tlc-output.txt");
    fs::write(&custom, MODEL_CHECK_LOG).unwrap();

    let mut config = test_config(out.path(), false);
    config.logs.insert("tlc".to_string(), custom);

    let runner = Runner::new(config, None).with_probe(false);
    let outcome = runner.execute().await.unwrap();

    let model = outcome
        .snapshot
        .phases
        .iter()
        .find(|p| p.phase == Phase::ModelCheck)
        .unwrap();
    assert_eq!(model.count(ErrorCategory::PropertyViolation), 1);
    assert_eq!(model.status, PhaseStatus::Failed);
}
