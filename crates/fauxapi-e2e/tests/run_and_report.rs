//! End-to-end runs of the scenario catalog against the fake client,
//! through aggregation and report writing.

use fauxapi_core::{ClientConfig, ErrorKind, FailureRate, FakeApiClient, FixedSequence};
use fauxapi_e2e::{
    InjectedFailurePolicy, JSON_REPORT_FILE, JsonReporter, MARKDOWN_REPORT_FILE, RESULTS_FILE,
    ReportDocument, ReportFormat, ReportWriter, RunConfig, RunResults, TestRunner, aggregate,
    artifact_name, boxed_scenarios, error_kind, load_records,
};
use chrono::{TimeZone, Utc};
use tempfile::TempDir;

fn seeded_client(rate: f64, seed: u64) -> FakeApiClient {
    FakeApiClient::new(ClientConfig {
        failure_rate: FailureRate::new(rate).unwrap(),
        seed: Some(seed),
        ..ClientConfig::default()
    })
    .unwrap()
}

#[test]
fn zero_failure_rate_passes_every_scenario() {
    let runner = TestRunner::new(boxed_scenarios());
    let results = runner.run_all(&mut seeded_client(0.0, 1)).unwrap();
    let report = aggregate(&results.records);

    assert_eq!(report.total, 20);
    assert_eq!(report.passed, 20);
    assert_eq!(report.failed, 0);
    assert_eq!(report.pass_rate, 100.0);
    assert_eq!(report.fail_rate, 0.0);
    assert!(report.error_type_histogram.is_empty());
    assert!(report.most_common_error().is_none());
}

#[test]
fn full_failure_rate_fails_every_scenario() {
    let runner = TestRunner::new(boxed_scenarios());
    let results = runner.run_all(&mut seeded_client(1.0, 2)).unwrap();
    let report = aggregate(&results.records);

    assert_eq!(report.total, 20);
    assert_eq!(report.failed, 20);
    assert_eq!(report.fail_rate, 100.0);
    assert_eq!(report.error_type_histogram.values().sum::<usize>(), 20);

    let labels: Vec<&str> = ErrorKind::ALL.iter().map(|k| k.label()).collect();
    for label in report.error_type_histogram.keys() {
        assert!(labels.contains(&label.as_str()), "unexpected label {}", label);
    }
    for record in &results.records {
        let code = record.status_code.unwrap();
        assert!(ErrorKind::from_status(code).is_some(), "{} is not a failure code", code);
    }
}

#[test]
fn tolerate_policy_passes_well_formed_failures() {
    let runner = TestRunner::new(boxed_scenarios());
    let config = RunConfig::new().with_policy(InjectedFailurePolicy::Tolerate);
    let results = runner.run(&mut seeded_client(1.0, 3), &config).unwrap();

    assert_eq!(results.total_count(), 20);
    assert!(results.all_passed());
}

#[test]
fn rate_limit_failure_is_classified_with_its_status() {
    // Fail, pick index 8 of the taxonomy, then mid-range latency.
    let source = FixedSequence::new([0.0, 0.85, 0.5]);
    let mut client =
        FakeApiClient::with_source(ClientConfig::with_failure_rate(FailureRate::ALWAYS), source)
            .unwrap();

    let runner = TestRunner::new(boxed_scenarios());
    let config = RunConfig::new().with_filter("get_user_list");
    let results = runner.run(&mut client, &config).unwrap();
    let report = aggregate(&results.records);

    assert_eq!(report.total, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.error_type_histogram.get("RateLimit"), Some(&1));
    assert_eq!(results.records[0].status_code, Some(429));
    assert_eq!(
        error_kind(results.records[0].error_detail.as_deref()),
        Some(ErrorKind::RateLimit)
    );
}

#[test]
fn observed_failure_fraction_converges_to_rate() {
    let runner = TestRunner::new(boxed_scenarios());
    let mut client = seeded_client(0.3, 2024);

    let mut failed = 0;
    let mut total = 0;
    for _ in 0..50 {
        let results = runner.run_all(&mut client).unwrap();
        failed += results.failed_count();
        total += results.total_count();
    }

    let fraction = failed as f64 / total as f64;
    assert_eq!(total, 1000);
    assert!((fraction - 0.3).abs() < 0.06, "observed {}", fraction);
}

#[test]
fn seeded_runs_produce_identical_reports() {
    let runner = TestRunner::new(boxed_scenarios());
    let first = runner.run_all(&mut seeded_client(0.5, 77)).unwrap();
    let second = runner.run_all(&mut seeded_client(0.5, 77)).unwrap();

    assert_eq!(first.records, second.records);
    assert_eq!(aggregate(&first.records), aggregate(&second.records));
}

#[test]
fn rates_always_sum_to_one_hundred() {
    let runner = TestRunner::new(boxed_scenarios());
    for seed in 0..10 {
        let results = runner.run_all(&mut seeded_client(0.4, seed)).unwrap();
        let report = aggregate(&results.records);
        assert_eq!(report.passed + report.failed, report.total);
        assert!((report.pass_rate + report.fail_rate - 100.0).abs() < 1e-9);
        assert_eq!(
            report.error_type_histogram.values().sum::<usize>(),
            report.failed
        );
    }
}

#[test]
fn writer_outputs_reload_into_the_same_report() {
    let temp = TempDir::new().unwrap();
    let runner = TestRunner::new(boxed_scenarios());
    let results = runner.run_all(&mut seeded_client(0.3, 11)).unwrap();

    let writer = ReportWriter::new(temp.path().to_path_buf());
    let paths = writer.write(&results, ReportFormat::Both).unwrap();
    assert_eq!(paths.len(), 3);
    assert!(temp.path().join(RESULTS_FILE).exists());
    assert!(temp.path().join(MARKDOWN_REPORT_FILE).exists());
    assert!(temp.path().join(JSON_REPORT_FILE).exists());

    let saved = std::fs::read_to_string(temp.path().join(RESULTS_FILE)).unwrap();
    let reloaded = RunResults::from_records(load_records(&saved).unwrap());
    let original = aggregate(&results.records);
    let again = aggregate(&reloaded.records);

    assert_eq!(again.total, original.total);
    assert_eq!(again.passed, original.passed);
    assert_eq!(again.error_type_histogram, original.error_type_histogram);
    assert_eq!(
        again.fastest.map(|r| r.name),
        original.fastest.map(|r| r.name)
    );
    assert_eq!(
        again.slowest.map(|r| r.name),
        original.slowest.map(|r| r.name)
    );

    let json = std::fs::read_to_string(temp.path().join(JSON_REPORT_FILE)).unwrap();
    let document: ReportDocument = serde_json::from_str(&json).unwrap();
    assert_eq!(document.summary.total_tests, 20);
    assert_eq!(
        document.test_results.passed.len() + document.test_results.failed.len(),
        20
    );
    assert_eq!(document.report_metadata.seed, Some(11));
}

#[test]
fn empty_results_still_produce_a_report() {
    let results = RunResults::default();
    let report = aggregate(&results.records);
    let generated_at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let document = JsonReporter::new().build_report(&results, &report, generated_at);

    assert_eq!(document.summary.total_tests, 0);
    assert_eq!(document.summary.pass_rate, 0.0);
    assert_eq!(document.summary.fail_rate, 0.0);
    assert!(document.performance_metrics.fastest_test.is_none());
    assert!(document.performance_metrics.slowest_test.is_none());
    assert_eq!(document.performance_metrics.average_duration, 0.0);
    assert!(document.failure_analysis.most_common_error.is_none());

    assert_eq!(
        artifact_name(&generated_at, "local", &report, "json"),
        "2024-01-02_03-04-05_run_local_(0Passes_0Fails_0Total).json"
    );
}

#[test]
fn artifact_name_reflects_run_counts() {
    let runner = TestRunner::new(boxed_scenarios());
    let results = runner.run_all(&mut seeded_client(1.0, 5)).unwrap();
    let report = aggregate(&results.records);
    let ts = Utc.with_ymd_and_hms(2025, 6, 7, 8, 9, 10).unwrap();

    assert_eq!(
        artifact_name(&ts, "123", &report, "json"),
        "2025-06-07_08-09-10_run_123_(0Passes_20Fails_20Total).json"
    );
}
