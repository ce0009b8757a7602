//! Reporters for test run results.
//!
//! This module provides multiple reporter types:
//! - `TerminalReporter`: Colored terminal output for progress and results
//! - `JsonReporter`: The machine-readable report document
//! - `MarkdownReporter`: Human-readable markdown summary
//! - `ReportWriter`: Writes records and reports into an output directory
//!
//! # Example
//!
//! ```no_run
//! use fauxapi_e2e::{ReportFormat, ReportWriter, RunResults, TerminalReporter, aggregate};
//! use std::path::PathBuf;
//!
//! let results = RunResults::default();
//! let report = aggregate(&results.records);
//!
//! TerminalReporter::new().print_summary(&results, &report);
//!
//! let writer = ReportWriter::new(PathBuf::from(".fauxapi-reports"));
//! writer.write(&results, ReportFormat::Both).unwrap();
//! ```

use crate::aggregator::{RunReport, aggregate, error_type};
use crate::models::{ReportFormat, TestOutcome, TestRecord, duration_serde};
use crate::runner::{ProgressEvent, RunResults};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Raw records file name.
pub const RESULTS_FILE: &str = "results.json";
/// JSON report file name.
pub const JSON_REPORT_FILE: &str = "report.json";
/// Markdown report file name.
pub const MARKDOWN_REPORT_FILE: &str = "report.md";

/// Verbosity level for terminal output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Show only pass/fail summary.
    Quiet,
    /// Normal output with progress.
    #[default]
    Normal,
    /// Detailed output including error details.
    Verbose,
}

fn verdict_of(report: &RunReport) -> (&'static str, &'static str, colored::Color) {
    if report.failed == 0 {
        ("🟢", "PASSED", colored::Color::Green)
    } else if report.passed > 0 {
        ("🟡", "MIXED", colored::Color::Yellow)
    } else {
        ("🔴", "FAILED", colored::Color::Red)
    }
}

/// Terminal reporter for test results.
#[derive(Debug, Default)]
pub struct TerminalReporter {
    verbosity: Verbosity,

    /// Track current catalog for grouping output.
    current_catalog: Option<String>,
}

impl TerminalReporter {
    /// Creates a new terminal reporter with normal verbosity.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verbosity(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            current_catalog: None,
        }
    }

    /// Handles a progress event, printing appropriate output.
    pub fn handle_progress(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::RunStarted { total_scenarios } => {
                if self.verbosity != Verbosity::Quiet {
                    self.print_run_started(total_scenarios);
                }
            }
            ProgressEvent::ScenarioStarted { catalog, .. } => {
                if self.verbosity != Verbosity::Quiet {
                    self.print_catalog_header(catalog.as_str());
                }
            }
            ProgressEvent::ScenarioCompleted { record, .. } => {
                if self.verbosity != Verbosity::Quiet {
                    self.print_scenario_completed(&record);
                }
            }
            ProgressEvent::RunCompleted { results } => {
                // Summary is printed separately via print_summary
                if self.verbosity == Verbosity::Quiet {
                    self.print_quiet_summary(&results);
                }
            }
        }
    }

    fn print_run_started(&self, total: usize) {
        println!(
            "\n{}",
            format!(
                "Running {} scenario{}...",
                total,
                if total == 1 { "" } else { "s" }
            )
            .bold()
        );
    }

    fn print_catalog_header(&mut self, catalog: &str) {
        if self.current_catalog.as_deref() != Some(catalog) {
            self.current_catalog = Some(catalog.to_string());
            println!("\n{}", catalog.bold().underline());
        }
    }

    fn print_scenario_completed(&self, record: &TestRecord) {
        let status = if record.passed() { "✅" } else { "❌" };
        let duration = format!("({}ms)", record.duration.as_millis()).dimmed();
        println!("  {} {} {}", status, record.name, duration);

        if self.verbosity == Verbosity::Verbose
            && let Some(detail) = &record.error_detail
        {
            println!("     {}", detail.red());
        }
        io::stdout().flush().ok();
    }

    fn print_quiet_summary(&self, results: &RunResults) {
        let passed = results.passed_count();
        let failed = results.failed_count();
        let total = results.total_count();

        if failed == 0 {
            println!("{}", format!("✓ {}/{} passed", passed, total).green());
        } else {
            println!("{}", format!("✗ {}/{} failed", failed, total).red());
        }
    }

    /// Prints a full summary of the test run.
    pub fn print_summary(&self, results: &RunResults, report: &RunReport) {
        println!("\n{}", "━".repeat(40).dimmed());

        let (emoji, verdict, color) = verdict_of(report);

        let mut parts = vec![];
        if report.passed > 0 {
            parts.push(
                format!("{} passed ({:.2}%)", report.passed, report.pass_rate)
                    .green()
                    .to_string(),
            );
        }
        if report.failed > 0 {
            parts.push(
                format!("{} failed ({:.2}%)", report.failed, report.fail_rate)
                    .red()
                    .to_string(),
            );
        }

        let verdict_text = format!("{}: {} of {} tests", verdict, report.passed, report.total);
        println!("{} {}", emoji, verdict_text.color(color).bold());
        if !parts.is_empty() {
            println!("   {}", parts.join(", "));
        }

        if let Some(rate) = results.failure_rate {
            let seed = results
                .seed
                .map_or_else(|| "random".to_string(), |s| s.to_string());
            println!(
                "   {}",
                format!("Injected failure rate {:.0}%, seed {}", rate * 100.0, seed).dimmed()
            );
        }

        println!(
            "\n   {}",
            format!(
                "Simulated time {:.3}s, average {:.3}s",
                report.total_duration.as_secs_f64(),
                report.average_duration
            )
            .dimmed()
        );
    }

    /// Prints the error-type histogram, most frequent first.
    pub fn print_failure_analysis(&self, report: &RunReport) {
        if report.error_type_histogram.is_empty() {
            return;
        }

        println!("\n{}", "Failure Analysis:".red().bold());
        let mut rows: Vec<(&String, &usize)> = report.error_type_histogram.iter().collect();
        rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (label, count) in rows {
            println!("  - {}: {}", label, count);
        }
    }

    /// Prints detailed results for failed tests.
    pub fn print_failures(&self, results: &RunResults) {
        let failures = results.failures();
        if failures.is_empty() {
            return;
        }

        println!("\n{}", "Failed Tests:".red().bold());
        for record in failures {
            println!("  {} {}", "❌".red(), record.name.red().bold());
            let detail = record.error_detail.as_deref().unwrap_or("No error message");
            println!("     {}", detail.dimmed());
        }
    }

    /// Prints results grouped by catalog.
    pub fn print_by_catalog(&self, results: &RunResults) {
        for (catalog, records) in results.by_catalog() {
            let failed = records.iter().filter(|r| !r.passed()).count();
            let header = format!("{} ({}/{} passed)", catalog, records.len() - failed, records.len());
            println!("\n{}", header.bold().underline());

            for record in records {
                self.print_scenario_completed(record);
            }
        }
    }
}

/// Creates a progress callback for use with TestRunner.
pub fn create_progress_callback(verbosity: Verbosity) -> crate::runner::ProgressCallback {
    let reporter = Arc::new(Mutex::new(TerminalReporter::with_verbosity(verbosity)));

    Box::new(move |event| {
        if let Ok(mut r) = reporter.lock() {
            r.handle_progress(event);
        }
    })
}

// ============================================================================
// Report Document
// ============================================================================

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReporterError {
    /// Failed to write report file.
    #[error("failed to write report: {0}")]
    WriteError(#[from] std::io::Error),

    /// Failed to serialize report to JSON.
    #[error("failed to serialize report: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// The machine-readable report. Field names are an external contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub report_metadata: ReportMetadata,
    pub summary: ReportSummary,
    pub test_results: TestResults,
    pub failure_analysis: FailureAnalysis,
    pub performance_metrics: PerformanceMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub harness_version: String,
    /// Seconds.
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    pub failure_rate: Option<f64>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
    pub fail_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestResults {
    pub passed: Vec<ResultEntry>,
    pub failed: Vec<ResultEntry>,
}

/// One record as it appears in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub name: String,
    pub catalog: String,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    pub outcome: TestOutcome,
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl From<&TestRecord> for ResultEntry {
    fn from(record: &TestRecord) -> Self {
        let (error_message, error_type) = if record.passed() {
            (None, None)
        } else {
            (
                Some(
                    record
                        .error_detail
                        .clone()
                        .unwrap_or_else(|| "No error message".to_string()),
                ),
                Some(error_type(record.error_detail.as_deref()).to_string()),
            )
        };
        Self {
            name: record.name.clone(),
            catalog: record.catalog.clone(),
            duration: record.duration,
            outcome: record.outcome,
            status_code: record.status_code,
            error_message,
            error_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureAnalysis {
    pub total_failures: usize,
    pub error_types: BTreeMap<String, usize>,
    pub most_common_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub fastest_test: Option<TestTiming>,
    pub slowest_test: Option<TestTiming>,
    /// Seconds, rounded to milliseconds.
    pub average_duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestTiming {
    pub name: String,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

impl From<&TestRecord> for TestTiming {
    fn from(record: &TestRecord) -> Self {
        Self {
            name: record.name.clone(),
            duration: record.duration,
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

// ============================================================================
// JSON Reporter
// ============================================================================

/// Generates the machine-readable JSON report.
#[derive(Debug, Default)]
pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }

    /// Generates the pretty-printed report for `results`.
    pub fn generate(&self, results: &RunResults) -> Result<String, ReporterError> {
        let report = aggregate(&results.records);
        let document = self.build_report(results, &report, Utc::now());
        serde_json::to_string_pretty(&document).map_err(ReporterError::from)
    }

    /// Builds the report document. Rates are rounded to two decimals and
    /// the average duration to three.
    pub fn build_report(
        &self,
        results: &RunResults,
        report: &RunReport,
        generated_at: DateTime<Utc>,
    ) -> ReportDocument {
        let (passed, failed): (Vec<&TestRecord>, Vec<&TestRecord>) =
            results.records.iter().partition(|r| r.passed());

        ReportDocument {
            report_metadata: ReportMetadata {
                generated_at,
                harness_version: crate::VERSION.to_string(),
                total_duration: results.duration,
                failure_rate: results.failure_rate,
                seed: results.seed,
            },
            summary: ReportSummary {
                total_tests: report.total,
                passed: report.passed,
                failed: report.failed,
                pass_rate: round_to(report.pass_rate, 2),
                fail_rate: round_to(report.fail_rate, 2),
            },
            test_results: TestResults {
                passed: passed.into_iter().map(ResultEntry::from).collect(),
                failed: failed.into_iter().map(ResultEntry::from).collect(),
            },
            failure_analysis: FailureAnalysis {
                total_failures: report.failed,
                error_types: report.error_type_histogram.clone(),
                most_common_error: report
                    .most_common_error()
                    .map(|(label, _)| label.to_string()),
            },
            performance_metrics: PerformanceMetrics {
                fastest_test: report.fastest.as_ref().map(TestTiming::from),
                slowest_test: report.slowest.as_ref().map(TestTiming::from),
                average_duration: round_to(report.average_duration, 3),
            },
        }
    }
}

// ============================================================================
// Markdown Reporter
// ============================================================================

/// Generates a human-readable markdown summary.
#[derive(Debug, Default)]
pub struct MarkdownReporter;

impl MarkdownReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, results: &RunResults) -> String {
        let report = aggregate(&results.records);
        self.render(results, &report, Utc::now())
    }

    /// Renders the markdown for an already aggregated report.
    pub fn render(&self, results: &RunResults, report: &RunReport, generated_at: DateTime<Utc>) -> String {
        let mut out = String::new();
        self.write_header(&mut out, results, report, generated_at);
        self.write_summary(&mut out, report);
        self.write_failure_analysis(&mut out, report);
        self.write_failed_tests(&mut out, results);
        self.write_performance(&mut out, report);
        out
    }

    fn write_header(
        &self,
        out: &mut String,
        results: &RunResults,
        report: &RunReport,
        generated_at: DateTime<Utc>,
    ) {
        out.push_str("# API Test Report\n\n");

        let (emoji, verdict, _) = verdict_of(report);
        out.push_str(&format!("## {} {}\n\n", emoji, verdict));
        out.push_str(&format!(
            "**Generated:** {}\n",
            generated_at.format("%Y-%m-%dT%H:%M:%SZ")
        ));
        out.push_str(&format!("**Harness Version:** {}\n", crate::VERSION));
        if let Some(rate) = results.failure_rate {
            out.push_str(&format!("**Failure Rate:** {:.0}%\n", rate * 100.0));
        }
        if let Some(seed) = results.seed {
            out.push_str(&format!("**Seed:** {}\n", seed));
        }
        out.push_str(&format!(
            "**Simulated Duration:** {:.3}s\n\n",
            results.duration.as_secs_f64()
        ));
    }

    fn write_summary(&self, out: &mut String, report: &RunReport) {
        out.push_str("## Summary\n\n");
        out.push_str("| Status | Count | Rate |\n");
        out.push_str("|--------|-------|------|\n");
        out.push_str(&format!(
            "| ✅ Passed | {} | {:.2}% |\n",
            report.passed, report.pass_rate
        ));
        out.push_str(&format!(
            "| ❌ Failed | {} | {:.2}% |\n",
            report.failed, report.fail_rate
        ));
        out.push_str(&format!("| Total | {} | |\n\n", report.total));
    }

    fn write_failure_analysis(&self, out: &mut String, report: &RunReport) {
        if report.error_type_histogram.is_empty() {
            return;
        }

        out.push_str("## Failure Analysis\n\n");
        out.push_str("| Error Type | Count |\n");
        out.push_str("|------------|-------|\n");
        for (label, count) in &report.error_type_histogram {
            out.push_str(&format!("| {} | {} |\n", label, count));
        }
        if let Some((label, count)) = report.most_common_error() {
            out.push_str(&format!("\n**Most common:** {} ({})\n", label, count));
        }
        out.push('\n');
    }

    fn write_failed_tests(&self, out: &mut String, results: &RunResults) {
        let failures = results.failures();
        if failures.is_empty() {
            return;
        }

        out.push_str("## Failed Tests\n\n");
        for record in failures {
            out.push_str(&format!(
                "- **{}** ({}): {}\n",
                record.name,
                record.catalog,
                record.error_detail.as_deref().unwrap_or("No error message")
            ));
        }
        out.push('\n');
    }

    fn write_performance(&self, out: &mut String, report: &RunReport) {
        out.push_str("## Performance\n\n");
        match (&report.fastest, &report.slowest) {
            (Some(fastest), Some(slowest)) => {
                out.push_str(&format!(
                    "- Fastest: `{}` ({}ms)\n",
                    fastest.name,
                    fastest.duration.as_millis()
                ));
                out.push_str(&format!(
                    "- Slowest: `{}` ({}ms)\n",
                    slowest.name,
                    slowest.duration.as_millis()
                ));
                out.push_str(&format!(
                    "- Average: {:.3}s\n",
                    report.average_duration
                ));
            }
            _ => out.push_str("No tests were run.\n"),
        }
    }
}

// ============================================================================
// Report Writer
// ============================================================================

/// Writes run records and reports into an output directory.
pub struct ReportWriter {
    output_dir: PathBuf,

    /// Extra file name that receives a copy of the JSON report.
    artifact_name: Option<String>,
}

impl ReportWriter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            artifact_name: None,
        }
    }

    /// Also writes the JSON report under `name`, e.g. an artifact name.
    pub fn with_artifact_name(mut self, name: impl Into<String>) -> Self {
        self.artifact_name = Some(name.into());
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes the raw records and the report(s) in `format`, stamped now.
    ///
    /// Returns the written paths, records file first.
    pub fn write(
        &self,
        results: &RunResults,
        format: ReportFormat,
    ) -> Result<Vec<PathBuf>, ReporterError> {
        let report = aggregate(&results.records);
        self.write_at(results, &report, format, Utc::now())
    }

    /// Writes records and reports for an already aggregated run.
    ///
    /// Every report carries `generated_at`. The JSON document is serialized
    /// once; the artifact copy, when named, is written only alongside
    /// `report.json` and is byte-identical to it.
    pub fn write_at(
        &self,
        results: &RunResults,
        report: &RunReport,
        format: ReportFormat,
        generated_at: DateTime<Utc>,
    ) -> Result<Vec<PathBuf>, ReporterError> {
        std::fs::create_dir_all(&self.output_dir)?;

        let mut written_files = vec![self.write_records(results)?];

        if matches!(format, ReportFormat::Markdown | ReportFormat::Both) {
            let content = MarkdownReporter::new().render(results, report, generated_at);
            written_files.push(self.write_file(MARKDOWN_REPORT_FILE, &content)?);
        }

        if matches!(format, ReportFormat::Json | ReportFormat::Both) {
            let document = JsonReporter::new().build_report(results, report, generated_at);
            let content = serde_json::to_string_pretty(&document)?;
            written_files.push(self.write_file(JSON_REPORT_FILE, &content)?);

            if let Some(name) = &self.artifact_name {
                written_files.push(self.write_file(name, &content)?);
            }
        }

        info!(dir = %self.output_dir.display(), files = written_files.len(), "Reports written");
        Ok(written_files)
    }

    /// Writes the raw records so they can be re-aggregated later.
    pub fn write_records(&self, results: &RunResults) -> Result<PathBuf, ReporterError> {
        let content = serde_json::to_string_pretty(&results.records)?;
        self.write_file(RESULTS_FILE, &content)
    }

    fn write_file(&self, file_name: &str, content: &str) -> Result<PathBuf, ReporterError> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(file_name);
        std::fs::write(&path, content)?;
        Ok(path)
    }
}
