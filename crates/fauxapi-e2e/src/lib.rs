//! # fauxapi-e2e
//!
//! Scenario runner and report aggregator for the fauxapi client.
//!
//! Twenty CRUD-shaped scenarios drive a failure-injecting client, every
//! execution becomes a [`TestRecord`], and the records are aggregated into
//! pass/fail statistics, an error-type histogram and timing metrics.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  TestRunner │────▶│  Scenarios  │────▶│  ApiClient  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │
//!        ▼
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Collector  │────▶│ Aggregator  │────▶│  Reporters  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - `scenarios`: The scenario catalog (TestScenario trait)
//! - `runner`: Drives scenarios and collects records
//! - `aggregator`: Pure aggregation into a RunReport
//! - `reporter`: Terminal, JSON and markdown output
//! - `artifact`: Timestamped artifact names

pub use crate::aggregator::{ASSERTION_FAILED, RunReport, UNKNOWN, aggregate, error_kind, error_type};
pub use crate::artifact::{LOCAL_RUN_ID, RUN_ID_ENV, artifact_name, resolve_run_id};
pub use crate::collector::ResultCollector;
pub use crate::fixtures::{Fixtures, to_body};
pub use crate::models::{Assertion, ReportFormat, TestOutcome, TestRecord, load_records, sum_durations};
pub use crate::reporter::{
    FailureAnalysis, JSON_REPORT_FILE, JsonReporter, MARKDOWN_REPORT_FILE, MarkdownReporter,
    PerformanceMetrics, RESULTS_FILE, ReportDocument, ReportMetadata, ReportSummary, ReportWriter,
    ReporterError, ResultEntry, TerminalReporter, TestResults, TestTiming, Verbosity,
    create_progress_callback,
};
pub use crate::runner::{
    ProgressCallback, ProgressEvent, RunConfig, RunResults, RunnerError, TestRunner,
};
pub use crate::scenarios::{
    AssertionBuilder, Assertions, Catalog, CatalogScenario, InjectedFailurePolicy, Marker,
    ScenarioError, ScenarioRun, TestScenario, all_scenarios, boxed_scenarios,
};

pub mod aggregator;
pub mod artifact;
mod collector;
mod fixtures;
mod models;
pub mod reporter;
pub mod runner;
pub mod scenarios;

/// Library version, matching the crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
