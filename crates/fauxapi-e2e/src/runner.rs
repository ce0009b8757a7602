//! Test runner for scenario execution.
//!
//! The TestRunner drives the selected scenarios one at a time against a
//! single client, turns each run into a [`TestRecord`] and collects them
//! for aggregation.
//!
//! # Example
//!
//! ```
//! use fauxapi_core::{ClientConfig, FailureRate, FakeApiClient};
//! use fauxapi_e2e::{RunConfig, TestRunner, boxed_scenarios};
//!
//! let mut client = FakeApiClient::new(ClientConfig {
//!     failure_rate: FailureRate::NEVER,
//!     seed: Some(42),
//!     ..ClientConfig::default()
//! })
//! .unwrap();
//!
//! let runner = TestRunner::new(boxed_scenarios());
//! let results = runner.run(&mut client, &RunConfig::new()).unwrap();
//!
//! assert_eq!(results.passed_count(), 20);
//! ```

use crate::collector::ResultCollector;
use crate::fixtures::Fixtures;
use crate::models::{TestOutcome, TestRecord, sum_durations};
use crate::scenarios::{Catalog, InjectedFailurePolicy, Marker, TestScenario};
use fauxapi_core::ApiClient;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during a test run.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// No scenarios matched the selection.
    #[error("no scenarios matched filter: {0}")]
    NoMatchingScenarios(String),
}

/// Configuration for a test run.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Filter scenarios by pattern (matches name, description or catalog).
    pub filter: Option<String>,

    /// Only run scenarios in this catalog.
    pub catalog: Option<Catalog>,

    /// Only run scenarios carrying this marker.
    pub marker: Option<Marker>,

    /// How well-formed simulated failures are scored.
    pub policy: InjectedFailurePolicy,
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn with_policy(mut self, policy: InjectedFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    fn has_selection(&self) -> bool {
        self.filter.is_some() || self.catalog.is_some() || self.marker.is_some()
    }

    fn describe_selection(&self) -> String {
        let mut parts = Vec::new();
        if let Some(filter) = &self.filter {
            parts.push(format!("'{}'", filter));
        }
        if let Some(catalog) = self.catalog {
            parts.push(format!("catalog={}", catalog));
        }
        if let Some(marker) = self.marker {
            parts.push(format!("marker={}", marker));
        }
        parts.join(", ")
    }
}

/// Records from one run plus the settings it ran with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunResults {
    /// Records in execution order.
    pub records: Vec<TestRecord>,

    /// Simulated duration of the run (sum of record durations).
    pub duration: Duration,

    /// Failure rate of the client, when known.
    pub failure_rate: Option<f64>,

    /// Seed of the client, when one was set.
    pub seed: Option<u64>,
}

impl RunResults {
    /// Wraps records loaded from elsewhere.
    pub fn from_records(records: Vec<TestRecord>) -> Self {
        let duration = sum_durations(&records);
        Self {
            records,
            duration,
            failure_rate: None,
            seed: None,
        }
    }

    pub fn passed_count(&self) -> usize {
        self.records.iter().filter(|r| r.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.records.iter().filter(|r| !r.passed()).count()
    }

    pub fn total_count(&self) -> usize {
        self.records.len()
    }

    pub fn all_passed(&self) -> bool {
        self.records.iter().all(TestRecord::passed)
    }

    /// Returns records grouped by catalog, sorted by catalog name.
    pub fn by_catalog(&self) -> Vec<(&str, Vec<&TestRecord>)> {
        let mut catalogs: BTreeMap<&str, Vec<&TestRecord>> = BTreeMap::new();
        for record in &self.records {
            catalogs.entry(&record.catalog).or_default().push(record);
        }
        catalogs.into_iter().collect()
    }

    pub fn failures(&self) -> Vec<&TestRecord> {
        self.records.iter().filter(|r| !r.passed()).collect()
    }
}

/// Progress callback for test execution updates.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Events emitted during test execution.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A test run has started.
    RunStarted { total_scenarios: usize },

    /// A scenario is about to execute.
    ScenarioStarted { name: String, catalog: Catalog },

    /// A scenario has completed.
    ScenarioCompleted {
        name: String,
        passed: bool,
        duration: Duration,
        record: TestRecord,
    },

    /// The test run has completed.
    RunCompleted { results: RunResults },
}

/// Runs scenarios against an [`ApiClient`] and collects their records.
pub struct TestRunner {
    scenarios: Vec<Box<dyn TestScenario>>,
    on_progress: Option<ProgressCallback>,
}

impl TestRunner {
    pub fn new(scenarios: Vec<Box<dyn TestScenario>>) -> Self {
        Self {
            scenarios,
            on_progress: None,
        }
    }

    /// Sets a callback for progress updates.
    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub fn scenario_count(&self) -> usize {
        self.scenarios.len()
    }

    /// Returns scenarios matching the given config.
    pub fn matching_scenarios(&self, config: &RunConfig) -> Vec<&dyn TestScenario> {
        self.scenarios
            .iter()
            .filter(|s| matches_config(s.as_ref(), config))
            .map(|s| s.as_ref())
            .collect()
    }

    /// Runs every scenario matching `config`, in registration order.
    ///
    /// Fixture data is seeded from the client's seed, so a seeded client
    /// makes the whole run reproducible.
    pub fn run(
        &self,
        client: &mut dyn ApiClient,
        config: &RunConfig,
    ) -> Result<RunResults, RunnerError> {
        let matching = self.matching_scenarios(config);
        if matching.is_empty() && config.has_selection() {
            return Err(RunnerError::NoMatchingScenarios(config.describe_selection()));
        }

        let failure_rate = client.config().map(|c| c.failure_rate.get());
        let seed = client.config().and_then(|c| c.seed);
        let mut fixtures = Fixtures::from_seed_option(seed);

        info!(
            scenarios = matching.len(),
            failure_rate = ?failure_rate,
            seed = ?seed,
            "Starting test run"
        );
        self.emit_progress(ProgressEvent::RunStarted {
            total_scenarios: matching.len(),
        });

        let mut collector = ResultCollector::with_capacity(matching.len());
        for scenario in matching {
            self.emit_progress(ProgressEvent::ScenarioStarted {
                name: scenario.name().to_string(),
                catalog: scenario.catalog(),
            });

            let record = execute(scenario, client, &mut fixtures, config.policy);
            debug!(
                scenario = %record.name,
                outcome = %record.outcome,
                status = ?record.status_code,
                "Scenario completed"
            );

            self.emit_progress(ProgressEvent::ScenarioCompleted {
                name: record.name.clone(),
                passed: record.passed(),
                duration: record.duration,
                record: record.clone(),
            });
            collector.push(record);
        }

        let results = RunResults {
            duration: collector.total_duration(),
            records: collector.into_records(),
            failure_rate,
            seed,
        };

        info!(
            passed = results.passed_count(),
            failed = results.failed_count(),
            "Test run finished"
        );
        self.emit_progress(ProgressEvent::RunCompleted {
            results: results.clone(),
        });

        Ok(results)
    }

    /// Runs all registered scenarios with default configuration.
    pub fn run_all(&self, client: &mut dyn ApiClient) -> Result<RunResults, RunnerError> {
        self.run(client, &RunConfig::default())
    }

    fn emit_progress(&self, event: ProgressEvent) {
        if let Some(callback) = &self.on_progress {
            callback(event);
        }
    }
}

/// Runs one scenario and scores it. Setup errors become failed records.
fn execute(
    scenario: &dyn TestScenario,
    client: &mut dyn ApiClient,
    fixtures: &mut Fixtures,
    policy: InjectedFailurePolicy,
) -> TestRecord {
    let name = scenario.name().to_string();
    let catalog = scenario.catalog().to_string();

    match scenario.run(client, fixtures) {
        Ok(run) => {
            let (outcome, error_detail) = run.verdict(policy);
            TestRecord {
                name,
                catalog,
                outcome,
                duration: run.outcome.latency(),
                error_detail,
                status_code: Some(run.outcome.status_code()),
            }
        }
        Err(e) => TestRecord {
            name,
            catalog,
            outcome: TestOutcome::Failed,
            duration: Duration::ZERO,
            error_detail: Some(e.to_string()),
            status_code: None,
        },
    }
}

fn matches_config(scenario: &dyn TestScenario, config: &RunConfig) -> bool {
    if let Some(catalog) = config.catalog
        && scenario.catalog() != catalog
    {
        return false;
    }

    if let Some(marker) = config.marker
        && !scenario.markers().contains(&marker)
    {
        return false;
    }

    if let Some(filter) = &config.filter {
        let filter_lower = filter.to_lowercase();
        let name_matches = scenario.name().to_lowercase().contains(&filter_lower);
        let desc_matches = scenario
            .description()
            .to_lowercase()
            .contains(&filter_lower);
        let catalog_matches = scenario.catalog().as_str().contains(&filter_lower);

        if !name_matches && !desc_matches && !catalog_matches {
            return false;
        }
    }

    true
}
