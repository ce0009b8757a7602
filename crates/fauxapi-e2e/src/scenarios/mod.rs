//! Test scenarios for the fake API client.
//!
//! Each scenario issues exactly one request and then checks that the
//! outcome is well-formed. Whether the simulated call succeeded is a
//! separate question, settled by [`InjectedFailurePolicy`] when the runner
//! turns a [`ScenarioRun`] into a record.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      TestScenario                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  1. request()  → Builds the request from Fixtures               │
//! │  2. run()      → Executes via ApiClient, checks assertions      │
//! │  3. verdict()  → Passed/failed under the injected-failure policy│
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use fauxapi_core::{ClientConfig, FailureRate, FakeApiClient, FixedSequence};
//! use fauxapi_e2e::scenarios::{all_scenarios, InjectedFailurePolicy, TestScenario};
//! use fauxapi_e2e::{Fixtures, TestOutcome};
//!
//! let config = ClientConfig::with_failure_rate(FailureRate::NEVER);
//! let mut client = FakeApiClient::with_source(config, FixedSequence::constant(0.5)).unwrap();
//! let mut fixtures = Fixtures::seeded(7);
//!
//! let scenario = &all_scenarios()[0];
//! let run = scenario.run(&mut client, &mut fixtures).unwrap();
//! assert_eq!(run.verdict(InjectedFailurePolicy::Record).0, TestOutcome::Passed);
//! ```

mod cart;
mod orders;
mod products;
mod search;
mod users;

use crate::fixtures::Fixtures;
use crate::models::{Assertion, TestOutcome};
use fauxapi_core::{ApiClient, ErrorKind, OperationOutcome, OperationRequest, Payload, PayloadShape};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while preparing or running a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Failed to build the request.
    #[error("setup failed: {0}")]
    SetupError(String),

    /// Fixture data could not be turned into a request body.
    #[error("fixture serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Grouping used for documentation and filtering. Carries no behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Catalog {
    User,
    Product,
    Order,
    Search,
    Cart,
}

impl Catalog {
    pub fn all() -> &'static [Catalog] {
        &[
            Catalog::User,
            Catalog::Product,
            Catalog::Order,
            Catalog::Search,
            Catalog::Cart,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Catalog::User => "user",
            Catalog::Product => "product",
            Catalog::Order => "order",
            Catalog::Search => "search",
            Catalog::Cart => "cart",
        }
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Catalog {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Catalog::all()
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown catalog '{}'", s))
    }
}

/// Run-selection tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Smoke,
    Regression,
}

impl Marker {
    pub fn as_str(self) -> &'static str {
        match self {
            Marker::Smoke => "smoke",
            Marker::Regression => "regression",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Marker {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "smoke" => Ok(Marker::Smoke),
            "regression" => Ok(Marker::Regression),
            _ => Err(format!("unknown marker '{}'", s)),
        }
    }
}

/// How a well-formed simulated failure is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InjectedFailurePolicy {
    /// Count it as a failed test carrying the error detail.
    #[default]
    Record,
    /// Count it as passed; only malformed outcomes fail.
    Tolerate,
}

/// A test scenario that can be executed against an [`ApiClient`].
pub trait TestScenario: Send + Sync {
    /// Unique identifier for the scenario (e.g., "create_user").
    fn name(&self) -> &str;

    /// Human-readable description of what the scenario tests.
    fn description(&self) -> &str;

    fn catalog(&self) -> Catalog;

    fn markers(&self) -> &[Marker] {
        &[]
    }

    /// Builds the request this scenario issues.
    fn request(&self, fixtures: &mut Fixtures) -> Result<OperationRequest, ScenarioError>;

    /// Scenario-specific check of a successful payload.
    fn check_payload(&self, _request: &OperationRequest, _payload: &Payload) -> Option<Assertion> {
        None
    }

    /// Issues the request once and validates the outcome.
    fn run(
        &self,
        client: &mut dyn ApiClient,
        fixtures: &mut Fixtures,
    ) -> Result<ScenarioRun, ScenarioError> {
        let request = self.request(fixtures)?;
        let outcome = client.execute(&request);

        let mut assertions = Assertions::well_formed(&request, &outcome);
        if let Some(payload) = outcome.payload()
            && let Some(check) = self.check_payload(&request, payload)
        {
            assertions.push(check);
        }

        Ok(ScenarioRun {
            request,
            outcome,
            assertions,
        })
    }
}

/// Everything one scenario execution produced.
#[derive(Debug, Clone)]
pub struct ScenarioRun {
    pub request: OperationRequest,
    pub outcome: OperationOutcome,
    pub assertions: Vec<Assertion>,
}

impl ScenarioRun {
    /// True when every assertion held.
    pub fn well_formed(&self) -> bool {
        self.assertions.iter().all(|a| a.passed)
    }

    /// Scores the run and returns the error detail for failures.
    ///
    /// A malformed outcome always fails with `assertion failed: …`. A
    /// well-formed simulated failure fails with the outcome's error message
    /// unless the policy tolerates it.
    pub fn verdict(&self, policy: InjectedFailurePolicy) -> (TestOutcome, Option<String>) {
        if let Some(failed) = self.assertions.iter().find(|a| !a.passed) {
            return (
                TestOutcome::Failed,
                Some(format!(
                    "assertion failed: {}: expected {}, got {}",
                    failed.name, failed.expected, failed.actual
                )),
            );
        }

        if self.outcome.succeeded() {
            return (TestOutcome::Passed, None);
        }

        match policy {
            InjectedFailurePolicy::Tolerate => (TestOutcome::Passed, None),
            InjectedFailurePolicy::Record => (TestOutcome::Failed, self.outcome.error_message()),
        }
    }
}

/// Builder for creating assertions with a fluent API.
#[derive(Debug, Clone)]
pub struct AssertionBuilder {
    name: String,
    expected: String,
    actual: String,
    passed: bool,
}

impl AssertionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expected: String::new(),
            actual: String::new(),
            passed: false,
        }
    }

    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = expected.into();
        self
    }

    pub fn actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = actual.into();
        self
    }

    /// Sets whether the assertion held.
    pub fn passed_if(mut self, passed: bool) -> Self {
        self.passed = passed;
        self
    }

    pub fn build(self) -> Assertion {
        Assertion {
            name: self.name,
            passed: self.passed,
            expected: self.expected,
            actual: self.actual,
        }
    }
}

/// Assertion helpers for outcome well-formedness.
pub struct Assertions;

impl Assertions {
    /// The full structural check every scenario runs.
    pub fn well_formed(request: &OperationRequest, outcome: &OperationOutcome) -> Vec<Assertion> {
        vec![
            Self::operation_echoed(request, outcome),
            Self::status_code_valid(request, outcome),
            Self::payload_xor_error(outcome),
            Self::consistent(outcome),
            Self::payload_shape(outcome),
            Self::error_kind_matches_status(outcome),
        ]
    }

    /// The outcome belongs to the request that was issued.
    pub fn operation_echoed(request: &OperationRequest, outcome: &OperationOutcome) -> Assertion {
        AssertionBuilder::new("Operation echoed")
            .expected(request.kind().to_string())
            .actual(outcome.operation().to_string())
            .passed_if(outcome.operation() == request.kind())
            .build()
    }

    /// Status is the verb's success code or one of the ten failure codes.
    pub fn status_code_valid(request: &OperationRequest, outcome: &OperationOutcome) -> Assertion {
        let success = request.verb().success_status();
        let code = outcome.status_code();
        let valid = code == success || ErrorKind::from_status(code).is_some();
        AssertionBuilder::new("Status code valid")
            .expected(format!("{} or a failure code", success))
            .actual(code.to_string())
            .passed_if(valid)
            .build()
    }

    /// Exactly one of payload and error kind is present.
    pub fn payload_xor_error(outcome: &OperationOutcome) -> Assertion {
        let has_payload = outcome.payload().is_some();
        let has_error = outcome.error_kind().is_some();
        AssertionBuilder::new("Payload xor error")
            .expected("exactly one of payload or error kind")
            .actual(match (has_payload, has_error) {
                (true, true) => "both",
                (true, false) => "payload",
                (false, true) => "error kind",
                (false, false) => "neither",
            })
            .passed_if(has_payload != has_error)
            .build()
    }

    /// Success status and success body agree.
    pub fn consistent(outcome: &OperationOutcome) -> Assertion {
        let succeeded = outcome.succeeded();
        let has_error = outcome.error_kind().is_some();
        AssertionBuilder::new("Outcome consistent")
            .expected("2xx status iff no error kind")
            .actual(format!(
                "status {}, error kind {}",
                outcome.status_code(),
                if has_error { "set" } else { "absent" }
            ))
            .passed_if(succeeded != has_error)
            .build()
    }

    /// A success payload has the shape the operation calls for.
    pub fn payload_shape(outcome: &OperationOutcome) -> Assertion {
        let expected = PayloadShape::expected_for(outcome.operation());
        let builder = AssertionBuilder::new("Payload shape").expected(format!("{:?}", expected));
        match outcome.payload() {
            Some(payload) => {
                let actual = payload.shape();
                builder
                    .actual(format!("{:?}", actual))
                    .passed_if(actual == expected)
                    .build()
            }
            None => builder.actual("no payload").passed_if(true).build(),
        }
    }

    /// A failure's status code is the one its error kind maps to.
    pub fn error_kind_matches_status(outcome: &OperationOutcome) -> Assertion {
        let builder = AssertionBuilder::new("Error kind recognized");
        match outcome.error_kind() {
            Some(kind) => builder
                .expected(format!("{} -> {}", kind, kind.status_code()))
                .actual(outcome.status_code().to_string())
                .passed_if(kind.status_code() == outcome.status_code())
                .build(),
            None => builder
                .expected("no error kind on success")
                .actual("none")
                .passed_if(true)
                .build(),
        }
    }

    /// The payload carries the identifier the request named.
    pub fn id_matches(payload: &Payload, expected: u64) -> Assertion {
        let actual = payload.id();
        AssertionBuilder::new("Identifier matches")
            .expected(expected.to_string())
            .actual(actual.map_or_else(|| "none".to_string(), |id| id.to_string()))
            .passed_if(actual == Some(expected))
            .build()
    }

    /// A collection payload is not empty.
    pub fn non_empty(payload: &Payload) -> Assertion {
        let count = payload.item_count().unwrap_or(0);
        AssertionBuilder::new("Collection not empty")
            .expected("at least one item")
            .actual(format!("{} items", count))
            .passed_if(count > 0)
            .build()
    }

    /// A field holds the value the request sent.
    pub fn field_echoed(
        name: &str,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
        passed: bool,
    ) -> Assertion {
        AssertionBuilder::new(format!("Field '{}' echoed", name))
            .expected(expected.to_string())
            .actual(actual.to_string())
            .passed_if(passed)
            .build()
    }
}

/// A scenario described as data: name, catalog, request builder and an
/// optional payload check.
pub struct CatalogScenario {
    name: &'static str,
    description: &'static str,
    catalog: Catalog,
    markers: &'static [Marker],
    request: fn(&mut Fixtures) -> Result<OperationRequest, ScenarioError>,
    check: Option<fn(&OperationRequest, &Payload) -> Assertion>,
}

impl CatalogScenario {
    pub fn new(
        name: &'static str,
        description: &'static str,
        catalog: Catalog,
        request: fn(&mut Fixtures) -> Result<OperationRequest, ScenarioError>,
    ) -> Self {
        Self {
            name,
            description,
            catalog,
            markers: &[],
            request,
            check: None,
        }
    }

    pub fn with_markers(mut self, markers: &'static [Marker]) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_check(mut self, check: fn(&OperationRequest, &Payload) -> Assertion) -> Self {
        self.check = Some(check);
        self
    }
}

impl fmt::Debug for CatalogScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogScenario")
            .field("name", &self.name)
            .field("catalog", &self.catalog)
            .field("markers", &self.markers)
            .finish_non_exhaustive()
    }
}

impl TestScenario for CatalogScenario {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn catalog(&self) -> Catalog {
        self.catalog
    }

    fn markers(&self) -> &[Marker] {
        self.markers
    }

    fn request(&self, fixtures: &mut Fixtures) -> Result<OperationRequest, ScenarioError> {
        (self.request)(fixtures)
    }

    fn check_payload(&self, request: &OperationRequest, payload: &Payload) -> Option<Assertion> {
        self.check.map(|check| check(request, payload))
    }
}

/// The twenty scenarios, in execution order.
pub fn all_scenarios() -> Vec<CatalogScenario> {
    let mut scenarios = Vec::with_capacity(20);
    scenarios.extend(users::scenarios());
    scenarios.extend(products::scenarios());
    scenarios.extend(orders::scenarios());
    scenarios.extend(search::scenarios());
    scenarios.extend(cart::scenarios());
    scenarios
}

/// All scenarios boxed for the runner.
pub fn boxed_scenarios() -> Vec<Box<dyn TestScenario>> {
    all_scenarios()
        .into_iter()
        .map(|s| Box::new(s) as Box<dyn TestScenario>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fauxapi_core::{
        ClientConfig, FailureRate, FakeApiClient, FixedSequence, OperationKind, OutcomeBody,
        Resource, Verb,
    };
    use std::collections::HashSet;
    use std::time::Duration;

    fn client(rate: FailureRate, draws: Vec<f64>) -> FakeApiClient<FixedSequence> {
        FakeApiClient::with_source(
            ClientConfig::with_failure_rate(rate),
            FixedSequence::new(draws),
        )
        .unwrap()
    }

    struct Canned(OperationOutcome);

    impl ApiClient for Canned {
        fn execute(&mut self, _request: &OperationRequest) -> OperationOutcome {
            self.0.clone()
        }
    }

    #[test]
    fn test_twenty_unique_scenarios() {
        let scenarios = all_scenarios();
        assert_eq!(scenarios.len(), 20);
        let names: HashSet<&str> = scenarios.iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), 20);
    }

    #[test]
    fn test_catalog_sizes() {
        let scenarios = all_scenarios();
        for catalog in Catalog::all() {
            let count = scenarios.iter().filter(|s| s.catalog() == *catalog).count();
            assert!(
                (2..=5).contains(&count),
                "{} has {} scenarios",
                catalog,
                count
            );
        }
    }

    #[test]
    fn test_markers() {
        let smoke: Vec<&str> = all_scenarios()
            .iter()
            .filter(|s| s.markers().contains(&Marker::Smoke))
            .map(|s| s.name)
            .collect();
        assert_eq!(
            smoke,
            vec!["get_user_list", "get_product_list", "get_order_list"]
        );
    }

    #[test]
    fn test_all_scenarios_pass_when_client_never_fails() {
        let mut client = client(FailureRate::NEVER, vec![0.5, 0.2, 0.8, 0.35]);
        let mut fixtures = Fixtures::seeded(11);
        for scenario in all_scenarios() {
            let run = scenario.run(&mut client, &mut fixtures).unwrap();
            let (outcome, detail) = run.verdict(InjectedFailurePolicy::Record);
            assert_eq!(
                outcome,
                TestOutcome::Passed,
                "{} failed: {:?}",
                scenario.name(),
                detail
            );
        }
    }

    #[test]
    fn test_injected_failure_is_well_formed() {
        let mut client = client(FailureRate::ALWAYS, vec![0.0, 0.85, 0.5]);
        let mut fixtures = Fixtures::seeded(11);
        for scenario in all_scenarios() {
            let run = scenario.run(&mut client, &mut fixtures).unwrap();
            assert!(run.well_formed(), "{}", scenario.name());

            let (recorded, detail) = run.verdict(InjectedFailurePolicy::Record);
            assert_eq!(recorded, TestOutcome::Failed);
            assert_eq!(
                detail.as_deref(),
                Some("HTTP 429: Rate limit exceeded [RateLimit]")
            );

            let (tolerated, detail) = run.verdict(InjectedFailurePolicy::Tolerate);
            assert_eq!(tolerated, TestOutcome::Passed);
            assert!(detail.is_none());
        }
    }

    #[test]
    fn test_malformed_outcome_fails_under_both_policies() {
        let op = OperationKind::new(Resource::User, Verb::Get);
        let mut canned = Canned(OperationOutcome::from_parts(
            op,
            418,
            OutcomeBody::Success(Payload::Deleted { id: 1 }),
            Duration::ZERO,
        ));
        let scenario = all_scenarios()
            .into_iter()
            .find(|s| s.name() == "get_user_by_id")
            .unwrap();
        let run = scenario
            .run(&mut canned, &mut Fixtures::seeded(1))
            .unwrap();
        assert!(!run.well_formed());

        for policy in [InjectedFailurePolicy::Record, InjectedFailurePolicy::Tolerate] {
            let (outcome, detail) = run.verdict(policy);
            assert_eq!(outcome, TestOutcome::Failed);
            assert!(detail.unwrap().starts_with("assertion failed: "));
        }
    }

    #[test]
    fn test_mismatched_error_status_is_malformed() {
        let outcome = OperationOutcome::from_parts(
            OperationKind::new(Resource::Cart, Verb::List),
            500,
            OutcomeBody::Failure(ErrorKind::RateLimit),
            Duration::ZERO,
        );
        let assertion = Assertions::error_kind_matches_status(&outcome);
        assert!(!assertion.passed);
        assert_eq!(assertion.expected, "RateLimit -> 429");
    }

    #[test]
    fn test_wrong_operation_is_malformed() {
        let request = OperationRequest::list(Resource::User);
        let outcome = OperationOutcome::success(
            OperationKind::new(Resource::Order, Verb::List),
            Payload::Orders(vec![]),
            Duration::ZERO,
        );
        assert!(!Assertions::operation_echoed(&request, &outcome).passed);
    }

    #[test]
    fn test_assertion_builder() {
        let assertion = AssertionBuilder::new("Test assertion")
            .expected("expected value")
            .actual("actual value")
            .passed_if(true)
            .build();

        assert_eq!(assertion.name, "Test assertion");
        assert_eq!(assertion.expected, "expected value");
        assert_eq!(assertion.actual, "actual value");
        assert!(assertion.passed);
    }

    #[test]
    fn test_catalog_and_marker_parse() {
        assert_eq!("Search".parse::<Catalog>(), Ok(Catalog::Search));
        assert!("billing".parse::<Catalog>().is_err());
        assert_eq!("smoke".parse::<Marker>(), Ok(Marker::Smoke));
        assert!("nightly".parse::<Marker>().is_err());
    }
}
