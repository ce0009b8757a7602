//! The failure-injecting fake API client.
//!
//! Every call is independent: draw `r`, fail when `r < failure_rate`,
//! otherwise synthesize a payload. Failures come back as data inside an
//! [`OperationOutcome`], never as an `Err`.

use crate::config::{ClientConfig, FailureRate};
use crate::error::Result;
use crate::operation::{OperationRequest, Resource};
use crate::outcome::{ErrorKind, OperationOutcome};
use crate::payload;
use crate::random::{DrawExt, RandomSource, RngSource};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

/// Anything that turns a request into an outcome.
///
/// Scenarios drive this trait rather than a concrete client, which keeps
/// them object-safe and lets tests substitute canned outcomes.
pub trait ApiClient {
    fn execute(&mut self, request: &OperationRequest) -> OperationOutcome;

    /// Configuration the client was built with, when it has one.
    fn config(&self) -> Option<&ClientConfig> {
        None
    }
}

impl<S: RandomSource> ApiClient for FakeApiClient<S> {
    fn execute(&mut self, request: &OperationRequest) -> OperationOutcome {
        FakeApiClient::execute(self, request)
    }

    fn config(&self) -> Option<&ClientConfig> {
        Some(&self.config)
    }
}

/// Simulated backend client.
///
/// Generic over its [`RandomSource`] so tests can script every draw.
#[derive(Debug)]
pub struct FakeApiClient<S = RngSource> {
    config: ClientConfig,
    source: S,
    request_count: u64,
}

impl FakeApiClient<RngSource> {
    /// Builds a client seeded from `config.seed`, or from entropy when unset.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let source = RngSource::from_seed_option(config.seed);
        Self::with_source(config, source)
    }

    /// Builds a default client with a raw failure rate, rejecting values
    /// outside `[0.0, 1.0]`.
    pub fn with_failure_rate(rate: f64) -> Result<Self> {
        Self::new(ClientConfig::with_failure_rate(FailureRate::new(rate)?))
    }
}

impl<S: RandomSource> FakeApiClient<S> {
    /// Builds a client drawing from `source`.
    pub fn with_source(config: ClientConfig, source: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            source,
            request_count: 0,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn failure_rate(&self) -> FailureRate {
        self.config.failure_rate
    }

    /// Number of calls made so far. Diagnostic only.
    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    /// Consumes the client, returning its random source.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Performs one simulated call.
    pub fn execute(&mut self, request: &OperationRequest) -> OperationOutcome {
        self.request_count += 1;
        let kind = request.kind();

        let r = self.source.unit();
        let outcome = if r < self.config.failure_rate.get() {
            let error = *self.source.pick(&ErrorKind::ALL);
            let latency = self.draw_latency();
            OperationOutcome::failure(kind, error, latency)
        } else {
            let latency = self.draw_latency();
            let payload = payload::synthesize(request, &mut self.source);
            OperationOutcome::success(kind, payload, latency)
        };

        debug!(
            operation = %kind,
            endpoint = %request.endpoint(),
            status = outcome.status_code(),
            latency_ms = outcome.latency().as_millis() as u64,
            "Simulated call {}",
            if outcome.succeeded() { "succeeded" } else { "failed" }
        );

        outcome
    }

    /// Lists a resource, optionally filtered (`q` for products, `user_id`
    /// for orders).
    pub fn list(&mut self, resource: Resource, filter: Option<Map<String, Value>>) -> OperationOutcome {
        let mut request = OperationRequest::list(resource);
        if let Some(filter) = filter {
            request = request.with_body(filter);
        }
        self.execute(&request)
    }

    pub fn get(&mut self, resource: Resource, id: u64) -> OperationOutcome {
        self.execute(&OperationRequest::get(resource, id))
    }

    pub fn create(&mut self, resource: Resource, body: Map<String, Value>) -> OperationOutcome {
        self.execute(&OperationRequest::create(resource, body))
    }

    pub fn update(
        &mut self,
        resource: Resource,
        id: u64,
        body: Map<String, Value>,
    ) -> OperationOutcome {
        self.execute(&OperationRequest::update(resource, id, body))
    }

    pub fn patch(
        &mut self,
        resource: Resource,
        id: u64,
        body: Map<String, Value>,
    ) -> OperationOutcome {
        self.execute(&OperationRequest::patch(resource, id, body))
    }

    pub fn delete(&mut self, resource: Resource, id: u64) -> OperationOutcome {
        self.execute(&OperationRequest::delete(resource, id))
    }

    fn draw_latency(&mut self) -> Duration {
        let (min, max) = self.config.latency_range();
        min + (max - min).mul_f64(self.source.unit())
    }
}
