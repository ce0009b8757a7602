//! # fauxapi-core
//!
//! A fake backend API client that injects HTTP-style failures at a
//! configurable rate.
//!
//! Each call draws from an injected [`RandomSource`]: below the failure rate
//! it returns one of ten categorized errors with its status code, otherwise
//! a typed payload for the resource. Failures are data, not `Err`s.
//!
//! ```
//! use fauxapi_core::{ClientConfig, FailureRate, FakeApiClient, FixedSequence, Resource};
//!
//! let config = ClientConfig::with_failure_rate(FailureRate::ALWAYS);
//! let mut client = FakeApiClient::with_source(config, FixedSequence::new(vec![0.0, 0.85])).unwrap();
//!
//! let outcome = client.get(Resource::User, 42);
//! assert_eq!(outcome.status_code(), 429);
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod operation;
pub mod outcome;
pub mod payload;
pub mod random;

pub use client::{ApiClient, FakeApiClient};
pub use config::{ClientConfig, ENV_FAILURE_RATE, ENV_SEED, FailureRate};
pub use error::ConfigError;
pub use operation::{OperationKind, OperationRequest, ParseOperationError, Resource, Verb, body};
pub use outcome::{ErrorKind, OperationOutcome, OutcomeBody};
pub use payload::{
    Cart, CartItem, Order, OrderLine, OrderStatus, Payload, PayloadShape, Product, User,
};
pub use random::{FixedSequence, RandomSource, RngSource};
