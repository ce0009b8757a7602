//! Call outcomes and the simulated error taxonomy.

use crate::operation::OperationKind;
use crate::payload::Payload;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The ten simulated failure modes.
///
/// Serializes as its label (`"RateLimit"`), which is also the key used in
/// report histograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorKind {
    Timeout,
    InternalServerError,
    BadGateway,
    ServiceUnavailable,
    Unauthorized,
    Forbidden,
    NotFound,
    ValidationError,
    RateLimit,
    Conflict,
}

impl ErrorKind {
    /// Every kind, in draw order.
    pub const ALL: [ErrorKind; 10] = [
        ErrorKind::Timeout,
        ErrorKind::InternalServerError,
        ErrorKind::BadGateway,
        ErrorKind::ServiceUnavailable,
        ErrorKind::Unauthorized,
        ErrorKind::Forbidden,
        ErrorKind::NotFound,
        ErrorKind::ValidationError,
        ErrorKind::RateLimit,
        ErrorKind::Conflict,
    ];

    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::Timeout => 408,
            ErrorKind::InternalServerError => 500,
            ErrorKind::BadGateway => 502,
            ErrorKind::ServiceUnavailable => 503,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::ValidationError => 422,
            ErrorKind::RateLimit => 429,
            ErrorKind::Conflict => 409,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Timeout => "Timeout",
            ErrorKind::InternalServerError => "InternalServerError",
            ErrorKind::BadGateway => "BadGateway",
            ErrorKind::ServiceUnavailable => "ServiceUnavailable",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::RateLimit => "RateLimit",
            ErrorKind::Conflict => "Conflict",
        }
    }

    /// Human-readable reason phrase.
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::Timeout => "Request timeout",
            ErrorKind::InternalServerError => "Internal server error",
            ErrorKind::BadGateway => "Bad gateway",
            ErrorKind::ServiceUnavailable => "Service unavailable",
            ErrorKind::Unauthorized => "Unauthorized access",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Resource not found",
            ErrorKind::ValidationError => "Validation failed",
            ErrorKind::RateLimit => "Rate limit exceeded",
            ErrorKind::Conflict => "Resource conflict",
        }
    }

    pub fn from_status(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.status_code() == code)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.label() == label)
    }

    /// Every failure status code.
    pub fn status_codes() -> impl Iterator<Item = u16> {
        Self::ALL.into_iter().map(ErrorKind::status_code)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a call produced: a typed payload or a categorized failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeBody {
    Success(Payload),
    Failure(ErrorKind),
}

/// Result of one client call.
///
/// Built through [`OperationOutcome::success`] or [`OperationOutcome::failure`],
/// which tie the status code to the body. `from_parts` bypasses that and is
/// meant for replaying recorded outcomes and testing validators.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationOutcome {
    operation: OperationKind,
    status_code: u16,
    body: OutcomeBody,
    latency: Duration,
}

impl OperationOutcome {
    pub fn success(operation: OperationKind, payload: Payload, latency: Duration) -> Self {
        Self {
            operation,
            status_code: operation.verb.success_status(),
            body: OutcomeBody::Success(payload),
            latency,
        }
    }

    pub fn failure(operation: OperationKind, kind: ErrorKind, latency: Duration) -> Self {
        Self {
            operation,
            status_code: kind.status_code(),
            body: OutcomeBody::Failure(kind),
            latency,
        }
    }

    pub fn from_parts(
        operation: OperationKind,
        status_code: u16,
        body: OutcomeBody,
        latency: Duration,
    ) -> Self {
        Self {
            operation,
            status_code,
            body,
            latency,
        }
    }

    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn body(&self) -> &OutcomeBody {
        &self.body
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// True iff the body is a success and the status is in the 2xx range.
    pub fn succeeded(&self) -> bool {
        matches!(self.body, OutcomeBody::Success(_)) && (200..300).contains(&self.status_code)
    }

    pub fn payload(&self) -> Option<&Payload> {
        match &self.body {
            OutcomeBody::Success(payload) => Some(payload),
            OutcomeBody::Failure(_) => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self.body {
            OutcomeBody::Failure(kind) => Some(kind),
            OutcomeBody::Success(_) => None,
        }
    }

    /// Renders a failure as `HTTP 429: Rate limit exceeded [RateLimit]`.
    pub fn error_message(&self) -> Option<String> {
        self.error_kind().map(|kind| {
            format!(
                "HTTP {}: {} [{}]",
                self.status_code,
                kind.message(),
                kind.label()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{Resource, Verb};
    use std::collections::HashSet;

    fn op(verb: Verb) -> OperationKind {
        OperationKind::new(Resource::User, verb)
    }

    #[test]
    fn test_status_codes_are_distinct() {
        let codes: HashSet<u16> = ErrorKind::status_codes().collect();
        assert_eq!(codes.len(), 10);
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(ErrorKind::Timeout.status_code(), 408);
        assert_eq!(ErrorKind::InternalServerError.status_code(), 500);
        assert_eq!(ErrorKind::BadGateway.status_code(), 502);
        assert_eq!(ErrorKind::ServiceUnavailable.status_code(), 503);
        assert_eq!(ErrorKind::Unauthorized.status_code(), 401);
        assert_eq!(ErrorKind::Forbidden.status_code(), 403);
        assert_eq!(ErrorKind::NotFound.status_code(), 404);
        assert_eq!(ErrorKind::ValidationError.status_code(), 422);
        assert_eq!(ErrorKind::RateLimit.status_code(), 429);
        assert_eq!(ErrorKind::Conflict.status_code(), 409);
    }

    #[test]
    fn test_lookup_by_status_and_label() {
        for kind in ErrorKind::ALL {
            assert_eq!(ErrorKind::from_status(kind.status_code()), Some(kind));
            assert_eq!(ErrorKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(ErrorKind::from_status(200), None);
        assert_eq!(ErrorKind::from_label("Teapot"), None);
    }

    #[test]
    fn test_label_matches_serde_name() {
        for kind in ErrorKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.label()));
        }
    }

    #[test]
    fn test_success_outcome() {
        let outcome = OperationOutcome::success(
            op(Verb::Create),
            Payload::Deleted { id: 1 },
            Duration::from_millis(20),
        );
        assert!(outcome.succeeded());
        assert_eq!(outcome.status_code(), 201);
        assert!(outcome.payload().is_some());
        assert!(outcome.error_kind().is_none());
        assert!(outcome.error_message().is_none());
    }

    #[test]
    fn test_failure_outcome() {
        let outcome = OperationOutcome::failure(
            op(Verb::Get),
            ErrorKind::RateLimit,
            Duration::from_millis(20),
        );
        assert!(!outcome.succeeded());
        assert_eq!(outcome.status_code(), 429);
        assert!(outcome.payload().is_none());
        assert_eq!(outcome.error_kind(), Some(ErrorKind::RateLimit));
        assert_eq!(
            outcome.error_message().as_deref(),
            Some("HTTP 429: Rate limit exceeded [RateLimit]")
        );
    }

    #[test]
    fn test_success_body_with_error_status_is_not_success() {
        let outcome = OperationOutcome::from_parts(
            op(Verb::Get),
            500,
            OutcomeBody::Success(Payload::Deleted { id: 1 }),
            Duration::ZERO,
        );
        assert!(!outcome.succeeded());
    }
}
