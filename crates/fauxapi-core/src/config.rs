//! Client configuration.
//!
//! Configuration is layered, lowest precedence first: built-in defaults,
//! an optional YAML file, then `FAUXAPI_*` environment variables. Callers
//! (the CLI) apply their own overrides last and call [`ClientConfig::validate`]
//! before constructing a client.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding the failure rate.
pub const ENV_FAILURE_RATE: &str = "FAUXAPI_FAILURE_RATE";

/// Environment variable pinning the random seed.
pub const ENV_SEED: &str = "FAUXAPI_SEED";

/// Probability that a simulated call fails, validated to `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct FailureRate(f64);

impl FailureRate {
    /// The default rate: 30% of calls fail.
    pub const DEFAULT: FailureRate = FailureRate(0.3);

    /// Never fail.
    pub const NEVER: FailureRate = FailureRate(0.0);

    /// Always fail.
    pub const ALWAYS: FailureRate = FailureRate(1.0);

    /// Validates and wraps a rate. NaN and values outside the closed unit
    /// interval are rejected.
    pub fn new(rate: f64) -> Result<Self> {
        if (0.0..=1.0).contains(&rate) {
            Ok(Self(rate))
        } else {
            Err(ConfigError::FailureRateOutOfRange(rate))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for FailureRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for FailureRate {
    type Error = ConfigError;

    fn try_from(rate: f64) -> Result<Self> {
        Self::new(rate)
    }
}

impl From<FailureRate> for f64 {
    fn from(rate: FailureRate) -> Self {
        rate.0
    }
}

impl fmt::Display for FailureRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.0 * 100.0)
    }
}

/// Settings fixed at client construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Probability that any single call fails.
    pub failure_rate: FailureRate,

    /// Lower bound of the simulated latency, in milliseconds.
    pub latency_min_ms: u64,

    /// Upper bound of the simulated latency, in milliseconds.
    pub latency_max_ms: u64,

    /// Seed for the random source. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            failure_rate: FailureRate::DEFAULT,
            latency_min_ms: 10,
            latency_max_ms: 100,
            seed: None,
        }
    }
}

impl ClientConfig {
    /// Creates a default configuration with the given failure rate.
    pub fn with_failure_rate(failure_rate: FailureRate) -> Self {
        Self {
            failure_rate,
            ..Self::default()
        }
    }

    /// Loads a configuration from a YAML file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `FAUXAPI_*` overrides from the process environment.
    pub fn with_env(self) -> Result<Self> {
        self.with_env_from(|var| std::env::var(var).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = lookup(ENV_FAILURE_RATE) {
            let rate = value
                .trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidEnv {
                    var: ENV_FAILURE_RATE,
                    value: value.clone(),
                })?;
            self.failure_rate = FailureRate::new(rate)?;
        }

        if let Some(value) = lookup(ENV_SEED) {
            let seed = value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidEnv {
                    var: ENV_SEED,
                    value: value.clone(),
                })?;
            self.seed = Some(seed);
        }

        Ok(self)
    }

    /// Checks cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.latency_min_ms > self.latency_max_ms {
            return Err(ConfigError::InvertedLatency {
                min_ms: self.latency_min_ms,
                max_ms: self.latency_max_ms,
            });
        }
        Ok(())
    }

    /// Returns the simulated latency bounds.
    pub fn latency_range(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.latency_min_ms),
            Duration::from_millis(self.latency_max_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_failure_rate_accepts_closed_range() {
        assert_eq!(FailureRate::new(0.0).unwrap().get(), 0.0);
        assert_eq!(FailureRate::new(1.0).unwrap().get(), 1.0);
        assert_eq!(FailureRate::new(0.3).unwrap(), FailureRate::DEFAULT);
    }

    #[test]
    fn test_failure_rate_rejects_out_of_range() {
        assert!(matches!(
            FailureRate::new(1.01),
            Err(ConfigError::FailureRateOutOfRange(_))
        ));
        assert!(FailureRate::new(-0.1).is_err());
        assert!(FailureRate::new(f64::NAN).is_err());
        assert!(FailureRate::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_failure_rate_display() {
        assert_eq!(FailureRate::DEFAULT.to_string(), "30%");
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.failure_rate, FailureRate::DEFAULT);
        assert_eq!(
            config.latency_range(),
            (Duration::from_millis(10), Duration::from_millis(100))
        );
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_latency() {
        let config = ClientConfig {
            latency_min_ms: 50,
            latency_max_ms: 5,
            ..ClientConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedLatency {
                min_ms: 50,
                max_ms: 5
            })
        ));
    }

    #[test]
    fn test_from_file_partial_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fauxapi.yml");
        std::fs::write(&path, "failure_rate: 0.5\nseed: 7\n").unwrap();

        let config = ClientConfig::from_file(&path).unwrap();
        assert_eq!(config.failure_rate.get(), 0.5);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.latency_max_ms, 100);
    }

    #[test]
    fn test_from_file_rejects_bad_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fauxapi.yml");
        std::fs::write(&path, "failure_rate: 1.5\n").unwrap();

        assert!(matches!(
            ClientConfig::from_file(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file_rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fauxapi.yml");
        std::fs::write(&path, "failure_rat: 0.5\n").unwrap();

        assert!(ClientConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_from_file_missing() {
        let result = ClientConfig::from_file("/nonexistent/fauxapi.yml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> =
            HashMap::from([(ENV_FAILURE_RATE, "0.75"), (ENV_SEED, " 42 ")]);
        let config = ClientConfig::default()
            .with_env_from(|var| vars.get(var).map(|v| (*v).to_string()))
            .unwrap();

        assert_eq!(config.failure_rate.get(), 0.75);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_env_invalid_values() {
        let result = ClientConfig::default().with_env_from(|var| {
            (var == ENV_FAILURE_RATE).then(|| "lots".to_string())
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnv {
                var: ENV_FAILURE_RATE,
                ..
            })
        ));

        let result = ClientConfig::default()
            .with_env_from(|var| (var == ENV_FAILURE_RATE).then(|| "2.0".to_string()));
        assert!(matches!(
            result,
            Err(ConfigError::FailureRateOutOfRange(_))
        ));
    }

    #[test]
    fn test_env_absent_keeps_values() {
        let config = ClientConfig::with_failure_rate(FailureRate::ALWAYS)
            .with_env_from(|_| None)
            .unwrap();
        assert_eq!(config.failure_rate, FailureRate::ALWAYS);
    }
}
