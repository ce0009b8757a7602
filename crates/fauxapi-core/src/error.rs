use thiserror::Error;

/// Errors raised while building a client configuration.
///
/// These are fatal: a client is never constructed from an invalid
/// configuration, so no simulated call can observe one.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failure rate must be within [0.0, 1.0], got {0}")]
    FailureRateOutOfRange(f64),

    #[error("latency range is inverted: min {min_ms}ms > max {max_ms}ms")]
    InvertedLatency { min_ms: u64, max_ms: u64 },

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
