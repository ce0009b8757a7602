//! Data models for the test harness.
//!
//! This module defines the per-scenario record the runner collects, the
//! assertions scenarios check, and report formats.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Markdown format (human-readable)
    Markdown,
    /// JSON format (machine-readable)
    #[default]
    Json,
    /// Both markdown and JSON
    Both,
}

/// Pass/fail verdict of one scenario execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestOutcome {
    Passed,
    Failed,
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestOutcome::Passed => write!(f, "passed"),
            TestOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// Result of a single scenario execution. Immutable once collected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    /// Scenario name, unique within a run
    pub name: String,
    /// Catalog the scenario belongs to (e.g., "user")
    #[serde(default)]
    pub catalog: String,
    /// Verdict
    pub outcome: TestOutcome,
    /// How long the scenario took
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Why the scenario failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    /// Status code of the simulated call, when one was made
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl TestRecord {
    pub fn passed(&self) -> bool {
        self.outcome == TestOutcome::Passed
    }

    /// Salvages what it can from a JSON value that failed strict parsing.
    ///
    /// The result is always a failed record without error detail, so it is
    /// counted in the `Unknown` bucket.
    fn recover(index: usize, value: &Value) -> Self {
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .map_or_else(|| format!("record-{}", index), str::to_string);
        let duration = value
            .get("duration")
            .and_then(Value::as_f64)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or_default();
        let catalog = value
            .get("catalog")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Self {
            name,
            catalog,
            outcome: TestOutcome::Failed,
            duration,
            error_detail: None,
            status_code: None,
        }
    }
}

/// Sums record durations, saturating at [`Duration::MAX`].
///
/// Saved records may carry arbitrarily large durations, so a plain
/// `Iterator::sum` could overflow and panic.
pub fn sum_durations<'a>(records: impl IntoIterator<Item = &'a TestRecord>) -> Duration {
    records
        .into_iter()
        .try_fold(Duration::ZERO, |acc, r| acc.checked_add(r.duration))
        .unwrap_or(Duration::MAX)
}

/// Parses saved records, tolerating malformed entries.
///
/// Accepts either a bare array or an object with a `records` array. Entries
/// that do not parse are recovered as failed records of unknown cause rather
/// than failing the whole load.
pub fn load_records(json: &str) -> Result<Vec<TestRecord>, serde_json::Error> {
    let value: Value = serde_json::from_str(json)?;
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("records") {
            Some(Value::Array(entries)) => entries,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    Ok(entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value::<TestRecord>(entry.clone()).unwrap_or_else(|e| {
                warn!(index, error = %e, "Recovering malformed test record");
                TestRecord::recover(index, entry)
            })
        })
        .collect())
}

/// A single assertion within a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assertion {
    /// Name of the assertion
    pub name: String,
    /// Whether the assertion passed
    pub passed: bool,
    /// Expected value/condition
    pub expected: String,
    /// Actual value/condition observed
    pub actual: String,
}

/// Serde helper for Duration serialization as fractional seconds.
pub(crate) mod duration_serde {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, outcome: TestOutcome) -> TestRecord {
        TestRecord {
            name: name.to_string(),
            catalog: "user".to_string(),
            outcome,
            duration: Duration::from_millis(250),
            error_detail: None,
            status_code: Some(200),
        }
    }

    #[test]
    fn test_record_serialization_shape() {
        let value = serde_json::to_value(record("get_user_list", TestOutcome::Passed)).unwrap();
        assert_eq!(value["outcome"], "passed");
        assert_eq!(value["duration"], 0.25);
        assert!(value.get("error_detail").is_none());
    }

    #[test]
    fn test_load_records_array() {
        let json = serde_json::to_string(&vec![
            record("a", TestOutcome::Passed),
            record("b", TestOutcome::Failed),
        ])
        .unwrap();
        let records = load_records(&json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].outcome, TestOutcome::Failed);
    }

    #[test]
    fn test_load_records_wrapped_object() {
        let json = r#"{"records": [{"name": "x", "outcome": "passed", "duration": 0.1}]}"#;
        let records = load_records(json).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].passed());
        assert_eq!(records[0].catalog, "");
    }

    #[test]
    fn test_load_records_recovers_malformed_entries() {
        let json = r#"[
            {"name": "ok", "outcome": "passed", "duration": 0.5},
            {"name": "no-outcome", "duration": 0.2},
            {"outcome": "maybe"},
            {"name": "negative", "outcome": "passed", "duration": -1.0},
            42
        ]"#;
        let records = load_records(json).unwrap();
        assert_eq!(records.len(), 5);
        assert!(records[0].passed());

        assert_eq!(records[1].name, "no-outcome");
        assert_eq!(records[1].outcome, TestOutcome::Failed);
        assert_eq!(records[1].duration, Duration::from_millis(200));
        assert!(records[1].error_detail.is_none());

        assert_eq!(records[2].name, "record-2");
        assert_eq!(records[3].duration, Duration::ZERO);
        assert_eq!(records[3].outcome, TestOutcome::Failed);
        assert_eq!(records[4].name, "record-4");
    }

    #[test]
    fn test_load_records_rejects_invalid_json() {
        assert!(load_records("not json").is_err());
    }

    #[test]
    fn test_load_records_non_collection_is_empty() {
        assert!(load_records("\"hello\"").unwrap().is_empty());
    }

    #[test]
    fn test_sum_durations_saturates() {
        let mut big = record("big", TestOutcome::Passed);
        big.duration = Duration::MAX;
        let small = record("small", TestOutcome::Passed);

        assert_eq!(sum_durations(&[small.clone(), small.clone()]), Duration::from_millis(500));
        assert_eq!(sum_durations(&[big.clone(), small]), Duration::MAX);
        assert_eq!(sum_durations(&[big.clone(), big]), Duration::MAX);
        assert_eq!(sum_durations(&[] as &[TestRecord]), Duration::ZERO);
    }
}
