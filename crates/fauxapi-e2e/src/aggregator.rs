//! Report aggregation over collected test records.
//!
//! [`aggregate`] is a pure function of its input: the same records always
//! produce an equal [`RunReport`], and an empty slice produces an all-zero
//! report rather than an error.

use crate::models::{TestRecord, sum_durations};
use fauxapi_core::ErrorKind;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Duration;

/// Histogram bucket for failures whose detail reports a failed assertion.
pub const ASSERTION_FAILED: &str = "AssertionFailed";

/// Histogram bucket for failures that cannot be categorized.
pub const UNKNOWN: &str = "Unknown";

/// Aggregate statistics over one run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,

    /// Percent of records that passed, 0.0 when there are none.
    pub pass_rate: f64,

    /// Percent of records that failed, 0.0 when there are none.
    pub fail_rate: f64,

    /// Failure count per error-type label. Sums to `failed`.
    pub error_type_histogram: BTreeMap<String, usize>,

    /// First record with the shortest duration.
    pub fastest: Option<TestRecord>,

    /// First record with the longest duration.
    pub slowest: Option<TestRecord>,

    /// Mean duration in seconds over all records, 0.0 when there are none.
    pub average_duration: f64,

    /// Sum of all record durations.
    pub total_duration: Duration,
}

impl RunReport {
    /// Highest-count error type; ties go to the label that sorts first.
    pub fn most_common_error(&self) -> Option<(&str, usize)> {
        self.error_type_histogram
            .iter()
            .fold(None, |best, (label, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((label.as_str(), count)),
            })
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Aggregates records into a [`RunReport`].
pub fn aggregate(records: &[TestRecord]) -> RunReport {
    let total = records.len();
    let passed = records.iter().filter(|r| r.passed()).count();
    let failed = total - passed;

    let (pass_rate, fail_rate) = if total == 0 {
        (0.0, 0.0)
    } else {
        let pass_rate = passed as f64 / total as f64 * 100.0;
        (pass_rate, 100.0 - pass_rate)
    };

    let mut error_type_histogram = BTreeMap::new();
    for record in records.iter().filter(|r| !r.passed()) {
        *error_type_histogram
            .entry(error_type(record.error_detail.as_deref()).to_string())
            .or_insert(0) += 1;
    }

    let total_duration = sum_durations(records);
    let average_duration = if total == 0 {
        0.0
    } else {
        total_duration.as_secs_f64() / total as f64
    };

    RunReport {
        total,
        passed,
        failed,
        pass_rate,
        fail_rate,
        error_type_histogram,
        fastest: first_by(records, |candidate, best| candidate < best),
        slowest: first_by(records, |candidate, best| candidate > best),
        average_duration,
        total_duration,
    }
}

/// First record whose duration beats every earlier one under `better`.
/// Later records with an equal duration never replace it.
fn first_by(
    records: &[TestRecord],
    better: impl Fn(Duration, Duration) -> bool,
) -> Option<TestRecord> {
    let mut best: Option<&TestRecord> = None;
    for record in records {
        match best {
            Some(current) if !better(record.duration, current.duration) => {}
            _ => best = Some(record),
        }
    }
    best.cloned()
}

struct Patterns {
    tag: Regex,
    status: Regex,
    assertion: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            tag: Regex::new(r"\[([A-Za-z]+)\]")?,
            status: Regex::new(r"\bHTTP (\d{3})\b")?,
            assertion: Regex::new(r"(?i)^assertion failed")?,
        })
    }
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    // Constant patterns; covered by `test_patterns_compile`.
    PATTERNS.get_or_init(|| Patterns::compile().expect("classification patterns are valid"))
}

/// Classifies a failure detail into a histogram label.
///
/// Tried in order: a `[Label]` tag naming a known error kind, an
/// `HTTP <code>` matching a failure status, an assertion message. Anything
/// else, including a missing detail, is [`UNKNOWN`].
pub fn error_type(detail: Option<&str>) -> &'static str {
    let Some(detail) = detail else {
        return UNKNOWN;
    };
    let patterns = patterns();

    let tagged = patterns
        .tag
        .captures_iter(detail)
        .find_map(|caps| ErrorKind::from_label(caps.get(1)?.as_str()));
    if let Some(kind) = tagged {
        return kind.label();
    }

    let by_status = patterns.status.captures_iter(detail).find_map(|caps| {
        let code = caps.get(1)?.as_str().parse().ok()?;
        ErrorKind::from_status(code)
    });
    if let Some(kind) = by_status {
        return kind.label();
    }

    if patterns.assertion.is_match(detail) {
        return ASSERTION_FAILED;
    }

    UNKNOWN
}

/// The error kind behind a failure detail, if it names one.
pub fn error_kind(detail: Option<&str>) -> Option<ErrorKind> {
    ErrorKind::from_label(error_type(detail))
}
