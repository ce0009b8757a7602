//! Timestamped artifact names for published reports.
//!
//! Names embed the run's counts so a folder listing reads as a history:
//! `2024-05-01_12-00-00_run_8812_(17Passes_3Fails_20Total).json`.

use crate::aggregator::RunReport;
use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// Environment variable holding the CI run identifier.
pub const RUN_ID_ENV: &str = "GITHUB_RUN_ID";

/// Run identifier used outside CI.
pub const LOCAL_RUN_ID: &str = "local";

/// Builds `YYYY-MM-DD_HH-MM-SS_run_<RUNID>_(<P>Passes_<F>Fails_<T>Total).<ext>`.
pub fn artifact_name<Tz>(timestamp: &DateTime<Tz>, run_id: &str, report: &RunReport, ext: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{}_run_{}_({}Passes_{}Fails_{}Total).{}",
        timestamp.format("%Y-%m-%d_%H-%M-%S"),
        sanitize(run_id),
        report.passed,
        report.failed,
        report.total,
        ext.trim_start_matches('.')
    )
}

/// Picks the run id: explicit value, then [`RUN_ID_ENV`], then [`LOCAL_RUN_ID`].
pub fn resolve_run_id(explicit: Option<&str>) -> String {
    resolve_run_id_from(explicit, |key| std::env::var(key).ok())
}

/// Like [`resolve_run_id`] with an injectable environment lookup.
pub fn resolve_run_id_from(explicit: Option<&str>, lookup: impl Fn(&str) -> Option<String>) -> String {
    let non_blank = |id: &str| {
        let id = id.trim();
        (!id.is_empty()).then(|| id.to_string())
    };

    explicit
        .and_then(non_blank)
        .or_else(|| lookup(RUN_ID_ENV).as_deref().and_then(non_blank))
        .unwrap_or_else(|| LOCAL_RUN_ID.to_string())
}

/// Keeps run ids safe to embed in a file name.
fn sanitize(run_id: &str) -> String {
    run_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}
