//! Append-only collection of test records.

use crate::models::{TestRecord, sum_durations};
use std::time::Duration;

/// Gathers one [`TestRecord`] per scenario execution, in execution order.
///
/// Records are never reordered, replaced or deduplicated.
#[derive(Debug, Clone, Default)]
pub struct ResultCollector {
    records: Vec<TestRecord>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, record: TestRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[TestRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of all record durations.
    pub fn total_duration(&self) -> Duration {
        sum_durations(&self.records)
    }

    pub fn into_records(self) -> Vec<TestRecord> {
        self.records
    }
}
