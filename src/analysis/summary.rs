//! Dataset-level health summary.

use crate::timeline::Gap;
use crate::validation::{FailureReason, ValidationRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Counts describing one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    /// Files scanned.
    pub total: usize,
    /// Files whose name matched the pattern.
    pub matched: usize,
    /// Files with no failure reasons.
    pub valid: usize,
    /// Files with at least one failure reason.
    pub invalid: usize,
    /// Files flagged as flat.
    pub flat: usize,
    /// Occurrences of each failure reason.
    pub reason_counts: BTreeMap<FailureReason, usize>,
}

impl DatasetSummary {
    /// Summarizes a scan.
    pub fn from_records(records: &[ValidationRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            ..Self::default()
        };

        for record in records {
            if !record.reasons().contains(FailureReason::Pattern) {
                summary.matched += 1;
            }
            if record.is_valid() {
                summary.valid += 1;
            }
            if record.is_flat() {
                summary.flat += 1;
            }
            for reason in record.reasons().iter() {
                *summary.reason_counts.entry(reason).or_insert(0) += 1;
            }
        }
        summary.invalid = summary.total - summary.valid;

        summary
    }

    /// Number of files that failed with `reason`.
    pub fn count(&self, reason: FailureReason) -> usize {
        self.reason_counts.get(&reason).copied().unwrap_or(0)
    }

    /// A dataset is healthy when every file is valid and no gaps exist.
    pub fn is_healthy(&self, gaps: &[Gap<'_>]) -> bool {
        self.invalid == 0 && gaps.is_empty()
    }
}
