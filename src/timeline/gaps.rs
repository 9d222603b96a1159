//! Gap detection between consecutive captures.

use super::minutes_between;
use crate::parsing::Timestamp;
use crate::validation::ValidationRecord;

/// Interval between two temporally adjacent records that exceeds the
/// configured threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gap<'a> {
    /// Earlier record.
    pub prev: &'a ValidationRecord,
    /// Later record.
    pub next: &'a ValidationRecord,
    /// Elapsed minutes from `prev` to `next`.
    pub gap_minutes: f64,
}

impl Gap<'_> {
    /// Timestamp of the earlier record.
    pub fn prev_timestamp(&self) -> Option<Timestamp> {
        self.prev.timestamp()
    }

    /// Timestamp of the later record.
    pub fn next_timestamp(&self) -> Option<Timestamp> {
        self.next.timestamp()
    }
}

/// Finds intervals strictly longer than `threshold_minutes`.
///
/// Records without a timestamp are dropped. The rest are sorted
/// internally, so input order does not matter; output follows
/// timestamp order.
pub fn find_gaps<'a, I>(records: I, threshold_minutes: f64) -> Vec<Gap<'a>>
where
    I: IntoIterator<Item = &'a ValidationRecord>,
{
    let mut timed: Vec<(&ValidationRecord, Timestamp)> = records
        .into_iter()
        .filter_map(|r| r.timestamp().map(|ts| (r, ts)))
        .collect();
    timed.sort_by_key(|&(_, ts)| ts);

    let gaps: Vec<_> = timed
        .windows(2)
        .filter_map(|pair| {
            let (prev, prev_ts) = pair[0];
            let (next, next_ts) = pair[1];
            let gap_minutes = minutes_between(prev_ts, next_ts);
            (gap_minutes > threshold_minutes).then_some(Gap {
                prev,
                next,
                gap_minutes,
            })
        })
        .collect();

    tracing::debug!(
        records = timed.len(),
        threshold_minutes,
        gaps = gaps.len(),
        "Gap detection complete"
    );
    gaps
}
