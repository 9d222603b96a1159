//! Temporal analysis of a validated series.
//!
//! Both stages work on the same view: valid records that carry a
//! timestamp, in ascending timestamp order. They are independent;
//! gap detection reports, sampling selects.

mod gaps;
mod sampling;

pub use gaps::{find_gaps, Gap};
pub use sampling::sample;

use crate::validation::ValidationRecord;

/// Valid, timestamped records sorted ascending by timestamp.
///
/// The sort is stable, so records sharing a timestamp keep their
/// relative input order.
pub fn chronological<'a, I>(records: I) -> Vec<&'a ValidationRecord>
where
    I: IntoIterator<Item = &'a ValidationRecord>,
{
    let mut ordered: Vec<_> = records
        .into_iter()
        .filter(|r| r.is_valid() && r.timestamp().is_some())
        .collect();
    ordered.sort_by_key(|r| r.timestamp());
    ordered
}

/// Minutes elapsed from `earlier` to `later`.
pub(crate) fn minutes_between(
    earlier: crate::parsing::Timestamp,
    later: crate::parsing::Timestamp,
) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 60_000.0
}
