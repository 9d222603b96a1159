//! Minimum-interval frame sampling.

use super::minutes_between;
use crate::validation::ValidationRecord;

/// Selects records spaced at least `interval_minutes` apart.
///
/// `records` must already be in ascending timestamp order. With no
/// interval (or exactly zero) every record is returned, untimed ones
/// included. Any other interval runs the greedy pass: untimed records
/// are skipped, the first timestamped record is always kept, and each
/// later record is kept when it is at least `interval_minutes` after the
/// previously kept one. A negative interval therefore keeps every
/// timestamped record.
pub fn sample<'a, I>(records: I, interval_minutes: Option<f64>) -> Vec<&'a ValidationRecord>
where
    I: IntoIterator<Item = &'a ValidationRecord>,
{
    let interval = match interval_minutes {
        Some(minutes) if minutes != 0.0 => minutes,
        _ => return records.into_iter().collect(),
    };

    let mut selected = Vec::new();
    let mut reference = None;

    for record in records {
        let Some(ts) = record.timestamp() else {
            continue;
        };
        let keep = match reference {
            None => true,
            Some(last) => minutes_between(last, ts) >= interval,
        };
        if keep {
            selected.push(record);
            reference = Some(ts);
        }
    }

    tracing::debug!(
        interval_minutes = interval,
        selected = selected.len(),
        "Sampling complete"
    );
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::Timestamp;
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;

    fn at(minutes: i64) -> Timestamp {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::minutes(minutes)
    }

    fn series(minutes: &[i64]) -> Vec<ValidationRecord> {
        minutes
            .iter()
            .map(|&m| ValidationRecord::new(format!("{m}.jpg"), Some(at(m)), 1000))
            .collect()
    }

    fn names(records: &[&ValidationRecord]) -> Vec<String> {
        records.iter().map(|r| r.file_name()).collect()
    }

    #[test]
    fn test_sample_images() {
        let records = series(&[0, 1, 2, 3, 4]);
        let sampled = sample(&records, Some(2.0));

        assert_eq!(names(&sampled), vec!["0.jpg", "2.jpg", "4.jpg"]);
    }

    #[test]
    fn test_no_interval_returns_everything() {
        let mut records = series(&[0, 1]);
        records.push(ValidationRecord::new("untimed.jpg", None, 1000));

        assert_eq!(sample(&records, None).len(), 3);
        assert_eq!(sample(&records, Some(0.0)).len(), 3);
    }

    #[test]
    fn test_negative_interval_keeps_timed_records_only() {
        let mut records = series(&[0, 1, 2]);
        records.insert(1, ValidationRecord::new("untimed.jpg", None, 1000));

        assert_eq!(
            names(&sample(&records, Some(-5.0))),
            vec!["0.jpg", "1.jpg", "2.jpg"]
        );
    }

    #[test]
    fn test_untimed_records_skipped_when_sampling() {
        let mut records = vec![ValidationRecord::new("untimed.jpg", None, 1000)];
        records.extend(series(&[0, 10]));

        assert_eq!(names(&sample(&records, Some(5.0))), vec!["0.jpg", "10.jpg"]);
    }

    #[test]
    fn test_reference_is_last_selected() {
        // A long gap resets the spacing instead of snapping to a grid.
        let records = series(&[0, 3, 17, 19, 21, 22]);
        let sampled = sample(&records, Some(5.0));

        assert_eq!(names(&sampled), vec!["0.jpg", "17.jpg", "22.jpg"]);
    }

    #[test]
    fn test_trailing_frames_inside_interval_dropped() {
        let records = series(&[0, 10, 12]);
        assert_eq!(names(&sample(&records, Some(10.0))), vec!["0.jpg", "10.jpg"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(sample(&Vec::<ValidationRecord>::new(), Some(5.0)).is_empty());
    }

    proptest! {
        #[test]
        fn prop_selection_is_spaced_and_maximal(
            mut offsets in prop::collection::vec(0i64..2_000, 1..60),
            interval in 1u32..120,
        ) {
            offsets.sort_unstable();
            let records = series(&offsets);
            let interval = interval as f64;
            let sampled = sample(&records, Some(interval));

            prop_assert!(std::ptr::eq(sampled[0], &records[0]));

            for pair in sampled.windows(2) {
                let gap = minutes_between(
                    pair[0].timestamp().unwrap(),
                    pair[1].timestamp().unwrap(),
                );
                prop_assert!(gap >= interval);
            }

            // Every skipped record falls inside the interval after the
            // most recent selection before it.
            let mut last = None;
            let mut picks = sampled.iter().peekable();
            for record in &records {
                if picks.peek().is_some_and(|p| std::ptr::eq(**p, record)) {
                    picks.next();
                    last = record.timestamp();
                } else {
                    let gap = minutes_between(last.unwrap(), record.timestamp().unwrap());
                    prop_assert!(gap < interval);
                }
            }
        }
    }
}
