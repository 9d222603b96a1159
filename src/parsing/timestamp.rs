//! Pattern matching and timestamp decoding for a single filename.

use super::Timestamp;
use chrono::format::ParseErrorKind;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use regex::Regex;
use thiserror::Error;

/// Errors raised while building a [`TimestampParser`].
#[derive(Debug, Error)]
pub enum PatternError {
    /// The regex does not compile.
    #[error("invalid filename pattern: {0}")]
    Invalid(#[from] regex::Error),
    /// The regex has no group to capture the timestamp.
    #[error("filename pattern has no capture group for the timestamp")]
    MissingCaptureGroup,
    /// The timestamp format is blank.
    #[error("timestamp format is empty")]
    EmptyFormat,
}

/// Result of interpreting one filename.
///
/// `timestamp` is only ever present when `matched` is true. A name with
/// the right shape but impossible calendar values (day 99, hour 25)
/// yields `matched = true` with no timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOutcome {
    /// The filename matched the configured pattern.
    pub matched: bool,
    /// Capture time decoded from the first capture group.
    pub timestamp: Option<Timestamp>,
}

impl ParseOutcome {
    /// Outcome for a filename that does not have the expected shape.
    pub const fn unmatched() -> Self {
        Self {
            matched: false,
            timestamp: None,
        }
    }
}

/// Parses `name` with `pattern`, decoding capture group 1 with `format`.
///
/// The regex is used as given; anchoring is the caller's concern.
/// [`TimestampParser`] anchors its pattern to the whole filename.
pub fn parse_timestamp(name: &str, pattern: &Regex, format: &str) -> ParseOutcome {
    let Some(captures) = pattern.captures(name) else {
        return ParseOutcome::unmatched();
    };

    let timestamp = captures
        .get(1)
        .and_then(|digits| decode_timestamp(digits.as_str(), format));

    ParseOutcome {
        matched: true,
        timestamp,
    }
}

/// Decodes a captured substring, accepting date-only formats as midnight.
///
/// Second `60` is rejected; chrono would otherwise keep it as a leap
/// second in any minute.
fn decode_timestamp(text: &str, format: &str) -> Option<Timestamp> {
    match NaiveDateTime::parse_from_str(text, format) {
        Ok(ts) if ts.nanosecond() >= 1_000_000_000 => None,
        Ok(ts) => Some(ts),
        Err(e) if e.kind() == ParseErrorKind::NotEnough => NaiveDate::parse_from_str(text, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0)),
        Err(_) => None,
    }
}

/// Compiled filename pattern plus timestamp format.
///
/// The pattern must match the entire filename; a trailing `.bak` on an
/// otherwise well-formed name is a mismatch.
#[derive(Debug, Clone)]
pub struct TimestampParser {
    pattern: Regex,
    format: String,
}

impl TimestampParser {
    /// Compiles `pattern` anchored to the whole filename.
    pub fn new(pattern: &str, format: &str) -> Result<Self, PatternError> {
        if format.trim().is_empty() {
            return Err(PatternError::EmptyFormat);
        }

        let pattern = Regex::new(&format!("^(?:{pattern})$"))?;
        // Group 0 is the whole match.
        if pattern.captures_len() < 2 {
            return Err(PatternError::MissingCaptureGroup);
        }

        Ok(Self {
            pattern,
            format: format.to_string(),
        })
    }

    /// Interprets a bare filename (no directory components).
    pub fn parse(&self, name: &str) -> ParseOutcome {
        parse_timestamp(name, &self.pattern, &self.format)
    }

    /// Returns the anchored pattern.
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Returns the timestamp format.
    pub fn format(&self) -> &str {
        &self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{DEFAULT_PATTERN, DEFAULT_TIMESTAMP_FORMAT};
    use chrono::{Datelike, Timelike};
    use proptest::prelude::*;

    fn parser() -> TimestampParser {
        TimestampParser::new(DEFAULT_PATTERN, DEFAULT_TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn test_matching_name_yields_timestamp() {
        let outcome = parser().parse("metroLocal_IPC_main_20230101000000.jpg");

        assert!(outcome.matched);
        let ts = outcome.timestamp.unwrap();
        assert_eq!(ts.year(), 2023);
        assert_eq!(ts.month(), 1);
        assert_eq!(ts.day(), 1);
    }

    #[test]
    fn test_foreign_name_is_unmatched() {
        let outcome = parser().parse("badname.jpg");
        assert_eq!(outcome, ParseOutcome::unmatched());
    }

    #[test]
    fn test_impossible_date_is_matched_without_timestamp() {
        let outcome = parser().parse("metroLocal_IPC_main_20230199000000.jpg");

        assert!(outcome.matched);
        assert!(outcome.timestamp.is_none());
    }

    #[test]
    fn test_second_sixty_is_matched_without_timestamp() {
        for name in [
            "metroLocal_IPC_main_20230101000060.jpg",
            "metroLocal_IPC_main_20231231235960.jpg",
        ] {
            let outcome = parser().parse(name);
            assert!(outcome.matched, "{name}");
            assert!(outcome.timestamp.is_none(), "{name}");
        }
    }

    #[test]
    fn test_pattern_is_anchored_to_whole_name() {
        let p = parser();
        assert!(!p.parse("metroLocal_IPC_main_20230101000000.jpg.bak").matched);
        assert!(!p.parse("x_metroLocal_IPC_main_20230101000000.jpg").matched);
    }

    #[test]
    fn test_date_only_format_is_midnight() {
        let p = TimestampParser::new(r"day_(\d{8})\.png", "%Y%m%d").unwrap();
        let ts = p.parse("day_20240229.png").timestamp.unwrap();

        assert_eq!(ts.day(), 29);
        assert_eq!(ts.hour(), 0);
        assert_eq!(ts.minute(), 0);
    }

    #[test]
    fn test_pattern_without_group_rejected() {
        assert!(matches!(
            TimestampParser::new(r"img_\d+\.jpg", DEFAULT_TIMESTAMP_FORMAT),
            Err(PatternError::MissingCaptureGroup)
        ));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        assert!(matches!(
            TimestampParser::new(r"img_(\d+", DEFAULT_TIMESTAMP_FORMAT),
            Err(PatternError::Invalid(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_valid_timestamps_round_trip(
            year in 1970i32..2100,
            month in 1u32..=12,
            day in 1u32..=28,
            hour in 0u32..24,
            minute in 0u32..60,
            second in 0u32..60,
        ) {
            let name = format!(
                "metroLocal_IPC_main_{year:04}{month:02}{day:02}{hour:02}{minute:02}{second:02}.jpg"
            );
            let outcome = parser().parse(&name);

            prop_assert!(outcome.matched);
            let ts = outcome.timestamp.unwrap();
            prop_assert_eq!(
                (ts.year(), ts.month(), ts.day(), ts.hour(), ts.minute(), ts.second()),
                (year, month, day, hour, minute, second)
            );
        }

        #[test]
        fn prop_foreign_names_never_match(name in "[a-z]{1,12}\\.(txt|png|jpeg)") {
            let outcome = parser().parse(&name);
            prop_assert!(!outcome.matched);
            prop_assert!(outcome.timestamp.is_none());
        }
    }
}
