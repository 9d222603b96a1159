//! Validation outcome for one scanned file.

use crate::parsing::Timestamp;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

/// One reason a file failed validation.
///
/// Variants are listed in the order the validator checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureReason {
    /// The filename does not match the configured pattern.
    Pattern,
    /// The filename matched but its timestamp is not a valid date/time.
    Timestamp,
    /// The file is smaller than the configured floor.
    Size,
    /// The decoder could not produce pixels.
    Unreadable,
}

impl FailureReason {
    /// All reasons in check order.
    pub const ALL: [FailureReason; 4] = [
        FailureReason::Pattern,
        FailureReason::Timestamp,
        FailureReason::Size,
        FailureReason::Unreadable,
    ];

    /// Short tag used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::Pattern => "pattern",
            FailureReason::Timestamp => "timestamp",
            FailureReason::Size => "size",
            FailureReason::Unreadable => "unreadable",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Insertion-ordered set of failure reasons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reasons(Vec<FailureReason>);

impl Reasons {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `reason` unless it is already present.
    pub fn insert(&mut self, reason: FailureReason) {
        if !self.0.contains(&reason) {
            self.0.push(reason);
        }
    }

    /// True when `reason` was recorded.
    pub fn contains(&self, reason: FailureReason) -> bool {
        self.0.contains(&reason)
    }

    /// The first recorded reason, used as the primary diagnosis.
    pub fn primary(&self) -> Option<FailureReason> {
        self.0.first().copied()
    }

    /// True when nothing failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct reasons.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Reasons in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = FailureReason> + '_ {
        self.0.iter().copied()
    }

    /// Joins the reason tags with `separator`.
    pub fn join(&self, separator: &str) -> String {
        self.0
            .iter()
            .map(FailureReason::as_str)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl Serialize for Reasons {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl FromIterator<FailureReason> for Reasons {
    fn from_iter<I: IntoIterator<Item = FailureReason>>(iter: I) -> Self {
        let mut reasons = Reasons::new();
        for reason in iter {
            reasons.insert(reason);
        }
        reasons
    }
}

/// Complete classification outcome for one scanned file.
///
/// A record is valid exactly when it carries no failure reasons.
/// Flatness is advisory and never makes a record invalid.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRecord {
    path: PathBuf,
    timestamp: Option<Timestamp>,
    size_bytes: u64,
    readable: bool,
    width: Option<u32>,
    height: Option<u32>,
    reasons: Reasons,
    is_flat: bool,
}

impl ValidationRecord {
    /// Creates a record that has not been decoded and has no failures.
    pub fn new(path: impl Into<PathBuf>, timestamp: Option<Timestamp>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            timestamp,
            size_bytes,
            readable: false,
            width: None,
            height: None,
            reasons: Reasons::new(),
            is_flat: false,
        }
    }

    /// Adds a failure reason.
    pub fn with_reason(mut self, reason: FailureReason) -> Self {
        self.reasons.insert(reason);
        self
    }

    /// Marks the record as decoded with the given geometry.
    pub fn with_geometry(mut self, width: u32, height: u32) -> Self {
        self.readable = true;
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Sets the advisory flatness flag.
    pub fn with_flat(mut self, is_flat: bool) -> Self {
        self.is_flat = is_flat;
        self
    }

    /// Full path of the scanned file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The final path component, lossily converted.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Capture time parsed from the filename.
    pub fn timestamp(&self) -> Option<Timestamp> {
        self.timestamp
    }

    /// File size, or 0 when it could not be read.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// True when decoding was attempted and produced pixels.
    pub fn readable(&self) -> bool {
        self.readable
    }

    /// Decoded width.
    pub fn width(&self) -> Option<u32> {
        self.width
    }

    /// Decoded height.
    pub fn height(&self) -> Option<u32> {
        self.height
    }

    /// Failure reasons in check order.
    pub fn reasons(&self) -> &Reasons {
        &self.reasons
    }

    /// Advisory flat-frame flag.
    pub fn is_flat(&self) -> bool {
        self.is_flat
    }

    /// True when no check failed.
    pub fn is_valid(&self) -> bool {
        self.reasons.is_empty()
    }
}
