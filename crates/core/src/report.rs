// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use padron_domain::ErrorKind;
use std::str::FromStr;

use crate::error::CoreError;

/// Lifecycle state of an upload batch.
///
/// A batch moves `Received → HeadersProposed → Mapped → Validating →
/// Persisted → Reported`; cancellation between rows leaves it `Aborted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchState {
    /// Raw bytes accepted, nothing parsed yet.
    #[default]
    Received,
    /// Headers parsed and a mapping proposed.
    HeadersProposed,
    /// A complete mapping is fixed for the batch.
    Mapped,
    /// Rows are being validated and persisted.
    Validating,
    /// All rows persisted.
    Persisted,
    /// The upload report has been emitted. Terminal.
    Reported,
    /// The ingest was cancelled between rows. Terminal.
    Aborted,
}

impl BatchState {
    /// Converts this state to its string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::HeadersProposed => "headers_proposed",
            Self::Mapped => "mapped",
            Self::Validating => "validating",
            Self::Persisted => "persisted",
            Self::Reported => "reported",
            Self::Aborted => "aborted",
        }
    }
}

impl FromStr for BatchState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "received" => Ok(Self::Received),
            "headers_proposed" => Ok(Self::HeadersProposed),
            "mapped" => Ok(Self::Mapped),
            "validating" => Ok(Self::Validating),
            "persisted" => Ok(Self::Persisted),
            "reported" => Ok(Self::Reported),
            "aborted" => Ok(Self::Aborted),
            _ => Err(CoreError::InvalidBatchState(s.to_string())),
        }
    }
}

impl std::fmt::Display for BatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The outcome summary of a committed upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    /// Cursor identifying the batch for later report download.
    pub batch_id: i64,
    /// The activity all rows were registered to.
    pub activity_id: i64,
    /// Total data rows in the file.
    pub total_rows: usize,
    /// Rows with an empty error set.
    pub valid_rows: usize,
    /// Rows carrying at least one error tag.
    pub invalid_rows: usize,
    /// Rows that created a new person.
    pub new_persons: usize,
    /// Rows that resolved to an existing person.
    pub existing_persons: usize,
    /// Rows whose (person, activity) pair was already inserted earlier in
    /// the same upload.
    pub within_upload_duplicates: usize,
    /// Error tag counts, sorted by tag for stable output.
    pub error_breakdown: Vec<(ErrorKind, usize)>,
    /// The row index at which the batch was cancelled, if it was.
    pub aborted_at_row: Option<usize>,
}

impl UploadReport {
    /// Builds the sorted error breakdown from a flat list of tags.
    #[must_use]
    pub fn breakdown(tags: &[ErrorKind]) -> Vec<(ErrorKind, usize)> {
        let mut counts: Vec<(ErrorKind, usize)> = Vec::new();
        for tag in tags {
            match counts.iter_mut().find(|(kind, _)| kind == tag) {
                Some((_, count)) => *count += 1,
                None => counts.push((*tag, 1)),
            }
        }
        counts.sort_by_key(|(kind, _)| kind.as_str());
        counts
    }
}
