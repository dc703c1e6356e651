// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use padron_domain::CanonicalField;

/// Errors that can occur in the pure pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The CSV bytes could not be parsed.
    ParseFailed(String),
    /// The CSV exceeds the configured row limit.
    TooLarge {
        /// The number of data rows found.
        row_count: usize,
        /// The configured limit.
        limit: usize,
    },
    /// The supplied mapping leaves required canonical fields unmapped.
    MappingIncomplete {
        /// The canonical fields without a mapped header.
        missing: Vec<CanonicalField>,
    },
    /// A stored batch state string is not a recognized value.
    InvalidBatchState(String),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParseFailed(msg) => write!(f, "Failed to parse CSV: {msg}"),
            Self::TooLarge { row_count, limit } => {
                write!(f, "CSV has {row_count} rows, exceeding the limit of {limit}")
            }
            Self::MappingIncomplete { missing } => {
                let names: Vec<&str> = missing.iter().map(|field| field.as_str()).collect();
                write!(f, "Mapping incomplete, unmapped fields: {}", names.join(", "))
            }
            Self::InvalidBatchState(value) => write!(f, "Invalid batch state: '{value}'"),
        }
    }
}

impl std::error::Error for CoreError {}
