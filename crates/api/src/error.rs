// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.
//!
//! These are distinct from core/persistence errors and represent the
//! operation contract. Each variant carries the machine-readable code the
//! transport layer exposes.

use padron::CoreError;
use padron_domain::CanonicalField;
use padron_persistence::PersistenceError;

/// API-level errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The CSV bytes could not be parsed (`parse.failed`).
    ParseFailed {
        /// A human-readable description of the parse failure.
        reason: String,
    },
    /// The CSV exceeds the configured row limit (`parse.too_large`).
    ParseTooLarge {
        /// The number of rows found.
        row_count: usize,
        /// The configured limit.
        limit: usize,
    },
    /// The mapping leaves required canonical fields unmapped
    /// (`mapping.incomplete`).
    MappingIncomplete {
        /// The unmapped canonical fields.
        missing: Vec<CanonicalField>,
    },
    /// The upload metadata does not resolve to a known activity
    /// (`activity.unknown`).
    ActivityUnknown {
        /// Which value failed to resolve.
        value: String,
    },
    /// Another ingest currently holds the activity (`activity.busy`).
    ActivityBusy {
        /// The contested activity.
        activity_id: i64,
    },
    /// The review item is not pending (`item.not_pending`).
    ItemNotPending {
        /// The item.
        item_id: i64,
        /// Its current status.
        status: String,
    },
    /// The chosen survivor is not part of the pair
    /// (`canonical.not_in_pair`).
    CanonicalNotInPair {
        /// The item.
        item_id: i64,
        /// The person offered as survivor.
        person_id: i64,
    },
    /// A concurrent decision won the race (`merge.conflict`).
    MergeConflict {
        /// A human-readable description.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// The machine-readable error code of this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ParseFailed { .. } => "parse.failed",
            Self::ParseTooLarge { .. } => "parse.too_large",
            Self::MappingIncomplete { .. } => "mapping.incomplete",
            Self::ActivityUnknown { .. } => "activity.unknown",
            Self::ActivityBusy { .. } => "activity.busy",
            Self::ItemNotPending { .. } => "item.not_pending",
            Self::CanonicalNotInPair { .. } => "canonical.not_in_pair",
            Self::MergeConflict { .. } => "merge.conflict",
            Self::InvalidInput { .. } => "input.invalid",
            Self::ResourceNotFound { .. } => "resource.not_found",
            Self::Internal { .. } => "internal",
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParseFailed { reason } => write!(f, "Failed to parse CSV: {reason}"),
            Self::ParseTooLarge { row_count, limit } => {
                write!(f, "CSV has {row_count} rows, exceeding the limit of {limit}")
            }
            Self::MappingIncomplete { missing } => {
                let names: Vec<&str> = missing.iter().map(|field| field.as_str()).collect();
                write!(f, "Mapping incomplete, unmapped fields: {}", names.join(", "))
            }
            Self::ActivityUnknown { value } => {
                write!(f, "Unknown activity metadata value: '{value}'")
            }
            Self::ActivityBusy { activity_id } => {
                write!(f, "Activity {activity_id} has an ingest in progress; retry later")
            }
            Self::ItemNotPending { item_id, status } => {
                write!(f, "Review item {item_id} is not pending (status: {status})")
            }
            Self::CanonicalNotInPair { item_id, person_id } => {
                write!(f, "Person {person_id} is not part of review item {item_id}")
            }
            Self::MergeConflict { message } => write!(f, "Merge conflict: {message}"),
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Translates a core pipeline error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked
/// directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::ParseFailed(reason) => ApiError::ParseFailed { reason },
        CoreError::TooLarge { row_count, limit } => ApiError::ParseTooLarge { row_count, limit },
        CoreError::MappingIncomplete { missing } => ApiError::MappingIncomplete { missing },
        CoreError::InvalidBatchState(value) => ApiError::Internal {
            message: format!("Invalid stored batch state: '{value}'"),
        },
    }
}

/// Translates a persistence error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message,
        },
        PersistenceError::Conflict(message) => ApiError::MergeConflict { message },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
