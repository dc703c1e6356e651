// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row structs and result types shared across queries and mutations.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// A person row as stored.
///
/// `merged_into_id` being non-null marks the row as a tombstone; lookups
/// never return tombstones but they are kept for referential integrity.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Serialize, Deserialize)]
pub struct PersonRow {
    pub person_id: i64,
    pub raw_full_name: String,
    pub normalized_full_name: String,
    pub canonical_full_name: Option<String>,
    pub national_id: Option<String>,
    pub email: Option<String>,
    pub career: Option<String>,
    pub phone: Option<String>,
    pub audience: String,
    pub merged_into_id: Option<i64>,
    pub name_history: String,
    pub created_at: String,
}

impl PersonRow {
    /// The display name: canonical when set by a merge, normalized
    /// otherwise.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.canonical_full_name
            .as_deref()
            .unwrap_or(&self.normalized_full_name)
    }

    /// Whether this row is a tombstone left behind by a merge.
    #[must_use]
    pub const fn is_tombstone(&self) -> bool {
        self.merged_into_id.is_some()
    }
}

/// An activity row as stored.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Serialize, Deserialize)]
pub struct ActivityRow {
    pub activity_id: i64,
    pub name: String,
    pub strategic_line: String,
    pub year: i32,
    pub audience: String,
    pub created_at: String,
}

/// An upload batch row as stored.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Serialize, Deserialize)]
pub struct UploadBatchRow {
    pub batch_id: i64,
    pub activity_id: i64,
    pub filename: String,
    pub headers_json: String,
    pub mapping_json: String,
    pub state: String,
    pub row_count: i32,
    pub valid_count: i32,
    pub invalid_count: i32,
    pub aborted_at_row: Option<i32>,
    pub created_at: String,
}

/// A registration row as stored.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Serialize, Deserialize)]
pub struct RegistrationRow {
    pub registration_id: i64,
    pub person_id: i64,
    pub activity_id: i64,
    pub source: String,
    pub attended: String,
    pub validation_errors: String,
    pub extras_json: String,
    pub batch_id: Option<i64>,
    pub row_index: Option<i32>,
    pub created_at: String,
}

/// A catalog entry row as stored.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Serialize, Deserialize)]
pub struct CatalogEntryRow {
    pub entry_id: i64,
    pub kind: String,
    pub name: String,
    pub folded_name: String,
    pub active: i32,
    pub created_at: String,
}

/// A review queue item as stored.
#[derive(Debug, Clone, PartialEq, Queryable, Serialize, Deserialize)]
pub struct ReviewItemRow {
    pub item_id: i64,
    pub left_person_id: i64,
    pub right_person_id: i64,
    pub audience: String,
    pub similarity: f64,
    pub status: String,
    pub version: i32,
    pub canonical_name: Option<String>,
    pub canonical_person_id: Option<i64>,
    pub decided_by: Option<String>,
    pub decided_at: Option<String>,
    pub created_at: String,
}

/// An audit log row as stored.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Serialize, Deserialize)]
pub struct AuditLogRow {
    pub event_id: i64,
    pub actor_id: String,
    pub actor_type: String,
    pub cause_id: String,
    pub cause_description: String,
    pub action_name: String,
    pub action_details: Option<String>,
    pub entity: String,
    pub entity_id: i64,
    pub before_json: String,
    pub after_json: String,
    pub created_at: String,
}

/// The attributes of a person about to be created or merged into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonAttributes {
    /// The name exactly as received.
    pub raw_full_name: String,
    /// Accent-folded, punctuation-stripped name.
    pub normalized_full_name: String,
    /// Canonical national ID string (`NNNNNNNN-D`), if present.
    pub national_id: Option<String>,
    /// Folded email, if present.
    pub email: Option<String>,
    /// Career or area, if present.
    pub career: Option<String>,
    /// Canonical phone number, if present.
    pub phone: Option<String>,
}

/// Outcome of persisting one ingested row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowPersistResult {
    /// The canonical person the row resolved to.
    pub person_id: i64,
    /// Whether the person was created by this row.
    pub created_person: bool,
    /// The registration for (person, activity).
    pub registration_id: i64,
    /// Whether the registration was inserted (false when the pair already
    /// existed, e.g. a duplicate row within the same upload).
    pub inserted_registration: bool,
}

/// Outcome of a person merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The surviving person id.
    pub survivor_id: i64,
    /// The tombstoned person id.
    pub loser_id: i64,
    /// Registrations re-pointed from the loser to the survivor.
    pub moved_registrations: usize,
    /// Loser registrations dropped because the survivor already had the
    /// activity.
    pub dropped_registrations: usize,
    /// The audit event recorded for the merge.
    pub audit_event_id: i64,
}

/// Counters for a detector run's queue insertion step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueInsertStats {
    /// Candidate pairs offered.
    pub offered: usize,
    /// Pairs actually inserted as pending items.
    pub inserted: usize,
}

/// Review queue counters grouped by status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReviewQueueStats {
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub skipped: usize,
}
