// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use padron::HeaderProposal;
use padron_domain::{Audience, CanonicalField};
use std::collections::BTreeMap;

/// A caller-confirmed column mapping: original header label to canonical
/// field. `BTreeMap` keeps the stored JSON deterministic.
pub type ColumnMapping = BTreeMap<String, CanonicalField>;

/// The metadata fixing the activity of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadMetadata {
    /// The activity name; reconciled against the catalog.
    pub activity_name: String,
    /// The strategic line; reconciled against the catalog.
    pub strategic_line: String,
    /// The activity year.
    pub year: i32,
    /// The operator-declared audience, stamped onto every person this
    /// upload creates.
    pub audience: Audience,
}

/// Response of the ingest preview operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewResponse {
    /// The header labels in file order.
    pub headers: Vec<String>,
    /// Up to the first twenty data rows for operator inspection.
    pub sample_rows: Vec<Vec<String>>,
    /// The proposed mapping, one entry per header.
    pub proposed_mapping: Vec<HeaderProposal>,
}

impl PreviewResponse {
    /// The proposal as a caller-editable mapping, skipping ignored
    /// headers.
    #[must_use]
    pub fn mapping(&self) -> ColumnMapping {
        self.proposed_mapping
            .iter()
            .filter_map(|p| p.field.map(|field| (p.header.clone(), field)))
            .collect()
    }
}

/// Summary of one side of a review pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPersonInfo {
    /// The person id.
    pub person_id: i64,
    /// Canonical name when set, normalized otherwise.
    pub display_name: String,
    /// The comparison context shown to the operator:
    /// `"display_name | career"`.
    pub context: String,
    /// The person's national ID, if known.
    pub national_id: Option<String>,
    /// The person's email, if known.
    pub email: Option<String>,
}

/// One review queue item with both persons resolved for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewItemInfo {
    /// The item id.
    pub item_id: i64,
    /// Similarity score in 0..100.
    pub similarity: f64,
    /// The item status string.
    pub status: String,
    /// The audience of the pair.
    pub audience: String,
    /// The optimistic concurrency version to echo into a decision.
    pub version: i32,
    /// The left person of the pair.
    pub left: ReviewPersonInfo,
    /// The right person of the pair.
    pub right: ReviewPersonInfo,
    /// Who decided the item, when terminal.
    pub decided_by: Option<String>,
    /// When the item was decided, when terminal.
    pub decided_at: Option<String>,
}

/// Response of the review listing operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewListResponse {
    /// The requested page of items.
    pub items: Vec<ReviewItemInfo>,
    /// Total items matching the filter.
    pub total: i64,
    /// The 1-based page number.
    pub page: i64,
    /// The page size.
    pub limit: i64,
}

/// An operator decision on a review item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionRequest {
    /// Merge the pair into the named survivor.
    Accept {
        /// The surviving person; must be one of the pair.
        canonical_person_id: i64,
        /// The display name to stamp onto the survivor.
        canonical_name: String,
    },
    /// The pair are distinct persons.
    Reject,
    /// No verdict.
    Skip,
}

/// Counters of a duplicate-detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DetectionReport {
    /// Live persons scanned.
    pub scanned_persons: usize,
    /// Pairs sharing a block that were compared.
    pub blocked_pairs: usize,
    /// Pairs at or above the review threshold.
    pub candidates_found: usize,
    /// Pairs newly enqueued for review.
    pub queue_added: usize,
}
