// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Transport-agnostic operations over the registration registry.
//!
//! The operations in this crate are what external collaborators (an HTTP
//! server, a CLI, tests) call. Authentication is out of scope: callers
//! supply an opaque actor string that lands in the audit trail.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod catalog;
mod detect;
mod error;
mod export;
mod indicators;
mod ingest;
mod registrations;
mod request_response;
mod review;

#[cfg(test)]
mod tests;

pub use catalog::{
    create_entry as catalog_create, deactivate_entry as catalog_deactivate,
    list_entries as catalog_list, map_unknown as catalog_map_unknown,
    resolve as catalog_resolve,
};
pub use detect::detect_duplicates;
pub use error::{ApiError, translate_core_error, translate_persistence_error};
pub use export::export_batch;
pub use indicators::query as indicators_query;
pub use ingest::{CancelFlag, commit as ingest_commit, preview as ingest_preview};
pub use registrations::{
    bulk_toggle_attendance, correct_row, reconcile_preview, register_walk_in,
    register_walk_in_with_config, toggle_attendance,
};
pub use request_response::{
    ColumnMapping, DecisionRequest, DetectionReport, PreviewResponse, ReviewItemInfo,
    ReviewListResponse, ReviewPersonInfo, UploadMetadata,
};
pub use review::{decide as review_decide, list_reviews, review_stats};
