// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The ingest orchestrator: drives a single upload from raw CSV bytes to
//! persisted registrations and an upload report.
//!
//! A batch moves `Received → HeadersProposed → Mapped → Validating →
//! Persisted → Reported`. Parse and mapping failures abort before any
//! write; row-level failures are recorded on the row and never abort the
//! batch. Concurrent ingests into the same activity are serialized by an
//! advisory lock; callers observing `activity.busy` retry.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, Mutex};

use padron::{BatchState, CsvContent, IngestConfig, UploadReport, fit_headers, read_csv};
use padron_audit::{Actor, Cause};
use padron_domain::{
    CanonicalField, CatalogKind, ErrorKind, NormalizedRow, RawRow, Source, validate_row,
};
use padron_persistence::{CatalogResolution, Persistence, PersonAttributes, RowPersistResult};
use tracing::{info, warn};

use crate::error::{ApiError, translate_core_error, translate_persistence_error};
use crate::request_response::{ColumnMapping, PreviewResponse, UploadMetadata};

/// Maximum sample rows returned by the preview.
const PREVIEW_SAMPLE_ROWS: usize = 20;

/// Activities with an ingest currently in flight.
static ACTIVE_INGESTS: LazyLock<Mutex<HashSet<i64>>> = LazyLock::new(|| Mutex::new(HashSet::new()));

/// Cooperative cancellation flag for an ingest.
///
/// Cancellation is honored between rows: rows persisted before the flag
/// was observed stay persisted and the batch is recorded as aborted at
/// that row.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a new, unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// RAII guard for the per-activity advisory lock.
struct ActivityLockGuard {
    activity_id: i64,
}

impl Drop for ActivityLockGuard {
    fn drop(&mut self) {
        if let Ok(mut active) = ACTIVE_INGESTS.lock() {
            active.remove(&self.activity_id);
        }
    }
}

fn lock_activity(activity_id: i64) -> Result<ActivityLockGuard, ApiError> {
    let mut active = ACTIVE_INGESTS.lock().map_err(|_| ApiError::Internal {
        message: String::from("Activity lock registry is poisoned"),
    })?;

    if !active.insert(activity_id) {
        return Err(ApiError::ActivityBusy { activity_id });
    }

    Ok(ActivityLockGuard { activity_id })
}

/// Parses CSV bytes and proposes a column mapping without writing
/// anything.
///
/// # Errors
///
/// Returns `parse.failed` or `parse.too_large`.
pub fn preview(bytes: &[u8], config: &IngestConfig) -> Result<PreviewResponse, ApiError> {
    let content: CsvContent = read_csv(bytes, config).map_err(translate_core_error)?;
    let proposal = fit_headers(&content.headers, &config.alias_table);

    let sample_rows: Vec<Vec<String>> = content
        .rows
        .iter()
        .take(PREVIEW_SAMPLE_ROWS)
        .cloned()
        .collect();

    Ok(PreviewResponse {
        headers: content.headers,
        sample_rows,
        proposed_mapping: proposal.proposals,
    })
}

/// Commits an upload: parses, maps, validates, reconciles and persists
/// every row, then emits the upload report.
///
/// The mapping is the caller's when supplied (typically an amended
/// preview proposal) and the fitter's otherwise.
///
/// # Errors
///
/// * `parse.failed` / `parse.too_large` - the CSV could not be read
/// * `mapping.incomplete` - a required canonical field is unmapped
/// * `activity.unknown` - the metadata does not resolve in the catalog
/// * `activity.busy` - another ingest holds the activity
#[allow(clippy::too_many_lines, clippy::too_many_arguments)]
pub fn commit(
    persistence: &mut Persistence,
    bytes: &[u8],
    filename: &str,
    mapping: Option<&ColumnMapping>,
    metadata: &UploadMetadata,
    config: &IngestConfig,
    actor: &Actor,
    cancel: Option<&CancelFlag>,
) -> Result<UploadReport, ApiError> {
    let content: CsvContent = read_csv(bytes, config).map_err(translate_core_error)?;

    let mapping: ColumnMapping = match mapping {
        Some(supplied) => supplied.clone(),
        None => {
            let proposal = fit_headers(&content.headers, &config.alias_table);
            proposal
                .proposals
                .iter()
                .filter_map(|p| p.field.map(|field| (p.header.clone(), field)))
                .collect()
        }
    };

    let field_indices: [usize; 5] = resolve_field_indices(&content.headers, &mapping)?;

    let activity_id: i64 = resolve_activity(persistence, metadata)?;
    let _guard: ActivityLockGuard = lock_activity(activity_id)?;

    let headers_json: String = serde_json::to_string(&content.headers)
        .map_err(|e| ApiError::Internal { message: e.to_string() })?;
    let mapping_json: String = serde_json::to_string(&mapping)
        .map_err(|e| ApiError::Internal { message: e.to_string() })?;

    let batch_id: i64 = persistence
        .create_upload_batch(activity_id, filename, &headers_json, &mapping_json, BatchState::Mapped)
        .map_err(translate_persistence_error)?;
    persistence
        .set_batch_state(batch_id, BatchState::Validating, None)
        .map_err(translate_persistence_error)?;

    let cause: Cause = Cause::new(
        format!("upload-batch-{batch_id}"),
        format!("CSV upload '{filename}'"),
    );

    let mut valid_rows: usize = 0;
    let mut invalid_rows: usize = 0;
    let mut new_persons: usize = 0;
    let mut existing_persons: usize = 0;
    let mut within_upload_duplicates: usize = 0;
    let mut all_tags: Vec<ErrorKind> = Vec::new();
    let mut aborted_at_row: Option<usize> = None;

    for (row_index, cells) in content.rows.iter().enumerate() {
        if let Some(flag) = cancel
            && flag.is_cancelled()
        {
            aborted_at_row = Some(row_index);
            warn!(batch_id, row_index, "Ingest cancelled between rows");
            break;
        }

        let raw: RawRow = extract_row(cells, field_indices);
        let (normalized, errors) = validate_row(&raw, &config.institution_email_suffixes);

        let extras: BTreeMap<&String, &String> =
            content.headers.iter().zip(cells.iter()).collect();
        let extras_json: String = serde_json::to_string(&extras)
            .map_err(|e| ApiError::Internal { message: e.to_string() })?;

        let attrs: PersonAttributes = person_attributes(&normalized);

        let persisted: Result<RowPersistResult, _> = persistence.persist_ingested_row(
            &attrs,
            metadata.audience,
            activity_id,
            Source::Csv,
            &errors,
            &extras_json,
            Some(batch_id),
            i32::try_from(row_index).ok(),
            actor,
            &cause,
        );

        match persisted {
            Ok(result) => {
                if result.created_person {
                    new_persons += 1;
                } else {
                    existing_persons += 1;
                }
                if !result.inserted_registration {
                    within_upload_duplicates += 1;
                }
                if errors.is_empty() {
                    valid_rows += 1;
                } else {
                    invalid_rows += 1;
                }
                all_tags.extend(errors);
            }
            Err(err) => {
                warn!(batch_id, row_index, error = %err, "Row failed to persist");
                invalid_rows += 1;
                all_tags.extend(errors);
                all_tags.push(ErrorKind::PersistFailed);
            }
        }
    }

    let final_state: BatchState = if aborted_at_row.is_some() {
        BatchState::Aborted
    } else {
        BatchState::Reported
    };

    persistence
        .finalize_upload_batch(
            batch_id,
            i32::try_from(content.rows.len()).unwrap_or(i32::MAX),
            i32::try_from(valid_rows).unwrap_or(i32::MAX),
            i32::try_from(invalid_rows).unwrap_or(i32::MAX),
            final_state,
            aborted_at_row.and_then(|row| i32::try_from(row).ok()),
        )
        .map_err(translate_persistence_error)?;

    info!(
        batch_id,
        activity_id,
        total = content.rows.len(),
        valid = valid_rows,
        invalid = invalid_rows,
        new_persons,
        "Upload committed"
    );

    Ok(UploadReport {
        batch_id,
        activity_id,
        total_rows: content.rows.len(),
        valid_rows,
        invalid_rows,
        new_persons,
        existing_persons,
        within_upload_duplicates,
        error_breakdown: UploadReport::breakdown(&all_tags),
        aborted_at_row,
    })
}

/// Resolves the upload metadata to an activity, reconciling the name and
/// strategic line through the catalog.
fn resolve_activity(
    persistence: &mut Persistence,
    metadata: &UploadMetadata,
) -> Result<i64, ApiError> {
    let line: String = resolve_catalog_name(
        persistence,
        CatalogKind::StrategicLine,
        &metadata.strategic_line,
    )?;
    let name: String = resolve_catalog_name(
        persistence,
        CatalogKind::ActivityName,
        &metadata.activity_name,
    )?;

    let (activity_id, _) = persistence
        .get_or_create_activity(&name, &line, metadata.year, metadata.audience)
        .map_err(translate_persistence_error)?;

    Ok(activity_id)
}

fn resolve_catalog_name(
    persistence: &mut Persistence,
    kind: CatalogKind,
    value: &str,
) -> Result<String, ApiError> {
    let resolution: CatalogResolution = persistence
        .resolve_catalog_value(kind, value)
        .map_err(translate_persistence_error)?;

    resolution.entry().map_or_else(
        || {
            Err(ApiError::ActivityUnknown {
                value: value.to_string(),
            })
        },
        |entry| Ok(entry.name.clone()),
    )
}

/// Validates the mapping against the header list and returns the cell
/// index of each canonical field, in required order.
fn resolve_field_indices(
    headers: &[String],
    mapping: &ColumnMapping,
) -> Result<[usize; 5], ApiError> {
    let mut indices: [Option<usize>; 5] = [None; 5];

    for (header, field) in mapping {
        let Some(position) = headers.iter().position(|h| h == header) else {
            return Err(ApiError::InvalidInput {
                field: String::from("mapping"),
                message: format!("Mapped column '{header}' not found in CSV"),
            });
        };

        let slot: &mut Option<usize> = &mut indices[field.required_rank()];
        if slot.is_some() {
            return Err(ApiError::InvalidInput {
                field: String::from("mapping"),
                message: format!("Canonical field '{field}' is mapped twice"),
            });
        }
        *slot = Some(position);
    }

    let missing: Vec<CanonicalField> = CanonicalField::ALL
        .iter()
        .copied()
        .filter(|field| indices[field.required_rank()].is_none())
        .collect();
    if !missing.is_empty() {
        return Err(ApiError::MappingIncomplete { missing });
    }

    Ok([
        indices[0].unwrap_or_default(),
        indices[1].unwrap_or_default(),
        indices[2].unwrap_or_default(),
        indices[3].unwrap_or_default(),
        indices[4].unwrap_or_default(),
    ])
}

fn extract_row(cells: &[String], field_indices: [usize; 5]) -> RawRow {
    let cell = |index: usize| -> String { cells.get(index).cloned().unwrap_or_default() };

    RawRow {
        full_name: cell(field_indices[0]),
        national_id: cell(field_indices[1]),
        institutional_email: cell(field_indices[2]),
        program_or_area: cell(field_indices[3]),
        phone: cell(field_indices[4]),
    }
}

/// Converts a validated row into the person attributes the registry
/// stores.
pub(crate) fn person_attributes(normalized: &NormalizedRow) -> PersonAttributes {
    PersonAttributes {
        raw_full_name: normalized.raw_full_name.clone(),
        normalized_full_name: normalized.normalized_full_name.clone(),
        national_id: normalized
            .national_id
            .as_ref()
            .map(padron_domain::NationalId::canonical),
        email: normalized.institutional_email.clone(),
        career: normalized.program_or_area.clone(),
        phone: normalized.phone.clone(),
    }
}
