// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Enriched CSV export for a committed upload batch.
//!
//! Every registration keeps all original cells in its extras map, so the
//! export reconstructs the original columns, re-runs the validator for
//! the normalized canonical values (the validator is pure, so this is
//! deterministic) and appends the stored error tags.

use std::collections::BTreeMap;
use std::str::FromStr;

use padron::{ExportMetadata, ExportRow, IngestConfig, render_enriched_csv};
use padron_domain::{CanonicalField, ErrorKind, RawRow, validate_row};
use padron_persistence::{ActivityRow, Persistence, RegistrationRow, UploadBatchRow};

use crate::error::{ApiError, translate_core_error, translate_persistence_error};
use crate::request_response::ColumnMapping;

/// Renders the enriched CSV for an upload batch.
///
/// Original columns come first in original order, then the five
/// canonical fields in normalized form, the activity metadata columns,
/// and the `errors` column. Rows appear in file order; duplicate rows
/// that collapsed into one registration appear once.
///
/// # Errors
///
/// Returns a not-found error when the batch does not exist, or an
/// internal error when stored JSON cannot be decoded.
pub fn export_batch(
    persistence: &mut Persistence,
    batch_id: i64,
    config: &IngestConfig,
) -> Result<Vec<u8>, ApiError> {
    let batch: UploadBatchRow = persistence
        .get_upload_batch(batch_id)
        .map_err(translate_persistence_error)?;
    let activity: ActivityRow = persistence
        .get_activity(batch.activity_id)
        .map_err(translate_persistence_error)?;

    let headers: Vec<String> = serde_json::from_str(&batch.headers_json)
        .map_err(|e| internal(&format!("Stored header list is invalid: {e}")))?;
    let mapping: ColumnMapping = serde_json::from_str(&batch.mapping_json)
        .map_err(|e| internal(&format!("Stored mapping is invalid: {e}")))?;

    let registrations: Vec<RegistrationRow> = persistence
        .registrations_for_batch(batch_id)
        .map_err(translate_persistence_error)?;

    let mut rows: Vec<ExportRow> = Vec::with_capacity(registrations.len());
    for registration in &registrations {
        let extras: BTreeMap<String, String> = serde_json::from_str(&registration.extras_json)
            .map_err(|e| internal(&format!("Stored extras map is invalid: {e}")))?;

        let original: Vec<String> = headers
            .iter()
            .map(|header| extras.get(header).cloned().unwrap_or_default())
            .collect();

        let raw: RawRow = raw_from_extras(&extras, &mapping);
        let (normalized, _) = validate_row(&raw, &config.institution_email_suffixes);

        let errors: Vec<ErrorKind> = registration
            .validation_errors
            .split(',')
            .filter(|tag| !tag.is_empty())
            .filter_map(|tag| ErrorKind::from_str(tag).ok())
            .collect();

        rows.push(ExportRow {
            original,
            normalized,
            errors,
        });
    }

    let metadata: ExportMetadata = ExportMetadata {
        strategic_line: activity.strategic_line,
        activity: activity.name,
        year: activity.year,
    };

    render_enriched_csv(&headers, &rows, &metadata).map_err(translate_core_error)
}

fn raw_from_extras(extras: &BTreeMap<String, String>, mapping: &ColumnMapping) -> RawRow {
    let value = |field: CanonicalField| -> String {
        mapping
            .iter()
            .find(|(_, mapped)| **mapped == field)
            .and_then(|(header, _)| extras.get(header))
            .cloned()
            .unwrap_or_default()
    };

    RawRow {
        full_name: value(CanonicalField::FullName),
        national_id: value(CanonicalField::NationalId),
        institutional_email: value(CanonicalField::InstitutionalEmail),
        program_or_area: value(CanonicalField::ProgramOrArea),
        phone: value(CanonicalField::Phone),
    }
}

fn internal(message: &str) -> ApiError {
    ApiError::Internal {
        message: message.to_string(),
    }
}
