// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Enriched CSV export rendering.
//!
//! The export reproduces the original columns in their original order,
//! then appends the five canonical fields in normalized form, three
//! metadata columns and a comma-separated error tag column.

use csv::WriterBuilder;
use padron_domain::{CanonicalField, ErrorKind, NormalizedRow};

use crate::error::CoreError;

/// Activity metadata stamped onto every exported row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportMetadata {
    /// The strategic line of the activity.
    pub strategic_line: String,
    /// The activity name.
    pub activity: String,
    /// The activity year.
    pub year: i32,
}

/// One exported row: original cells plus the validated canonical values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    /// The original cells, aligned with the original header order.
    pub original: Vec<String>,
    /// The normalized canonical values of the row.
    pub normalized: NormalizedRow,
    /// The row's validation error tags.
    pub errors: Vec<ErrorKind>,
}

/// Renders the enriched CSV for an upload batch.
///
/// Row order is the caller's order, which matches the input file.
///
/// # Errors
///
/// Returns [`CoreError::ParseFailed`] when the CSV writer fails, which
/// only happens on row arity mismatches.
pub fn render_enriched_csv(
    original_headers: &[String],
    rows: &[ExportRow],
    metadata: &ExportMetadata,
) -> Result<Vec<u8>, CoreError> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    let mut header_row: Vec<String> = original_headers.to_vec();
    for field in CanonicalField::ALL {
        header_row.push(field.as_str().to_string());
    }
    header_row.push(String::from("strategic_line"));
    header_row.push(String::from("activity"));
    header_row.push(String::from("year"));
    header_row.push(String::from("errors"));

    writer
        .write_record(&header_row)
        .map_err(|e| CoreError::ParseFailed(format!("failed to write export header: {e}")))?;

    for row in rows {
        let mut cells: Vec<String> = row.original.clone();
        cells.resize(original_headers.len(), String::new());

        let normalized: &NormalizedRow = &row.normalized;
        cells.push(normalized.normalized_full_name.clone());
        cells.push(
            normalized
                .national_id
                .as_ref()
                .map(padron_domain::NationalId::canonical)
                .unwrap_or_default(),
        );
        cells.push(normalized.institutional_email.clone().unwrap_or_default());
        cells.push(normalized.program_or_area.clone().unwrap_or_default());
        cells.push(normalized.phone.clone().unwrap_or_default());

        cells.push(metadata.strategic_line.clone());
        cells.push(metadata.activity.clone());
        cells.push(metadata.year.to_string());

        let tags: Vec<&str> = row.errors.iter().map(|e| e.as_str()).collect();
        cells.push(tags.join(","));

        writer
            .write_record(&cells)
            .map_err(|e| CoreError::ParseFailed(format!("failed to write export row: {e}")))?;
    }

    writer
        .into_inner()
        .map_err(|e| CoreError::ParseFailed(format!("failed to flush export: {e}")))
}
