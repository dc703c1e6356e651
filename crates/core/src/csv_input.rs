// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV decoding, delimiter detection and record extraction.
//!
//! Survey tools export with either `,` or `;` and in either UTF-8 or a
//! Latin-based encoding; this module hides those differences from the
//! rest of the pipeline.

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::config::IngestConfig;
use crate::error::CoreError;

/// Decoded CSV content: trimmed headers plus data rows padded to the
/// header arity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvContent {
    /// The header labels in file order.
    pub headers: Vec<String>,
    /// Data rows in file order; every row has exactly `headers.len()` cells.
    pub rows: Vec<Vec<String>>,
    /// The detected delimiter byte.
    pub delimiter: u8,
}

/// Decodes and parses CSV bytes.
///
/// UTF-8 is preferred; on a decode error the configured fallback encoding
/// is used (every byte sequence is valid there, so decoding never fails
/// twice). A leading BOM is stripped. The delimiter is chosen between `,`
/// and `;` by counting occurrences outside quotes on the first non-empty
/// line.
///
/// # Errors
///
/// Returns [`CoreError::ParseFailed`] when the input is empty or the CSV
/// structure is invalid, and [`CoreError::TooLarge`] when the number of
/// data rows exceeds `config.ingest_row_limit`.
pub fn read_csv(bytes: &[u8], config: &IngestConfig) -> Result<CsvContent, CoreError> {
    let text: String = decode(bytes, config);
    let text: &str = text.trim_start_matches('\u{feff}');

    if text.trim().is_empty() {
        return Err(CoreError::ParseFailed(String::from("file is empty")));
    }

    let delimiter: u8 = detect_delimiter(text);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CoreError::ParseFailed(format!("failed to read headers: {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(CoreError::ParseFailed(String::from("header line is empty")));
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record: StringRecord =
            record.map_err(|e| CoreError::ParseFailed(format!("malformed record: {e}")))?;

        if rows.len() >= config.ingest_row_limit {
            return Err(CoreError::TooLarge {
                row_count: rows.len() + 1,
                limit: config.ingest_row_limit,
            });
        }

        let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
        cells.resize(headers.len(), String::new());
        cells.truncate(headers.len());
        rows.push(cells);
    }

    debug!(
        header_count = headers.len(),
        row_count = rows.len(),
        delimiter = %char::from(delimiter),
        "Parsed CSV input"
    );

    Ok(CsvContent {
        headers,
        rows,
        delimiter,
    })
}

fn decode(bytes: &[u8], config: &IngestConfig) -> String {
    std::str::from_utf8(bytes).map_or_else(
        |_| config.default_encoding_fallback.decode(bytes),
        str::to_string,
    )
}

/// Picks `;` over `,` when the first non-empty line contains more
/// unquoted semicolons than unquoted commas.
fn detect_delimiter(text: &str) -> u8 {
    let first_line: &str = text
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");

    let mut commas: usize = 0;
    let mut semicolons: usize = 0;
    let mut in_quotes: bool = false;

    for c in first_line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => commas += 1,
            ';' if !in_quotes => semicolons += 1,
            _ => {}
        }
    }

    if semicolons > commas { b';' } else { b',' }
}
