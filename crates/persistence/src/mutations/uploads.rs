// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Upload batch bookkeeping.

use diesel::SqliteConnection;
use diesel::prelude::*;
use padron::BatchState;
use tracing::debug;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::upload_batches;
use crate::error::PersistenceError;
use crate::now_rfc3339;

/// Creates an upload batch record.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_batch(
    conn: &mut SqliteConnection,
    activity_id: i64,
    filename: &str,
    headers_json: &str,
    mapping_json: &str,
    state: BatchState,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(upload_batches::table)
        .values((
            upload_batches::activity_id.eq(activity_id),
            upload_batches::filename.eq(filename),
            upload_batches::headers_json.eq(headers_json),
            upload_batches::mapping_json.eq(mapping_json),
            upload_batches::state.eq(state.as_str()),
            upload_batches::created_at.eq(now_rfc3339()),
        ))
        .execute(conn)?;

    let batch_id: i64 = get_last_insert_rowid(conn)?;
    debug!(batch_id, activity_id, filename, "Created upload batch");

    Ok(batch_id)
}

/// Advances the batch state.
///
/// # Errors
///
/// Returns `NotFound` if the batch does not exist.
pub fn set_batch_state(
    conn: &mut SqliteConnection,
    batch_id: i64,
    state: BatchState,
    aborted_at_row: Option<i32>,
) -> Result<(), PersistenceError> {
    let affected: usize =
        diesel::update(upload_batches::table.filter(upload_batches::batch_id.eq(batch_id)))
            .set((
                upload_batches::state.eq(state.as_str()),
                upload_batches::aborted_at_row.eq(aborted_at_row),
            ))
            .execute(conn)?;

    if affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Upload batch {batch_id} not found"
        )));
    }

    Ok(())
}

/// Stamps the final row counters onto a batch and marks it reported.
///
/// # Errors
///
/// Returns `NotFound` if the batch does not exist.
pub fn finalize_batch(
    conn: &mut SqliteConnection,
    batch_id: i64,
    row_count: i32,
    valid_count: i32,
    invalid_count: i32,
    state: BatchState,
    aborted_at_row: Option<i32>,
) -> Result<(), PersistenceError> {
    let affected: usize =
        diesel::update(upload_batches::table.filter(upload_batches::batch_id.eq(batch_id)))
            .set((
                upload_batches::row_count.eq(row_count),
                upload_batches::valid_count.eq(valid_count),
                upload_batches::invalid_count.eq(invalid_count),
                upload_batches::state.eq(state.as_str()),
                upload_batches::aborted_at_row.eq(aborted_at_row),
            ))
            .execute(conn)?;

    if affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Upload batch {batch_id} not found"
        )));
    }

    debug!(batch_id, row_count, valid_count, invalid_count, "Finalized upload batch");

    Ok(())
}
