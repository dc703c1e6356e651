// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Upload batch lookups.

use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::UploadBatchRow;
use crate::diesel_schema::upload_batches;
use crate::error::PersistenceError;

/// Retrieves an upload batch by ID.
///
/// # Errors
///
/// Returns `NotFound` if no row exists.
pub fn get_batch(
    conn: &mut SqliteConnection,
    batch_id: i64,
) -> Result<UploadBatchRow, PersistenceError> {
    upload_batches::table
        .filter(upload_batches::batch_id.eq(batch_id))
        .first::<UploadBatchRow>(conn)
        .map_err(|_| PersistenceError::NotFound(format!("Upload batch {batch_id} not found")))
}

/// Lists batches, optionally restricted to one activity, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_batches(
    conn: &mut SqliteConnection,
    activity_id: Option<i64>,
) -> Result<Vec<UploadBatchRow>, PersistenceError> {
    let mut query = upload_batches::table.into_boxed();
    if let Some(activity_id) = activity_id {
        query = query.filter(upload_batches::activity_id.eq(activity_id));
    }

    Ok(query
        .order(upload_batches::batch_id.desc())
        .load::<UploadBatchRow>(conn)?)
}
