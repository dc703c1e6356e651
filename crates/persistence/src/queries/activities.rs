// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Activity lookups.

use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::ActivityRow;
use crate::diesel_schema::activities;
use crate::error::PersistenceError;

/// Retrieves an activity by ID.
///
/// # Errors
///
/// Returns `NotFound` if no row exists.
pub fn get_activity(
    conn: &mut SqliteConnection,
    activity_id: i64,
) -> Result<ActivityRow, PersistenceError> {
    activities::table
        .filter(activities::activity_id.eq(activity_id))
        .first::<ActivityRow>(conn)
        .map_err(|_| PersistenceError::NotFound(format!("Activity {activity_id} not found")))
}

/// Lists all activities ordered by year, strategic line and name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_activities(conn: &mut SqliteConnection) -> Result<Vec<ActivityRow>, PersistenceError> {
    Ok(activities::table
        .order((
            activities::year.asc(),
            activities::strategic_line.asc(),
            activities::name.asc(),
        ))
        .load::<ActivityRow>(conn)?)
}
