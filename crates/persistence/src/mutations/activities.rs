// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Activity mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use padron_domain::Audience;
use tracing::debug;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::activities;
use crate::error::PersistenceError;
use crate::now_rfc3339;

/// Finds the activity for the given coordinates or creates it.
///
/// An activity is the grain of a single event occurrence, identified by
/// `(name, strategic_line, year, audience)`.
///
/// # Errors
///
/// Returns an error if the lookup or insert fails.
pub fn get_or_create_activity(
    conn: &mut SqliteConnection,
    name: &str,
    strategic_line: &str,
    year: i32,
    audience: Audience,
) -> Result<(i64, bool), PersistenceError> {
    let existing: Option<i64> = activities::table
        .filter(activities::name.eq(name))
        .filter(activities::strategic_line.eq(strategic_line))
        .filter(activities::year.eq(year))
        .filter(activities::audience.eq(audience.as_str()))
        .select(activities::activity_id)
        .first::<i64>(conn)
        .optional()?;

    if let Some(activity_id) = existing {
        return Ok((activity_id, false));
    }

    diesel::insert_into(activities::table)
        .values((
            activities::name.eq(name),
            activities::strategic_line.eq(strategic_line),
            activities::year.eq(year),
            activities::audience.eq(audience.as_str()),
            activities::created_at.eq(now_rfc3339()),
        ))
        .execute(conn)?;

    let activity_id: i64 = get_last_insert_rowid(conn)?;
    debug!(activity_id, name, strategic_line, year, "Created activity");

    Ok((activity_id, true))
}
