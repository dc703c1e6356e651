// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Person lookups.
//!
//! Lookups never match tombstones: identity resolution only considers
//! live rows, and the partial unique index guarantees at most one live
//! row per national ID.

use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::PersonRow;
use crate::diesel_schema::persons;
use crate::error::PersistenceError;

/// Retrieves a person by ID, tombstone or not.
///
/// # Errors
///
/// Returns `NotFound` if no row exists.
pub fn get_person(conn: &mut SqliteConnection, person_id: i64) -> Result<PersonRow, PersistenceError> {
    persons::table
        .filter(persons::person_id.eq(person_id))
        .first::<PersonRow>(conn)
        .map_err(|_| PersistenceError::NotFound(format!("Person {person_id} not found")))
}

/// Finds the live person holding a canonical national ID.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_live_by_national_id(
    conn: &mut SqliteConnection,
    national_id: &str,
) -> Result<Option<PersonRow>, PersistenceError> {
    Ok(persons::table
        .filter(persons::national_id.eq(national_id))
        .filter(persons::merged_into_id.is_null())
        .first::<PersonRow>(conn)
        .optional()?)
}

/// Finds the earliest-created live person with a folded email address.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_live_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<PersonRow>, PersistenceError> {
    Ok(persons::table
        .filter(persons::email.eq(email))
        .filter(persons::merged_into_id.is_null())
        .order(persons::person_id.asc())
        .first::<PersonRow>(conn)
        .optional()?)
}

/// Lists all live (non-tombstone) persons.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_live_persons(conn: &mut SqliteConnection) -> Result<Vec<PersonRow>, PersistenceError> {
    Ok(persons::table
        .filter(persons::merged_into_id.is_null())
        .order(persons::person_id.asc())
        .load::<PersonRow>(conn)?)
}

/// Resolves a row the way ingest would, without creating anything:
/// first by national ID, then by folded email.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn reconcile_preview(
    conn: &mut SqliteConnection,
    national_id: Option<&str>,
    email: Option<&str>,
) -> Result<Option<i64>, PersistenceError> {
    if let Some(id) = national_id
        && let Some(row) = find_live_by_national_id(conn, id)?
    {
        return Ok(Some(row.person_id));
    }

    if let Some(address) = email
        && let Some(row) = find_live_by_email(conn, address)?
    {
        return Ok(Some(row.person_id));
    }

    Ok(None)
}
