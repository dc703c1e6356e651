// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Registration lookups.

use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::RegistrationRow;
use crate::diesel_schema::registrations;
use crate::error::PersistenceError;

/// Retrieves a registration by ID.
///
/// # Errors
///
/// Returns `NotFound` if no row exists.
pub fn get_registration(
    conn: &mut SqliteConnection,
    registration_id: i64,
) -> Result<RegistrationRow, PersistenceError> {
    registrations::table
        .filter(registrations::registration_id.eq(registration_id))
        .first::<RegistrationRow>(conn)
        .map_err(|_| {
            PersistenceError::NotFound(format!("Registration {registration_id} not found"))
        })
}

/// Lists the registrations of an activity in insertion order.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_for_activity(
    conn: &mut SqliteConnection,
    activity_id: i64,
) -> Result<Vec<RegistrationRow>, PersistenceError> {
    Ok(registrations::table
        .filter(registrations::activity_id.eq(activity_id))
        .order(registrations::registration_id.asc())
        .load::<RegistrationRow>(conn)?)
}

/// Lists the registrations of a person in insertion order.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_for_person(
    conn: &mut SqliteConnection,
    person_id: i64,
) -> Result<Vec<RegistrationRow>, PersistenceError> {
    Ok(registrations::table
        .filter(registrations::person_id.eq(person_id))
        .order(registrations::registration_id.asc())
        .load::<RegistrationRow>(conn)?)
}

/// Lists the registrations created by an upload batch, in file row order.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_for_batch(
    conn: &mut SqliteConnection,
    batch_id: i64,
) -> Result<Vec<RegistrationRow>, PersistenceError> {
    Ok(registrations::table
        .filter(registrations::batch_id.eq(batch_id))
        .order(registrations::row_index.asc())
        .load::<RegistrationRow>(conn)?)
}
