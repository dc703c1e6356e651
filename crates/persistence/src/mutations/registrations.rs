// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Registration store mutations: idempotent inserts and audited
//! attendance toggles.

use diesel::SqliteConnection;
use diesel::prelude::*;
use padron_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use padron_domain::{Attendance, ErrorKind, Source};
use tracing::debug;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::RegistrationRow;
use crate::diesel_schema::registrations;
use crate::error::PersistenceError;
use crate::mutations::audit::persist_audit_event;
use crate::now_rfc3339;
use crate::queries;

/// Arguments for inserting a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    pub person_id: i64,
    pub activity_id: i64,
    pub source: Source,
    pub validation_errors: Vec<ErrorKind>,
    /// All original cells of the source row, keyed by original header.
    pub extras_json: String,
    pub batch_id: Option<i64>,
    pub row_index: Option<i32>,
}

/// Inserts a registration, idempotent on `(person_id, activity_id)`.
///
/// When the pair already exists the existing registration id is returned
/// and nothing is written.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_registration(
    conn: &mut SqliteConnection,
    new: &NewRegistration,
) -> Result<(i64, bool), PersistenceError> {
    let existing: Option<i64> = registrations::table
        .filter(registrations::person_id.eq(new.person_id))
        .filter(registrations::activity_id.eq(new.activity_id))
        .select(registrations::registration_id)
        .first::<i64>(conn)
        .optional()?;

    if let Some(registration_id) = existing {
        return Ok((registration_id, false));
    }

    diesel::insert_into(registrations::table)
        .values((
            registrations::person_id.eq(new.person_id),
            registrations::activity_id.eq(new.activity_id),
            registrations::source.eq(new.source.as_str()),
            registrations::attended.eq(Attendance::Unknown.as_str()),
            registrations::validation_errors.eq(join_tags(&new.validation_errors)),
            registrations::extras_json.eq(&new.extras_json),
            registrations::batch_id.eq(new.batch_id),
            registrations::row_index.eq(new.row_index),
            registrations::created_at.eq(now_rfc3339()),
        ))
        .execute(conn)?;

    let registration_id: i64 = get_last_insert_rowid(conn)?;

    debug!(
        registration_id,
        person_id = new.person_id,
        activity_id = new.activity_id,
        source = new.source.as_str(),
        "Inserted registration"
    );

    Ok((registration_id, true))
}

/// Toggles the attendance of a registration, recording the prior value
/// and the actor in the audit log.
///
/// # Errors
///
/// Returns an error if the registration does not exist or the update
/// fails.
pub fn toggle_attendance(
    conn: &mut SqliteConnection,
    registration_id: i64,
    new_value: Attendance,
    actor: &Actor,
    cause: &Cause,
) -> Result<RegistrationRow, PersistenceError> {
    conn.transaction::<RegistrationRow, PersistenceError, _>(|conn| {
        let before: RegistrationRow =
            queries::registrations::get_registration(conn, registration_id)?;

        diesel::update(
            registrations::table.filter(registrations::registration_id.eq(registration_id)),
        )
        .set(registrations::attended.eq(new_value.as_str()))
        .execute(conn)?;

        let after: RegistrationRow =
            queries::registrations::get_registration(conn, registration_id)?;

        persist_audit_event(
            conn,
            &AuditEvent::new(
                actor.clone(),
                cause.clone(),
                Action::new(
                    String::from("ToggleAttendance"),
                    Some(format!("{} -> {}", before.attended, new_value)),
                ),
                String::from("registration"),
                registration_id,
                StateSnapshot::of(&before)?,
                StateSnapshot::of(&after)?,
            ),
        )?;

        debug!(
            registration_id,
            from = %before.attended,
            to = new_value.as_str(),
            actor = %actor.id,
            "Toggled attendance"
        );

        Ok(after)
    })
}

/// Sets attendance for every registration of an activity, atomically.
///
/// One audit event is recorded per changed registration; registrations
/// already at the target value are left untouched.
///
/// # Errors
///
/// Returns an error if any update fails; no partial application remains.
pub fn bulk_toggle_attendance(
    conn: &mut SqliteConnection,
    activity_id: i64,
    new_value: Attendance,
    actor: &Actor,
    cause: &Cause,
) -> Result<usize, PersistenceError> {
    conn.transaction::<usize, PersistenceError, _>(|conn| {
        let rows: Vec<RegistrationRow> =
            queries::registrations::list_for_activity(conn, activity_id)?;

        let mut changed: usize = 0;
        for row in rows {
            if row.attended == new_value.as_str() {
                continue;
            }
            toggle_attendance(conn, row.registration_id, new_value, actor, cause)?;
            changed += 1;
        }

        Ok(changed)
    })
}

/// Replaces the validation error tags of a registration.
///
/// Used by the row-correction path after re-validation.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn set_validation_errors(
    conn: &mut SqliteConnection,
    registration_id: i64,
    errors: &[ErrorKind],
) -> Result<(), PersistenceError> {
    diesel::update(registrations::table.filter(registrations::registration_id.eq(registration_id)))
        .set(registrations::validation_errors.eq(join_tags(errors)))
        .execute(conn)?;
    Ok(())
}

/// Renders error tags as the comma-separated form stored on the row.
#[must_use]
pub fn join_tags(errors: &[ErrorKind]) -> String {
    errors
        .iter()
        .map(|e| e.as_str())
        .collect::<Vec<&str>>()
        .join(",")
}
