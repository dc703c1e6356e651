// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Person registry mutations: creation, non-destructive attribute merge,
//! and the person merge that consolidates duplicate identities.

use diesel::SqliteConnection;
use diesel::prelude::*;
use padron_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use padron_domain::Audience;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{MergeOutcome, PersonAttributes, PersonRow, RegistrationRow};
use crate::diesel_schema::{persons, registrations};
use crate::error::PersistenceError;
use crate::mutations::audit::persist_audit_event;
use crate::now_rfc3339;
use crate::queries;

/// Creates a new person and records the creation in the audit log.
///
/// # Errors
///
/// Returns an error if the insert or audit write fails.
pub fn create_person(
    conn: &mut SqliteConnection,
    attrs: &PersonAttributes,
    audience: Audience,
    actor: &Actor,
    cause: &Cause,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(persons::table)
        .values((
            persons::raw_full_name.eq(&attrs.raw_full_name),
            persons::normalized_full_name.eq(&attrs.normalized_full_name),
            persons::national_id.eq(attrs.national_id.as_deref()),
            persons::email.eq(attrs.email.as_deref()),
            persons::career.eq(attrs.career.as_deref()),
            persons::phone.eq(attrs.phone.as_deref()),
            persons::audience.eq(audience.as_str()),
            persons::name_history.eq("[]"),
            persons::created_at.eq(now_rfc3339()),
        ))
        .execute(conn)?;

    let person_id: i64 = get_last_insert_rowid(conn)?;

    let after: PersonRow = queries::persons::get_person(conn, person_id)?;
    persist_audit_event(
        conn,
        &AuditEvent::new(
            actor.clone(),
            cause.clone(),
            Action::new(String::from("CreatePerson"), None),
            String::from("person"),
            person_id,
            StateSnapshot::empty(),
            StateSnapshot::of(&after)?,
        ),
    )?;

    debug!(person_id, audience = audience.as_str(), "Created person");

    Ok(person_id)
}

/// Fills empty attributes of an existing person from incoming values.
///
/// Never overwrites a non-empty attribute. A differing raw name is
/// appended to the person's name history instead of replacing the stored
/// one.
///
/// # Errors
///
/// Returns an error if the person does not exist or the update fails.
pub fn merge_missing_attributes(
    conn: &mut SqliteConnection,
    person_id: i64,
    attrs: &PersonAttributes,
) -> Result<(), PersistenceError> {
    let existing: PersonRow = queries::persons::get_person(conn, person_id)?;

    let national_id: Option<String> = keep_or_fill(&existing.national_id, &attrs.national_id);
    let email: Option<String> = keep_or_fill(&existing.email, &attrs.email);
    let career: Option<String> = keep_or_fill(&existing.career, &attrs.career);
    let phone: Option<String> = keep_or_fill(&existing.phone, &attrs.phone);

    let mut history: Vec<String> = serde_json::from_str(&existing.name_history)?;
    if !attrs.raw_full_name.is_empty()
        && attrs.raw_full_name != existing.raw_full_name
        && !history.contains(&attrs.raw_full_name)
    {
        history.push(attrs.raw_full_name.clone());
    }
    let history_json: String = serde_json::to_string(&history)?;

    diesel::update(persons::table.filter(persons::person_id.eq(person_id)))
        .set((
            persons::national_id.eq(national_id.as_deref()),
            persons::email.eq(email.as_deref()),
            persons::career.eq(career.as_deref()),
            persons::phone.eq(phone.as_deref()),
            persons::name_history.eq(&history_json),
        ))
        .execute(conn)?;

    Ok(())
}

/// Resolves a person to the canonical survivor, following the
/// `merged_into_id` chain. Intermediate tombstones are re-pointed
/// directly at the final survivor so later reads take one hop.
///
/// # Errors
///
/// Returns an error if any row in the chain is missing.
pub fn resolve_survivor(
    conn: &mut SqliteConnection,
    person_id: i64,
) -> Result<i64, PersistenceError> {
    let mut current: i64 = person_id;
    let mut visited: Vec<i64> = Vec::new();

    loop {
        let merged_into: Option<i64> = persons::table
            .filter(persons::person_id.eq(current))
            .select(persons::merged_into_id)
            .first::<Option<i64>>(conn)
            .map_err(|_| PersistenceError::NotFound(format!("Person {current} not found")))?;

        match merged_into {
            Some(next) => {
                visited.push(current);
                current = next;
            }
            None => break,
        }
    }

    if visited.len() > 1 {
        diesel::update(persons::table.filter(persons::person_id.eq_any(&visited)))
            .set(persons::merged_into_id.eq(current))
            .execute(conn)?;
    }

    Ok(current)
}

/// Resolves a row to a person id, creating the person when neither the
/// national ID nor the email matches a live row.
///
/// Lookup order: exact national ID first, then exact folded email. A hit
/// also back-fills the person's missing attributes from the row.
///
/// # Errors
///
/// Returns an error if a lookup, insert or update fails.
pub fn reconcile_person(
    conn: &mut SqliteConnection,
    attrs: &PersonAttributes,
    audience: Audience,
    actor: &Actor,
    cause: &Cause,
) -> Result<(i64, bool), PersistenceError> {
    if let Some(national_id) = &attrs.national_id
        && let Some(row) = queries::persons::find_live_by_national_id(conn, national_id)?
    {
        merge_missing_attributes(conn, row.person_id, attrs)?;
        return Ok((row.person_id, false));
    }

    if let Some(email) = &attrs.email
        && let Some(row) = queries::persons::find_live_by_email(conn, email)?
    {
        merge_missing_attributes(conn, row.person_id, attrs)?;
        return Ok((row.person_id, false));
    }

    let person_id: i64 = create_person(conn, attrs, audience, actor, cause)?;
    Ok((person_id, true))
}

/// Merges the loser person into the survivor, atomically.
///
/// 1. Both must be live and distinct.
/// 2. Loser registrations move to the survivor; duplicates per activity
///    are dropped.
/// 3. The survivor inherits the loser's attributes non-destructively.
/// 4. The survivor's canonical name is stamped.
/// 5. The loser becomes a tombstone with its contact attributes cleared;
///    its names and name history remain for the audit trail.
/// 6. An audit event with before/after snapshots of both rows is written.
///
/// # Errors
///
/// Returns [`PersistenceError::InvariantViolation`] when a precondition
/// fails, or a database error; either way the transaction rolls back.
pub fn merge_persons(
    conn: &mut SqliteConnection,
    survivor_id: i64,
    loser_id: i64,
    canonical_name: &str,
    actor: &Actor,
    cause: &Cause,
) -> Result<MergeOutcome, PersistenceError> {
    conn.transaction::<MergeOutcome, PersistenceError, _>(|conn| {
        if survivor_id == loser_id {
            return Err(PersistenceError::InvariantViolation(format!(
                "Cannot merge person {survivor_id} into itself"
            )));
        }

        let survivor: PersonRow = queries::persons::get_person(conn, survivor_id)?;
        let loser: PersonRow = queries::persons::get_person(conn, loser_id)?;

        if survivor.is_tombstone() {
            return Err(PersistenceError::InvariantViolation(format!(
                "Survivor {survivor_id} is a tombstone"
            )));
        }
        if loser.is_tombstone() {
            return Err(PersistenceError::InvariantViolation(format!(
                "Loser {loser_id} is a tombstone"
            )));
        }

        let before: StateSnapshot = StateSnapshot::of(&(&survivor, &loser))?;

        // Re-point or drop the loser's registrations.
        let survivor_activities: HashSet<i64> = registrations::table
            .filter(registrations::person_id.eq(survivor_id))
            .select(registrations::activity_id)
            .load::<i64>(conn)?
            .into_iter()
            .collect();

        let loser_registrations: Vec<RegistrationRow> = registrations::table
            .filter(registrations::person_id.eq(loser_id))
            .order(registrations::registration_id.asc())
            .load::<RegistrationRow>(conn)?;

        let mut moved: usize = 0;
        let mut dropped: usize = 0;
        for registration in &loser_registrations {
            if survivor_activities.contains(&registration.activity_id) {
                diesel::delete(
                    registrations::table
                        .filter(registrations::registration_id.eq(registration.registration_id)),
                )
                .execute(conn)?;
                dropped += 1;
            } else {
                diesel::update(
                    registrations::table
                        .filter(registrations::registration_id.eq(registration.registration_id)),
                )
                .set(registrations::person_id.eq(survivor_id))
                .execute(conn)?;
                moved += 1;
            }
        }

        // Survivor inherits missing attributes, except the national ID:
        // filling it here would collide with the loser's own row until the
        // tombstone clears it below, so it is transferred separately.
        let inherited: PersonAttributes = PersonAttributes {
            raw_full_name: loser.raw_full_name.clone(),
            normalized_full_name: loser.normalized_full_name.clone(),
            national_id: None,
            email: loser.email.clone(),
            career: loser.career.clone(),
            phone: loser.phone.clone(),
        };

        // Tombstone the loser first so the partial unique index on
        // national_id frees the value for the survivor.
        diesel::update(persons::table.filter(persons::person_id.eq(loser_id)))
            .set((
                persons::merged_into_id.eq(survivor_id),
                persons::national_id.eq(None::<String>),
                persons::email.eq(None::<String>),
                persons::career.eq(None::<String>),
                persons::phone.eq(None::<String>),
                persons::canonical_full_name.eq(None::<String>),
            ))
            .execute(conn)?;

        merge_missing_attributes(conn, survivor_id, &inherited)?;

        if survivor.national_id.is_none()
            && let Some(national_id) = &loser.national_id
        {
            diesel::update(persons::table.filter(persons::person_id.eq(survivor_id)))
                .set(persons::national_id.eq(national_id))
                .execute(conn)?;
        }

        diesel::update(persons::table.filter(persons::person_id.eq(survivor_id)))
            .set(persons::canonical_full_name.eq(canonical_name))
            .execute(conn)?;

        let survivor_after: PersonRow = queries::persons::get_person(conn, survivor_id)?;
        let loser_after: PersonRow = queries::persons::get_person(conn, loser_id)?;
        let after: StateSnapshot = StateSnapshot::of(&(&survivor_after, &loser_after))?;

        let audit_event_id: i64 = persist_audit_event(
            conn,
            &AuditEvent::new(
                actor.clone(),
                cause.clone(),
                Action::new(
                    String::from("MergePersons"),
                    Some(format!("survivor={survivor_id} loser={loser_id}")),
                ),
                String::from("person"),
                survivor_id,
                before,
                after,
            ),
        )?;

        info!(
            survivor_id,
            loser_id, moved, dropped, "Merged duplicate persons"
        );

        Ok(MergeOutcome {
            survivor_id,
            loser_id,
            moved_registrations: moved,
            dropped_registrations: dropped,
            audit_event_id,
        })
    })
}

fn keep_or_fill(existing: &Option<String>, incoming: &Option<String>) -> Option<String> {
    match existing {
        Some(value) if !value.is_empty() => Some(value.clone()),
        _ => incoming.clone().filter(|value| !value.is_empty()),
    }
}
