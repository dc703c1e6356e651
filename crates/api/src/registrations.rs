// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Registration operations: attendance toggles, walk-in registration,
//! reconcile preview and administrative row correction.

use std::str::FromStr;

use padron::IngestConfig;
use padron_audit::{Actor, Cause};
use padron_domain::{Attendance, Audience, RawRow, Source, validate_row};
use padron_persistence::{
    ActivityRow, Persistence, PersonAttributes, RegistrationRow, RowPersistResult,
};
use tracing::info;

use crate::error::{ApiError, translate_persistence_error};
use crate::ingest::person_attributes;

/// Sets the attendance of a registration, recording the prior value and
/// the actor in the audit log.
///
/// # Errors
///
/// Returns an error if the registration does not exist.
pub fn toggle_attendance(
    persistence: &mut Persistence,
    registration_id: i64,
    new_value: Attendance,
    actor: &str,
) -> Result<RegistrationRow, ApiError> {
    let cause: Cause = Cause::new(
        format!("registration-{registration_id}"),
        String::from("Attendance toggle"),
    );

    persistence
        .toggle_attendance(
            registration_id,
            new_value,
            &Actor::operator(actor),
            &cause,
        )
        .map_err(translate_persistence_error)
}

/// Sets attendance for every registration of an activity, atomically.
///
/// # Errors
///
/// Returns an error if the activity does not exist or any update fails;
/// nothing is applied then.
pub fn bulk_toggle_attendance(
    persistence: &mut Persistence,
    activity_id: i64,
    new_value: Attendance,
    actor: &str,
) -> Result<usize, ApiError> {
    // Surface a missing activity as not-found rather than a zero count.
    persistence
        .get_activity(activity_id)
        .map_err(translate_persistence_error)?;

    let cause: Cause = Cause::new(
        format!("activity-{activity_id}"),
        String::from("Bulk attendance toggle"),
    );

    persistence
        .bulk_toggle_attendance(activity_id, new_value, &Actor::operator(actor), &cause)
        .map_err(translate_persistence_error)
}

/// Previews identity resolution for a row without creating anything.
///
/// Used by walk-in attendance to decide whether the person is already
/// known.
///
/// # Errors
///
/// Returns an error if a lookup fails.
pub fn reconcile_preview(
    persistence: &mut Persistence,
    row: &RawRow,
    config: &IngestConfig,
) -> Result<Option<i64>, ApiError> {
    let (normalized, _) = validate_row(row, &config.institution_email_suffixes);
    let attrs: PersonAttributes = person_attributes(&normalized);

    persistence
        .reconcile_preview(attrs.national_id.as_deref(), attrs.email.as_deref())
        .map_err(translate_persistence_error)
}

/// Registers a walk-in: a registration created at attendance time
/// without a prior CSV row.
///
/// The row runs through the same validation and reconcile path as an
/// ingested row; the person's audience comes from the activity.
///
/// # Errors
///
/// Returns an error if the activity does not exist or persistence fails.
pub fn register_walk_in(
    persistence: &mut Persistence,
    activity_id: i64,
    row: &RawRow,
    actor: &str,
) -> Result<RowPersistResult, ApiError> {
    register_walk_in_with_config(persistence, activity_id, row, actor, &IngestConfig::default())
}

/// [`register_walk_in`] with an explicit configuration (email suffix
/// list).
///
/// # Errors
///
/// Returns an error if the activity does not exist or persistence fails.
pub fn register_walk_in_with_config(
    persistence: &mut Persistence,
    activity_id: i64,
    row: &RawRow,
    actor: &str,
    config: &IngestConfig,
) -> Result<RowPersistResult, ApiError> {
    let activity: ActivityRow = persistence
        .get_activity(activity_id)
        .map_err(translate_persistence_error)?;
    let audience: Audience =
        Audience::from_str(&activity.audience).map_err(|e| ApiError::Internal {
            message: format!("Stored audience is invalid: {e}"),
        })?;

    let (normalized, errors) = validate_row(row, &config.institution_email_suffixes);
    let attrs: PersonAttributes = person_attributes(&normalized);

    let cause: Cause = Cause::new(
        format!("activity-{activity_id}"),
        String::from("Walk-in registration"),
    );

    let result: RowPersistResult = persistence
        .persist_ingested_row(
            &attrs,
            audience,
            activity_id,
            Source::WalkIn,
            &errors,
            "{}",
            None,
            None,
            &Actor::operator(actor),
            &cause,
        )
        .map_err(translate_persistence_error)?;

    info!(
        activity_id,
        person_id = result.person_id,
        created = result.created_person,
        "Registered walk-in"
    );

    Ok(result)
}

/// Corrects the canonical fields of an ingested row.
///
/// The corrected values run through the same validator as ingest; the
/// person's attributes are overwritten with the corrected values, the
/// registration's error tags are replaced, and the edit is audited.
///
/// # Errors
///
/// Returns an error if the registration does not exist, the person is a
/// tombstone, or an update fails.
pub fn correct_row(
    persistence: &mut Persistence,
    registration_id: i64,
    corrected: &RawRow,
    actor: &str,
    config: &IngestConfig,
) -> Result<RegistrationRow, ApiError> {
    let (normalized, errors) = validate_row(corrected, &config.institution_email_suffixes);
    let attrs: PersonAttributes = person_attributes(&normalized);

    let cause: Cause = Cause::new(
        format!("registration-{registration_id}"),
        String::from("Administrative row correction"),
    );

    persistence
        .apply_row_correction(
            registration_id,
            &attrs,
            &normalized.normalized_full_name,
            &errors,
            &Actor::operator(actor),
            &cause,
        )
        .map_err(translate_persistence_error)
}
