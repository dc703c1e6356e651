// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Controlled vocabulary mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use padron_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use padron_domain::{CatalogKind, fold};
use tracing::debug;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::CatalogEntryRow;
use crate::diesel_schema::{catalog_entries, reconciliation_mappings};
use crate::error::PersistenceError;
use crate::mutations::audit::persist_audit_event;
use crate::now_rfc3339;
use crate::queries;

/// Creates a catalog entry. Creation is case- and accent-insensitive
/// unique per kind.
///
/// # Errors
///
/// Returns [`PersistenceError::Conflict`] when an entry with the same
/// folded name already exists for the kind.
pub fn create_entry(
    conn: &mut SqliteConnection,
    kind: CatalogKind,
    name: &str,
    actor: &Actor,
    cause: &Cause,
) -> Result<i64, PersistenceError> {
    let folded: String = fold(name);

    let existing: Option<i64> = catalog_entries::table
        .filter(catalog_entries::kind.eq(kind.as_str()))
        .filter(catalog_entries::folded_name.eq(&folded))
        .select(catalog_entries::entry_id)
        .first::<i64>(conn)
        .optional()?;

    if existing.is_some() {
        return Err(PersistenceError::Conflict(format!(
            "Catalog entry '{name}' already exists for kind {kind}"
        )));
    }

    diesel::insert_into(catalog_entries::table)
        .values((
            catalog_entries::kind.eq(kind.as_str()),
            catalog_entries::name.eq(name),
            catalog_entries::folded_name.eq(&folded),
            catalog_entries::active.eq(1),
            catalog_entries::created_at.eq(now_rfc3339()),
        ))
        .execute(conn)?;

    let entry_id: i64 = get_last_insert_rowid(conn)?;

    let after: CatalogEntryRow = queries::catalog::get_entry(conn, entry_id)?;
    persist_audit_event(
        conn,
        &AuditEvent::new(
            actor.clone(),
            cause.clone(),
            Action::new(String::from("CreateCatalogEntry"), None),
            String::from("catalog_entry"),
            entry_id,
            StateSnapshot::empty(),
            StateSnapshot::of(&after)?,
        ),
    )?;

    debug!(entry_id, kind = kind.as_str(), name, "Created catalog entry");

    Ok(entry_id)
}

/// Deactivates a catalog entry. The entry is hidden from resolution but
/// never deleted.
///
/// # Errors
///
/// Returns `NotFound` if the entry does not exist.
pub fn deactivate_entry(
    conn: &mut SqliteConnection,
    entry_id: i64,
    actor: &Actor,
    cause: &Cause,
) -> Result<(), PersistenceError> {
    let before: CatalogEntryRow = queries::catalog::get_entry(conn, entry_id)?;

    diesel::update(catalog_entries::table.filter(catalog_entries::entry_id.eq(entry_id)))
        .set(catalog_entries::active.eq(0))
        .execute(conn)?;

    let after: CatalogEntryRow = queries::catalog::get_entry(conn, entry_id)?;
    persist_audit_event(
        conn,
        &AuditEvent::new(
            actor.clone(),
            cause.clone(),
            Action::new(String::from("DeactivateCatalogEntry"), None),
            String::from("catalog_entry"),
            entry_id,
            StateSnapshot::of(&before)?,
            StateSnapshot::of(&after)?,
        ),
    )?;

    debug!(entry_id, "Deactivated catalog entry");

    Ok(())
}

/// Upserts a reconciliation mapping from an unknown value to a catalog
/// entry. Subsequent ingests resolve the value silently.
///
/// # Errors
///
/// Returns `NotFound` when the target entry does not exist, or a database
/// error.
pub fn map_unknown(
    conn: &mut SqliteConnection,
    kind: CatalogKind,
    unknown_value: &str,
    canonical_id: i64,
    actor: &Actor,
    cause: &Cause,
) -> Result<i64, PersistenceError> {
    // The target must exist; the foreign key would also catch this, but a
    // NotFound reads better than a constraint failure.
    let target: CatalogEntryRow = queries::catalog::get_entry(conn, canonical_id)?;
    let folded_unknown: String = fold(unknown_value);

    let existing: Option<i64> = reconciliation_mappings::table
        .filter(reconciliation_mappings::kind.eq(kind.as_str()))
        .filter(reconciliation_mappings::unknown_value.eq(&folded_unknown))
        .select(reconciliation_mappings::mapping_id)
        .first::<i64>(conn)
        .optional()?;

    let mapping_id: i64 = if let Some(mapping_id) = existing {
        diesel::update(
            reconciliation_mappings::table
                .filter(reconciliation_mappings::mapping_id.eq(mapping_id)),
        )
        .set(reconciliation_mappings::canonical_id.eq(canonical_id))
        .execute(conn)?;
        mapping_id
    } else {
        diesel::insert_into(reconciliation_mappings::table)
            .values((
                reconciliation_mappings::kind.eq(kind.as_str()),
                reconciliation_mappings::unknown_value.eq(&folded_unknown),
                reconciliation_mappings::canonical_id.eq(canonical_id),
                reconciliation_mappings::created_at.eq(now_rfc3339()),
            ))
            .execute(conn)?;
        get_last_insert_rowid(conn)?
    };

    persist_audit_event(
        conn,
        &AuditEvent::new(
            actor.clone(),
            cause.clone(),
            Action::new(
                String::from("MapUnknownValue"),
                Some(format!("'{unknown_value}' -> '{}'", target.name)),
            ),
            String::from("reconciliation_mapping"),
            mapping_id,
            StateSnapshot::empty(),
            StateSnapshot::of(&(kind.as_str(), &folded_unknown, canonical_id))?,
        ),
    )?;

    debug!(
        mapping_id,
        kind = kind.as_str(),
        unknown_value,
        canonical_id,
        "Mapped unknown catalog value"
    );

    Ok(mapping_id)
}
