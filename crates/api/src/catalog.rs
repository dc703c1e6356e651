// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog operations.

use padron_audit::{Actor, Cause};
use padron_domain::CatalogKind;
use padron_persistence::{CatalogEntryRow, CatalogResolution, Persistence, PersistenceError};

use crate::error::{ApiError, translate_persistence_error};

/// Lists the entries of a catalog kind.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_entries(
    persistence: &mut Persistence,
    kind: CatalogKind,
    include_inactive: bool,
) -> Result<Vec<CatalogEntryRow>, ApiError> {
    persistence
        .list_catalog_entries(kind, include_inactive)
        .map_err(translate_persistence_error)
}

/// Creates a catalog entry; names are unique per kind under folding.
///
/// # Errors
///
/// Returns an invalid-input error when the name already exists.
pub fn create_entry(
    persistence: &mut Persistence,
    kind: CatalogKind,
    name: &str,
    actor: &str,
) -> Result<i64, ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("name"),
            message: String::from("Catalog entry name must not be empty"),
        });
    }

    let cause: Cause = Cause::new(
        format!("catalog-{kind}"),
        String::from("Catalog entry creation"),
    );

    persistence
        .create_catalog_entry(kind, name, &Actor::operator(actor), &cause)
        .map_err(|err| match err {
            PersistenceError::Conflict(message) => ApiError::InvalidInput {
                field: String::from("name"),
                message,
            },
            other => translate_persistence_error(other),
        })
}

/// Deactivates a catalog entry, hiding it from resolution without
/// deleting it.
///
/// # Errors
///
/// Returns a not-found error when the entry does not exist.
pub fn deactivate_entry(
    persistence: &mut Persistence,
    entry_id: i64,
    actor: &str,
) -> Result<(), ApiError> {
    let cause: Cause = Cause::new(
        format!("catalog-entry-{entry_id}"),
        String::from("Catalog entry deactivation"),
    );

    persistence
        .deactivate_catalog_entry(entry_id, &Actor::operator(actor), &cause)
        .map_err(translate_persistence_error)
}

/// Maps an unknown free-text value to a catalog entry so later ingests
/// resolve it silently.
///
/// # Errors
///
/// Returns a not-found error when the target entry does not exist.
pub fn map_unknown(
    persistence: &mut Persistence,
    kind: CatalogKind,
    unknown_value: &str,
    canonical_id: i64,
    actor: &str,
) -> Result<i64, ApiError> {
    let cause: Cause = Cause::new(
        format!("catalog-{kind}"),
        String::from("Reconciliation mapping"),
    );

    persistence
        .map_unknown_value(
            kind,
            unknown_value,
            canonical_id,
            &Actor::operator(actor),
            &cause,
        )
        .map_err(translate_persistence_error)
}

/// Resolves a free-text value against a catalog kind.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn resolve(
    persistence: &mut Persistence,
    kind: CatalogKind,
    value: &str,
) -> Result<CatalogResolution, ApiError> {
    persistence
        .resolve_catalog_value(kind, value)
        .map_err(translate_persistence_error)
}
