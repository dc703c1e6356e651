// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog lookups and name resolution.

use diesel::SqliteConnection;
use diesel::prelude::*;
use padron_domain::{CatalogKind, fold};

use crate::data_models::CatalogEntryRow;
use crate::diesel_schema::{catalog_entries, reconciliation_mappings};
use crate::error::PersistenceError;

/// The result of resolving a free-text value against a catalog kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogResolution {
    /// The value matched an active entry by fold.
    Matched(CatalogEntryRow),
    /// The value resolved through a reconciliation mapping.
    Mapped(CatalogEntryRow),
    /// The value is unknown to the catalog.
    Unknown,
}

impl CatalogResolution {
    /// The resolved entry, if any.
    #[must_use]
    pub const fn entry(&self) -> Option<&CatalogEntryRow> {
        match self {
            Self::Matched(entry) | Self::Mapped(entry) => Some(entry),
            Self::Unknown => None,
        }
    }
}

/// Retrieves a catalog entry by ID.
///
/// # Errors
///
/// Returns `NotFound` if no row exists.
pub fn get_entry(
    conn: &mut SqliteConnection,
    entry_id: i64,
) -> Result<CatalogEntryRow, PersistenceError> {
    catalog_entries::table
        .filter(catalog_entries::entry_id.eq(entry_id))
        .first::<CatalogEntryRow>(conn)
        .map_err(|_| PersistenceError::NotFound(format!("Catalog entry {entry_id} not found")))
}

/// Lists the entries of a kind, ordered by name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_entries(
    conn: &mut SqliteConnection,
    kind: CatalogKind,
    include_inactive: bool,
) -> Result<Vec<CatalogEntryRow>, PersistenceError> {
    let mut query = catalog_entries::table
        .filter(catalog_entries::kind.eq(kind.as_str()))
        .into_boxed();

    if !include_inactive {
        query = query.filter(catalog_entries::active.eq(1));
    }

    Ok(query
        .order(catalog_entries::name.asc())
        .load::<CatalogEntryRow>(conn)?)
}

/// Resolves a free-text value against a catalog kind.
///
/// Resolution order: exact fold match on active entries, then the
/// reconciliation mapping table, then `Unknown`. Mapped resolutions may
/// point at inactive entries; the caller sees the `active` flag on the
/// returned row.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn resolve(
    conn: &mut SqliteConnection,
    kind: CatalogKind,
    value: &str,
) -> Result<CatalogResolution, PersistenceError> {
    let folded: String = fold(value);
    if folded.is_empty() {
        return Ok(CatalogResolution::Unknown);
    }

    let matched: Option<CatalogEntryRow> = catalog_entries::table
        .filter(catalog_entries::kind.eq(kind.as_str()))
        .filter(catalog_entries::folded_name.eq(&folded))
        .filter(catalog_entries::active.eq(1))
        .first::<CatalogEntryRow>(conn)
        .optional()?;

    if let Some(entry) = matched {
        return Ok(CatalogResolution::Matched(entry));
    }

    let mapped_id: Option<i64> = reconciliation_mappings::table
        .filter(reconciliation_mappings::kind.eq(kind.as_str()))
        .filter(reconciliation_mappings::unknown_value.eq(&folded))
        .select(reconciliation_mappings::canonical_id)
        .first::<i64>(conn)
        .optional()?;

    match mapped_id {
        Some(entry_id) => Ok(CatalogResolution::Mapped(get_entry(conn, entry_id)?)),
        None => Ok(CatalogResolution::Unknown),
    }
}
