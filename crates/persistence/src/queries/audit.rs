// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit log reads.

use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::AuditLogRow;
use crate::diesel_schema::audit_log;
use crate::error::PersistenceError;

/// Lists the audit trail of an entity, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_for_entity(
    conn: &mut SqliteConnection,
    entity: &str,
    entity_id: i64,
) -> Result<Vec<AuditLogRow>, PersistenceError> {
    Ok(audit_log::table
        .filter(audit_log::entity.eq(entity))
        .filter(audit_log::entity_id.eq(entity_id))
        .order(audit_log::event_id.desc())
        .load::<AuditLogRow>(conn)?)
}

/// Counts all audit events.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_events(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(audit_log::table.count().get_result::<i64>(conn)?)
}
