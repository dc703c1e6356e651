// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit log writes.

use diesel::prelude::*;
use diesel::SqliteConnection;
use padron_audit::AuditEvent;
use tracing::debug;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::audit_log;
use crate::error::PersistenceError;
use crate::now_rfc3339;

/// Persists an audit event and returns its assigned event ID.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn persist_audit_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(audit_log::table)
        .values((
            audit_log::actor_id.eq(&event.actor.id),
            audit_log::actor_type.eq(&event.actor.actor_type),
            audit_log::cause_id.eq(&event.cause.id),
            audit_log::cause_description.eq(&event.cause.description),
            audit_log::action_name.eq(&event.action.name),
            audit_log::action_details.eq(event.action.details.as_deref()),
            audit_log::entity.eq(&event.entity),
            audit_log::entity_id.eq(event.entity_id),
            audit_log::before_json.eq(&event.before.data),
            audit_log::after_json.eq(&event.after.data),
            audit_log::created_at.eq(now_rfc3339()),
        ))
        .execute(conn)?;

    let event_id: i64 = get_last_insert_rowid(conn)?;

    debug!(
        event_id,
        action = %event.action.name,
        entity = %event.entity,
        entity_id = event.entity_id,
        "Persisted audit event"
    );

    Ok(event_id)
}
