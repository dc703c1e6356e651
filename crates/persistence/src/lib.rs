// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the registration registry.
//!
//! This crate provides database persistence for the person registry,
//! registrations, activities, controlled vocabularies, the duplicate
//! review queue and the audit log. It is built on Diesel with the
//! `SQLite` backend.
//!
//! ## Testing
//!
//! Tests run against unique in-memory databases; the atomic counter in
//! [`Persistence::new_in_memory`] guarantees isolation without
//! time-based names.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use diesel::SqliteConnection;
use diesel::prelude::*;
use padron::{BatchState, CandidatePair};
use padron_audit::{Actor, Cause};
use padron_domain::{Attendance, Audience, CatalogKind, ErrorKind, Source};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Atomic counter for generating unique in-memory database names.
///
/// This ensures deterministic test isolation by eliminating time-based
/// collisions. Each call to `new_in_memory()` receives a unique
/// sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{
    ActivityRow, AuditLogRow, CatalogEntryRow, MergeOutcome, PersonAttributes, PersonRow,
    QueueInsertStats, RegistrationRow, ReviewItemRow, ReviewQueueStats, RowPersistResult,
    UploadBatchRow,
};
pub use error::PersistenceError;
pub use mutations::registrations::NewRegistration;
pub use mutations::review::ReviewDecision;
pub use queries::catalog::CatalogResolution;
pub use queries::indicators::{IndicatorDimensions, IndicatorFilter, IndicatorRow};
pub use queries::review::ReviewListFilter;

/// The current time as an RFC 3339 string.
///
/// Formatting UTC with RFC 3339 cannot fail; the fallback keeps the
/// function infallible without panicking paths.
pub(crate) fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// Persistence adapter over a single `SQLite` connection.
///
/// Mutations serialize on the connection; composite operations (row
/// persistence, merges, review decisions) open their own transactions so
/// they apply atomically or not at all.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite`
    /// database.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// ensuring deterministic test isolation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name: String = format!("memdb_test_{db_id}");
        let shared_memory_url: String = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite`
    /// database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::DatabaseConnectionFailed(String::from("Invalid database path"))
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Activities
    // ========================================================================

    /// Finds or creates the activity for the given coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup or insert fails.
    pub fn get_or_create_activity(
        &mut self,
        name: &str,
        strategic_line: &str,
        year: i32,
        audience: Audience,
    ) -> Result<(i64, bool), PersistenceError> {
        mutations::activities::get_or_create_activity(
            &mut self.conn,
            name,
            strategic_line,
            year,
            audience,
        )
    }

    /// Retrieves an activity by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the activity does not exist.
    pub fn get_activity(&mut self, activity_id: i64) -> Result<ActivityRow, PersistenceError> {
        queries::activities::get_activity(&mut self.conn, activity_id)
    }

    /// Lists all activities.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_activities(&mut self) -> Result<Vec<ActivityRow>, PersistenceError> {
        queries::activities::list_activities(&mut self.conn)
    }

    // ========================================================================
    // Upload batches
    // ========================================================================

    /// Creates an upload batch record.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_upload_batch(
        &mut self,
        activity_id: i64,
        filename: &str,
        headers_json: &str,
        mapping_json: &str,
        state: BatchState,
    ) -> Result<i64, PersistenceError> {
        mutations::uploads::create_batch(
            &mut self.conn,
            activity_id,
            filename,
            headers_json,
            mapping_json,
            state,
        )
    }

    /// Advances the state of an upload batch.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the batch does not exist.
    pub fn set_batch_state(
        &mut self,
        batch_id: i64,
        state: BatchState,
        aborted_at_row: Option<i32>,
    ) -> Result<(), PersistenceError> {
        mutations::uploads::set_batch_state(&mut self.conn, batch_id, state, aborted_at_row)
    }

    /// Stamps the final counters onto a batch.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the batch does not exist.
    pub fn finalize_upload_batch(
        &mut self,
        batch_id: i64,
        row_count: i32,
        valid_count: i32,
        invalid_count: i32,
        state: BatchState,
        aborted_at_row: Option<i32>,
    ) -> Result<(), PersistenceError> {
        mutations::uploads::finalize_batch(
            &mut self.conn,
            batch_id,
            row_count,
            valid_count,
            invalid_count,
            state,
            aborted_at_row,
        )
    }

    /// Retrieves an upload batch by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the batch does not exist.
    pub fn get_upload_batch(&mut self, batch_id: i64) -> Result<UploadBatchRow, PersistenceError> {
        queries::uploads::get_batch(&mut self.conn, batch_id)
    }

    /// Lists upload batches, optionally for one activity, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_upload_batches(
        &mut self,
        activity_id: Option<i64>,
    ) -> Result<Vec<UploadBatchRow>, PersistenceError> {
        queries::uploads::list_batches(&mut self.conn, activity_id)
    }

    // ========================================================================
    // Persons & registrations
    // ========================================================================

    /// Persists one ingested row atomically: resolves the person
    /// (creating it if needed) and inserts the registration.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails; the row's work rolls back as a
    /// unit.
    #[allow(clippy::too_many_arguments)]
    pub fn persist_ingested_row(
        &mut self,
        attrs: &PersonAttributes,
        audience: Audience,
        activity_id: i64,
        source: Source,
        validation_errors: &[ErrorKind],
        extras_json: &str,
        batch_id: Option<i64>,
        row_index: Option<i32>,
        actor: &Actor,
        cause: &Cause,
    ) -> Result<RowPersistResult, PersistenceError> {
        self.conn
            .transaction::<RowPersistResult, PersistenceError, _>(|conn| {
                let (person_id, created_person) =
                    mutations::persons::reconcile_person(conn, attrs, audience, actor, cause)?;

                let new_registration: NewRegistration = NewRegistration {
                    person_id,
                    activity_id,
                    source,
                    validation_errors: validation_errors.to_vec(),
                    extras_json: extras_json.to_string(),
                    batch_id,
                    row_index,
                };
                let (registration_id, inserted_registration) =
                    mutations::registrations::insert_registration(conn, &new_registration)?;

                Ok(RowPersistResult {
                    person_id,
                    created_person,
                    registration_id,
                    inserted_registration,
                })
            })
    }

    /// Resolves a row the way ingest would, without creating anything.
    ///
    /// # Errors
    ///
    /// Returns an error if a lookup fails.
    pub fn reconcile_preview(
        &mut self,
        national_id: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<i64>, PersistenceError> {
        queries::persons::reconcile_preview(&mut self.conn, national_id, email)
    }

    /// Retrieves a person by ID, tombstone or not.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the person does not exist.
    pub fn get_person(&mut self, person_id: i64) -> Result<PersonRow, PersistenceError> {
        queries::persons::get_person(&mut self.conn, person_id)
    }

    /// Lists all live persons.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_live_persons(&mut self) -> Result<Vec<PersonRow>, PersistenceError> {
        queries::persons::list_live_persons(&mut self.conn)
    }

    /// Resolves a person id to its canonical survivor, compressing
    /// tombstone chains on the way.
    ///
    /// # Errors
    ///
    /// Returns an error if a row in the chain is missing.
    pub fn resolve_survivor(&mut self, person_id: i64) -> Result<i64, PersistenceError> {
        mutations::persons::resolve_survivor(&mut self.conn, person_id)
    }

    /// Merges the loser person into the survivor.
    ///
    /// # Errors
    ///
    /// Returns an error if a precondition fails or the transaction cannot
    /// complete.
    pub fn merge_persons(
        &mut self,
        survivor_id: i64,
        loser_id: i64,
        canonical_name: &str,
        actor: &Actor,
        cause: &Cause,
    ) -> Result<MergeOutcome, PersistenceError> {
        mutations::persons::merge_persons(
            &mut self.conn,
            survivor_id,
            loser_id,
            canonical_name,
            actor,
            cause,
        )
    }

    /// Applies a validated row correction to a person and its
    /// registration, atomically, and records the edit in the audit log.
    ///
    /// Unlike ingest-time attribute merging this overwrites: the operator
    /// explicitly supplied the corrected values.
    ///
    /// # Errors
    ///
    /// Returns an error if the person or registration does not exist or
    /// an update fails.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_row_correction(
        &mut self,
        registration_id: i64,
        attrs: &PersonAttributes,
        normalized_full_name: &str,
        validation_errors: &[ErrorKind],
        actor: &Actor,
        cause: &Cause,
    ) -> Result<RegistrationRow, PersistenceError> {
        use padron_audit::{Action, AuditEvent, StateSnapshot};

        self.conn
            .transaction::<RegistrationRow, PersistenceError, _>(|conn| {
                let registration: RegistrationRow =
                    queries::registrations::get_registration(conn, registration_id)?;
                let before: PersonRow =
                    queries::persons::get_person(conn, registration.person_id)?;

                if before.is_tombstone() {
                    return Err(PersistenceError::InvariantViolation(format!(
                        "Person {} is a tombstone",
                        registration.person_id
                    )));
                }

                diesel::update(
                    diesel_schema::persons::table
                        .filter(diesel_schema::persons::person_id.eq(registration.person_id)),
                )
                .set((
                    diesel_schema::persons::raw_full_name.eq(&attrs.raw_full_name),
                    diesel_schema::persons::normalized_full_name.eq(normalized_full_name),
                    diesel_schema::persons::national_id.eq(attrs.national_id.as_deref()),
                    diesel_schema::persons::email.eq(attrs.email.as_deref()),
                    diesel_schema::persons::career.eq(attrs.career.as_deref()),
                    diesel_schema::persons::phone.eq(attrs.phone.as_deref()),
                ))
                .execute(conn)?;

                mutations::registrations::set_validation_errors(
                    conn,
                    registration_id,
                    validation_errors,
                )?;

                let after: PersonRow = queries::persons::get_person(conn, registration.person_id)?;
                mutations::audit::persist_audit_event(
                    conn,
                    &AuditEvent::new(
                        actor.clone(),
                        cause.clone(),
                        Action::new(String::from("CorrectRow"), None),
                        String::from("person"),
                        registration.person_id,
                        StateSnapshot::of(&before)?,
                        StateSnapshot::of(&after)?,
                    ),
                )?;

                queries::registrations::get_registration(conn, registration_id)
            })
    }

    /// Retrieves a registration by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the registration does not exist.
    pub fn get_registration(
        &mut self,
        registration_id: i64,
    ) -> Result<RegistrationRow, PersistenceError> {
        queries::registrations::get_registration(&mut self.conn, registration_id)
    }

    /// Lists the registrations of an activity.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn registrations_for_activity(
        &mut self,
        activity_id: i64,
    ) -> Result<Vec<RegistrationRow>, PersistenceError> {
        queries::registrations::list_for_activity(&mut self.conn, activity_id)
    }

    /// Lists the registrations of a person.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn registrations_for_person(
        &mut self,
        person_id: i64,
    ) -> Result<Vec<RegistrationRow>, PersistenceError> {
        queries::registrations::list_for_person(&mut self.conn, person_id)
    }

    /// Lists the registrations created by an upload batch in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn registrations_for_batch(
        &mut self,
        batch_id: i64,
    ) -> Result<Vec<RegistrationRow>, PersistenceError> {
        queries::registrations::list_for_batch(&mut self.conn, batch_id)
    }

    /// Toggles the attendance of a registration with an audit record.
    ///
    /// # Errors
    ///
    /// Returns an error if the registration does not exist or the update
    /// fails.
    pub fn toggle_attendance(
        &mut self,
        registration_id: i64,
        new_value: Attendance,
        actor: &Actor,
        cause: &Cause,
    ) -> Result<RegistrationRow, PersistenceError> {
        mutations::registrations::toggle_attendance(
            &mut self.conn,
            registration_id,
            new_value,
            actor,
            cause,
        )
    }

    /// Sets attendance for every registration of an activity, atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if any update fails; nothing is applied then.
    pub fn bulk_toggle_attendance(
        &mut self,
        activity_id: i64,
        new_value: Attendance,
        actor: &Actor,
        cause: &Cause,
    ) -> Result<usize, PersistenceError> {
        mutations::registrations::bulk_toggle_attendance(
            &mut self.conn,
            activity_id,
            new_value,
            actor,
            cause,
        )
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Creates a catalog entry.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` when an entry with the same folded name exists.
    pub fn create_catalog_entry(
        &mut self,
        kind: CatalogKind,
        name: &str,
        actor: &Actor,
        cause: &Cause,
    ) -> Result<i64, PersistenceError> {
        mutations::catalog::create_entry(&mut self.conn, kind, name, actor, cause)
    }

    /// Deactivates a catalog entry without deleting it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entry does not exist.
    pub fn deactivate_catalog_entry(
        &mut self,
        entry_id: i64,
        actor: &Actor,
        cause: &Cause,
    ) -> Result<(), PersistenceError> {
        mutations::catalog::deactivate_entry(&mut self.conn, entry_id, actor, cause)
    }

    /// Upserts a reconciliation mapping from an unknown value to an
    /// entry.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the target entry does not exist.
    pub fn map_unknown_value(
        &mut self,
        kind: CatalogKind,
        unknown_value: &str,
        canonical_id: i64,
        actor: &Actor,
        cause: &Cause,
    ) -> Result<i64, PersistenceError> {
        mutations::catalog::map_unknown(
            &mut self.conn,
            kind,
            unknown_value,
            canonical_id,
            actor,
            cause,
        )
    }

    /// Lists catalog entries of a kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_catalog_entries(
        &mut self,
        kind: CatalogKind,
        include_inactive: bool,
    ) -> Result<Vec<CatalogEntryRow>, PersistenceError> {
        queries::catalog::list_entries(&mut self.conn, kind, include_inactive)
    }

    /// Resolves a free-text value against a catalog kind.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn resolve_catalog_value(
        &mut self,
        kind: CatalogKind,
        value: &str,
    ) -> Result<CatalogResolution, PersistenceError> {
        queries::catalog::resolve(&mut self.conn, kind, value)
    }

    // ========================================================================
    // Review queue
    // ========================================================================

    /// Appends candidate pairs to the review queue.
    ///
    /// # Errors
    ///
    /// Returns an error if an insert fails.
    pub fn insert_review_candidates(
        &mut self,
        candidates: &[CandidatePair],
    ) -> Result<QueueInsertStats, PersistenceError> {
        mutations::review::insert_candidates(&mut self.conn, candidates)
    }

    /// All pairs currently in the queue, as the detector's skip set.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn existing_review_pairs(
        &mut self,
    ) -> Result<std::collections::HashSet<(i64, i64)>, PersistenceError> {
        queries::review::all_pairs(&mut self.conn)
    }

    /// Retrieves a review item by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the item does not exist.
    pub fn get_review_item(&mut self, item_id: i64) -> Result<ReviewItemRow, PersistenceError> {
        queries::review::get_item(&mut self.conn, item_id)
    }

    /// Lists review items with stable pagination; returns the page and
    /// the total match count.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn list_review_items(
        &mut self,
        filter: &ReviewListFilter,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<ReviewItemRow>, i64), PersistenceError> {
        queries::review::list_items(&mut self.conn, filter, page, limit)
    }

    /// Counts review items per status.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn review_queue_stats(
        &mut self,
        audience: Option<Audience>,
    ) -> Result<ReviewQueueStats, PersistenceError> {
        queries::review::stats(&mut self.conn, audience)
    }

    /// Applies a decision to a pending review item.
    ///
    /// # Errors
    ///
    /// * `InvariantViolation` - the item is not pending or the survivor
    ///   is not part of the pair
    /// * `Conflict` - a concurrent decision won; re-read and retry
    pub fn decide_review_item(
        &mut self,
        item_id: i64,
        expected_version: i32,
        decision: &ReviewDecision,
        decided_by: &str,
        cause: &Cause,
    ) -> Result<ReviewItemRow, PersistenceError> {
        mutations::review::decide_item(
            &mut self.conn,
            item_id,
            expected_version,
            decision,
            decided_by,
            cause,
        )
    }

    // ========================================================================
    // Indicators & audit
    // ========================================================================

    /// Computes participation indicators.
    ///
    /// # Errors
    ///
    /// Returns an error if the source query fails.
    pub fn indicators(
        &mut self,
        dimensions: IndicatorDimensions,
        filter: IndicatorFilter,
    ) -> Result<Vec<IndicatorRow>, PersistenceError> {
        queries::indicators::query(&mut self.conn, dimensions, filter)
    }

    /// Lists the audit trail of an entity, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn audit_for_entity(
        &mut self,
        entity: &str,
        entity_id: i64,
    ) -> Result<Vec<AuditLogRow>, PersistenceError> {
        queries::audit::list_for_entity(&mut self.conn, entity, entity_id)
    }

    /// Counts all audit events.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_audit_events(&mut self) -> Result<i64, PersistenceError> {
        queries::audit::count_events(&mut self.conn)
    }
}
