// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Review queue mutations.
//!
//! Items enter as `pending` and leave through exactly one terminal
//! transition. Decisions use optimistic concurrency on the item version:
//! a concurrent decision observes zero affected rows and surfaces a
//! conflict the caller resolves by re-reading.

use diesel::SqliteConnection;
use diesel::prelude::*;
use padron::CandidatePair;
use padron_audit::{Actor, Cause};
use padron_domain::ReviewStatus;
use tracing::{debug, info};

use crate::data_models::{QueueInsertStats, ReviewItemRow};
use crate::diesel_schema::review_items;
use crate::error::PersistenceError;
use crate::mutations::persons::merge_persons;
use crate::now_rfc3339;
use crate::queries;

/// A decision applied to a pending item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    /// Merge the pair; the named person survives under the given
    /// canonical name.
    Accept {
        /// The surviving person; must be one of the pair.
        canonical_person_id: i64,
        /// The display name stamped onto the survivor.
        canonical_name: String,
    },
    /// The pair are distinct persons.
    Reject,
    /// No verdict.
    Skip,
}

/// Appends candidate pairs to the queue as pending items.
///
/// Pairs already present (any status) are left untouched, which is what
/// makes re-detection idempotent.
///
/// # Errors
///
/// Returns an error if an insert fails.
pub fn insert_candidates(
    conn: &mut SqliteConnection,
    candidates: &[CandidatePair],
) -> Result<QueueInsertStats, PersistenceError> {
    let mut stats: QueueInsertStats = QueueInsertStats {
        offered: candidates.len(),
        inserted: 0,
    };

    for candidate in candidates {
        let exists: Option<i64> = review_items::table
            .filter(review_items::left_person_id.eq(candidate.left_id))
            .filter(review_items::right_person_id.eq(candidate.right_id))
            .select(review_items::item_id)
            .first::<i64>(conn)
            .optional()?;

        if exists.is_some() {
            continue;
        }

        diesel::insert_into(review_items::table)
            .values((
                review_items::left_person_id.eq(candidate.left_id),
                review_items::right_person_id.eq(candidate.right_id),
                review_items::audience.eq(candidate.audience.as_str()),
                review_items::similarity.eq(candidate.similarity),
                review_items::status.eq(ReviewStatus::Pending.as_str()),
                review_items::version.eq(0),
                review_items::created_at.eq(now_rfc3339()),
            ))
            .execute(conn)?;
        stats.inserted += 1;
    }

    info!(
        offered = stats.offered,
        inserted = stats.inserted,
        "Enqueued duplicate candidates"
    );

    Ok(stats)
}

/// Applies a decision to a pending item, atomically.
///
/// For `Accept` the person merge runs inside the same transaction; if it
/// fails the item stays pending. The optimistic version check guards
/// against a concurrent decision.
///
/// # Errors
///
/// * [`PersistenceError::InvariantViolation`] - the item is not pending
///   or the survivor is not part of the pair
/// * [`PersistenceError::Conflict`] - a concurrent decision won the
///   version race; the caller should re-read
pub fn decide_item(
    conn: &mut SqliteConnection,
    item_id: i64,
    expected_version: i32,
    decision: &ReviewDecision,
    decided_by: &str,
    cause: &Cause,
) -> Result<ReviewItemRow, PersistenceError> {
    conn.transaction::<ReviewItemRow, PersistenceError, _>(|conn| {
        let item: ReviewItemRow = queries::review::get_item(conn, item_id)?;

        if item.status != ReviewStatus::Pending.as_str() {
            return Err(PersistenceError::InvariantViolation(format!(
                "Review item {item_id} is not pending (status: {})",
                item.status
            )));
        }

        let (new_status, canonical_person_id, canonical_name): (
            ReviewStatus,
            Option<i64>,
            Option<String>,
        ) = match decision {
            ReviewDecision::Accept {
                canonical_person_id,
                canonical_name,
            } => {
                if *canonical_person_id != item.left_person_id
                    && *canonical_person_id != item.right_person_id
                {
                    return Err(PersistenceError::InvariantViolation(format!(
                        "Person {canonical_person_id} is not part of review item {item_id}"
                    )));
                }

                let loser_id: i64 = if *canonical_person_id == item.left_person_id {
                    item.right_person_id
                } else {
                    item.left_person_id
                };

                merge_persons(
                    conn,
                    *canonical_person_id,
                    loser_id,
                    canonical_name,
                    &Actor::operator(decided_by),
                    cause,
                )?;

                (
                    ReviewStatus::Accepted,
                    Some(*canonical_person_id),
                    Some(canonical_name.clone()),
                )
            }
            ReviewDecision::Reject => (ReviewStatus::Rejected, None, None),
            ReviewDecision::Skip => (ReviewStatus::Skipped, None, None),
        };

        let affected: usize = diesel::update(
            review_items::table
                .filter(review_items::item_id.eq(item_id))
                .filter(review_items::status.eq(ReviewStatus::Pending.as_str()))
                .filter(review_items::version.eq(expected_version)),
        )
        .set((
            review_items::status.eq(new_status.as_str()),
            review_items::version.eq(expected_version + 1),
            review_items::canonical_person_id.eq(canonical_person_id),
            review_items::canonical_name.eq(canonical_name.as_deref()),
            review_items::decided_by.eq(decided_by),
            review_items::decided_at.eq(now_rfc3339()),
        ))
        .execute(conn)?;

        if affected == 0 {
            return Err(PersistenceError::Conflict(format!(
                "Review item {item_id} was decided concurrently"
            )));
        }

        debug!(
            item_id,
            status = new_status.as_str(),
            decided_by,
            "Decided review item"
        );

        queries::review::get_item(conn, item_id)
    })
}
