// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Review queue operations: listing with resolved persons, decisions,
//! and queue statistics.

use padron_audit::Cause;
use padron_domain::{Audience, ReviewStatus};
use padron_persistence::{
    Persistence, PersistenceError, PersonRow, ReviewDecision, ReviewItemRow, ReviewListFilter,
    ReviewQueueStats,
};
use tracing::debug;

use crate::error::{ApiError, translate_persistence_error};
use crate::request_response::{
    DecisionRequest, ReviewItemInfo, ReviewListResponse, ReviewPersonInfo,
};

/// Lists review items with stable pagination, resolving both persons of
/// each pair for display.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn list_reviews(
    persistence: &mut Persistence,
    filter: &ReviewListFilter,
    page: i64,
    limit: i64,
) -> Result<ReviewListResponse, ApiError> {
    let (rows, total) = persistence
        .list_review_items(filter, page, limit)
        .map_err(translate_persistence_error)?;

    let mut items: Vec<ReviewItemInfo> = Vec::with_capacity(rows.len());
    for row in rows {
        items.push(item_info(persistence, &row)?);
    }

    Ok(ReviewListResponse {
        items,
        total,
        page: page.max(1),
        limit,
    })
}

/// Counts review items per status, optionally per audience.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn review_stats(
    persistence: &mut Persistence,
    audience: Option<Audience>,
) -> Result<ReviewQueueStats, ApiError> {
    persistence
        .review_queue_stats(audience)
        .map_err(translate_persistence_error)
}

/// Applies an operator decision to a review item.
///
/// Decisions are idempotent at this boundary: re-applying the decision a
/// terminal item already carries returns the item unchanged. A different
/// decision on a terminal item is `item.not_pending`. An `Accept` whose
/// survivor is outside the pair is `canonical.not_in_pair`; losing a
/// concurrent race is `merge.conflict` and the caller re-reads.
///
/// # Errors
///
/// See above; storage failures surface as internal errors.
pub fn decide(
    persistence: &mut Persistence,
    item_id: i64,
    request: &DecisionRequest,
    decided_by: &str,
) -> Result<ReviewItemInfo, ApiError> {
    let item: ReviewItemRow = persistence
        .get_review_item(item_id)
        .map_err(translate_persistence_error)?;

    if item.status != ReviewStatus::Pending.as_str() {
        if decision_matches(&item, request) {
            debug!(item_id, status = %item.status, "Idempotent re-apply of decision");
            return item_info(persistence, &item);
        }
        return Err(ApiError::ItemNotPending {
            item_id,
            status: item.status,
        });
    }

    let decision: ReviewDecision = match request {
        DecisionRequest::Accept {
            canonical_person_id,
            canonical_name,
        } => {
            if *canonical_person_id != item.left_person_id
                && *canonical_person_id != item.right_person_id
            {
                return Err(ApiError::CanonicalNotInPair {
                    item_id,
                    person_id: *canonical_person_id,
                });
            }
            if canonical_name.trim().is_empty() {
                return Err(ApiError::InvalidInput {
                    field: String::from("canonical_name"),
                    message: String::from("A canonical name is required to accept"),
                });
            }
            ReviewDecision::Accept {
                canonical_person_id: *canonical_person_id,
                canonical_name: canonical_name.clone(),
            }
        }
        DecisionRequest::Reject => ReviewDecision::Reject,
        DecisionRequest::Skip => ReviewDecision::Skip,
    };

    let cause: Cause = Cause::new(
        format!("review-item-{item_id}"),
        String::from("Duplicate review decision"),
    );

    let decided: ReviewItemRow = persistence
        .decide_review_item(item_id, item.version, &decision, decided_by, &cause)
        .map_err(|err| match err {
            PersistenceError::Conflict(message) => ApiError::MergeConflict { message },
            PersistenceError::InvariantViolation(message) => {
                // The item may have turned terminal between our read and
                // the decision; report that precisely.
                persistence.get_review_item(item_id).map_or(
                    ApiError::MergeConflict {
                        message: message.clone(),
                    },
                    |current| {
                        if current.status == ReviewStatus::Pending.as_str() {
                            ApiError::MergeConflict { message }
                        } else {
                            ApiError::ItemNotPending {
                                item_id,
                                status: current.status,
                            }
                        }
                    },
                )
            }
            other => translate_persistence_error(other),
        })?;

    item_info(persistence, &decided)
}

fn decision_matches(item: &ReviewItemRow, request: &DecisionRequest) -> bool {
    match request {
        DecisionRequest::Accept {
            canonical_person_id,
            ..
        } => {
            item.status == ReviewStatus::Accepted.as_str()
                && item.canonical_person_id == Some(*canonical_person_id)
        }
        DecisionRequest::Reject => item.status == ReviewStatus::Rejected.as_str(),
        DecisionRequest::Skip => item.status == ReviewStatus::Skipped.as_str(),
    }
}

fn item_info(
    persistence: &mut Persistence,
    row: &ReviewItemRow,
) -> Result<ReviewItemInfo, ApiError> {
    let left: ReviewPersonInfo = person_info(persistence, row.left_person_id)?;
    let right: ReviewPersonInfo = person_info(persistence, row.right_person_id)?;

    Ok(ReviewItemInfo {
        item_id: row.item_id,
        similarity: row.similarity,
        status: row.status.clone(),
        audience: row.audience.clone(),
        version: row.version,
        left,
        right,
        decided_by: row.decided_by.clone(),
        decided_at: row.decided_at.clone(),
    })
}

fn person_info(persistence: &mut Persistence, person_id: i64) -> Result<ReviewPersonInfo, ApiError> {
    let person: PersonRow = persistence
        .get_person(person_id)
        .map_err(translate_persistence_error)?;

    let display_name: String = person.display_name().to_string();
    let context: String = format!(
        "{display_name} | {}",
        person.career.as_deref().unwrap_or_default()
    );

    Ok(ReviewPersonInfo {
        person_id,
        display_name,
        context,
        national_id: person.national_id,
        email: person.email,
    })
}
