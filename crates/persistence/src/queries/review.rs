// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Review queue lookups.

use diesel::SqliteConnection;
use diesel::prelude::*;
use padron_domain::{Audience, ReviewStatus};
use std::collections::HashSet;

use crate::data_models::{ReviewItemRow, ReviewQueueStats};
use crate::diesel_schema::review_items;
use crate::error::PersistenceError;

/// Filters for listing review items.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReviewListFilter {
    /// Restrict to a status; `None` lists all.
    pub status: Option<ReviewStatus>,
    /// Restrict to an audience.
    pub audience: Option<Audience>,
    /// Minimum similarity, inclusive.
    pub min_similarity: Option<f64>,
    /// Maximum similarity, inclusive.
    pub max_similarity: Option<f64>,
}

/// Retrieves a review item by ID.
///
/// # Errors
///
/// Returns `NotFound` if no row exists.
pub fn get_item(
    conn: &mut SqliteConnection,
    item_id: i64,
) -> Result<ReviewItemRow, PersistenceError> {
    review_items::table
        .filter(review_items::item_id.eq(item_id))
        .first::<ReviewItemRow>(conn)
        .map_err(|_| PersistenceError::NotFound(format!("Review item {item_id} not found")))
}

/// Lists review items with stable pagination.
///
/// Ordering is `(similarity desc, item_id asc)` so pages are stable under
/// concurrent inserts of unrelated pairs.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn list_items(
    conn: &mut SqliteConnection,
    filter: &ReviewListFilter,
    page: i64,
    limit: i64,
) -> Result<(Vec<ReviewItemRow>, i64), PersistenceError> {
    let offset: i64 = (page.max(1) - 1) * limit;

    let mut count_query = review_items::table.into_boxed();
    let mut page_query = review_items::table.into_boxed();

    if let Some(status) = filter.status {
        count_query = count_query.filter(review_items::status.eq(status.as_str()));
        page_query = page_query.filter(review_items::status.eq(status.as_str()));
    }
    if let Some(audience) = filter.audience {
        count_query = count_query.filter(review_items::audience.eq(audience.as_str()));
        page_query = page_query.filter(review_items::audience.eq(audience.as_str()));
    }
    if let Some(min) = filter.min_similarity {
        count_query = count_query.filter(review_items::similarity.ge(min));
        page_query = page_query.filter(review_items::similarity.ge(min));
    }
    if let Some(max) = filter.max_similarity {
        count_query = count_query.filter(review_items::similarity.le(max));
        page_query = page_query.filter(review_items::similarity.le(max));
    }

    let total: i64 = count_query.count().get_result::<i64>(conn)?;

    let items: Vec<ReviewItemRow> = page_query
        .order((review_items::similarity.desc(), review_items::item_id.asc()))
        .offset(offset)
        .limit(limit)
        .load::<ReviewItemRow>(conn)?;

    Ok((items, total))
}

/// All `(left, right)` pairs present in the queue, regardless of status.
///
/// The detector passes this as its skip set: pending pairs must not be
/// duplicated and terminal pairs must never be re-detected.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn all_pairs(conn: &mut SqliteConnection) -> Result<HashSet<(i64, i64)>, PersistenceError> {
    Ok(review_items::table
        .select((review_items::left_person_id, review_items::right_person_id))
        .load::<(i64, i64)>(conn)?
        .into_iter()
        .collect())
}

/// Counts queue items per status, optionally restricted to an audience.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn stats(
    conn: &mut SqliteConnection,
    audience: Option<Audience>,
) -> Result<ReviewQueueStats, PersistenceError> {
    let rows: Vec<String> = match audience {
        Some(audience) => review_items::table
            .filter(review_items::audience.eq(audience.as_str()))
            .select(review_items::status)
            .load::<String>(conn)?,
        None => review_items::table
            .select(review_items::status)
            .load::<String>(conn)?,
    };

    let mut counters: ReviewQueueStats = ReviewQueueStats::default();
    for status in rows {
        match status.as_str() {
            "pending" => counters.pending += 1,
            "accepted" => counters.accepted += 1,
            "rejected" => counters.rejected += 1,
            "skipped" => counters.skipped += 1,
            _ => {}
        }
    }

    Ok(counters)
}
