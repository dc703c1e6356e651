// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Duplicate detection over the person registry.

use std::collections::HashSet;
use std::str::FromStr;

use padron::{CandidatePair, IngestConfig, PersonSnapshot, find_candidates};
use padron_domain::Audience;
use padron_persistence::Persistence;
use tracing::info;

use crate::error::{ApiError, translate_persistence_error};
use crate::request_response::DetectionReport;

/// Runs a duplicate-detection pass over all live persons and enqueues
/// new candidate pairs for review.
///
/// Pairs already in the queue, in any state, are never re-detected, so
/// re-running over unchanged data adds nothing.
///
/// # Errors
///
/// Returns an error if the registry cannot be read or the queue insert
/// fails.
pub fn detect_duplicates(
    persistence: &mut Persistence,
    config: &IngestConfig,
) -> Result<DetectionReport, ApiError> {
    let persons = persistence
        .list_live_persons()
        .map_err(translate_persistence_error)?;

    let snapshots: Vec<PersonSnapshot> = persons
        .iter()
        .map(|row| {
            let audience: Audience =
                Audience::from_str(&row.audience).map_err(|e| ApiError::Internal {
                    message: format!("Stored audience is invalid: {e}"),
                })?;
            Ok(PersonSnapshot {
                id: row.person_id,
                name: row.display_name().to_string(),
                email: row.email.clone(),
                career: row.career.clone(),
                audience,
            })
        })
        .collect::<Result<Vec<PersonSnapshot>, ApiError>>()?;

    let skip: HashSet<(i64, i64)> = persistence
        .existing_review_pairs()
        .map_err(translate_persistence_error)?;

    let (candidates, stats): (Vec<CandidatePair>, _) =
        find_candidates(&snapshots, config.review_threshold, &skip);

    let insert_stats = persistence
        .insert_review_candidates(&candidates)
        .map_err(translate_persistence_error)?;

    info!(
        scanned = stats.scanned_persons,
        found = stats.candidates_found,
        enqueued = insert_stats.inserted,
        "Duplicate detection run complete"
    );

    Ok(DetectionReport {
        scanned_persons: stats.scanned_persons,
        blocked_pairs: stats.blocked_pairs,
        candidates_found: stats.candidates_found,
        queue_added: insert_stats.inserted,
    })
}
