// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Participation indicator queries.

use padron_persistence::{IndicatorDimensions, IndicatorFilter, IndicatorRow, Persistence};

use crate::error::{ApiError, translate_persistence_error};

/// Computes participation indicators grouped by the requested
/// dimensions, optionally restricted to one activity.
///
/// # Errors
///
/// Returns a not-found error when a filtered activity does not exist,
/// or an internal error when the query fails.
pub fn query(
    persistence: &mut Persistence,
    dimensions: IndicatorDimensions,
    filter: IndicatorFilter,
) -> Result<Vec<IndicatorRow>, ApiError> {
    if let Some(activity_id) = filter.activity_id {
        persistence
            .get_activity(activity_id)
            .map_err(translate_persistence_error)?;
    }

    persistence
        .indicators(dimensions, filter)
        .map_err(translate_persistence_error)
}
