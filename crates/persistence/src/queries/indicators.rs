// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only participation indicators.
//!
//! Aggregations run over the post-merge registry: registrations always
//! point at live persons (merges rewrite them), and the audience is read
//! from the person row, never recomputed from program text.

use diesel::SqliteConnection;
use diesel::prelude::*;
use padron_domain::Attendance;
use std::collections::{BTreeMap, HashSet};

use crate::diesel_schema::{activities, persons, registrations};
use crate::error::PersistenceError;

/// Which dimensions the aggregation groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndicatorDimensions {
    /// Group by activity year.
    pub year: bool,
    /// Group by strategic line.
    pub strategic_line: bool,
    /// Group by person audience.
    pub audience: bool,
}

/// Optional restriction of the source rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndicatorFilter {
    /// Only count registrations of this activity.
    pub activity_id: Option<i64>,
}

/// One aggregated output row. Dimension fields not grouped by are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    /// The activity year, when grouped by year.
    pub year: Option<i32>,
    /// The strategic line, when grouped by it.
    pub strategic_line: Option<String>,
    /// The audience, when grouped by it.
    pub audience: Option<String>,
    /// Count of registrations.
    pub registrations: usize,
    /// Count of registrations with attendance `yes`.
    pub participations: usize,
    /// Distinct live persons with at least one matching registration.
    pub unique_persons_registered: usize,
    /// Distinct live persons with at least one attended registration.
    pub unique_persons_participated: usize,
    /// `participations / registrations` rounded to two decimals; `None`
    /// when there are no registrations.
    pub conversion_rate: Option<f64>,
}

type SourceRow = (i32, String, String, String, i64);

#[derive(Default)]
struct Accumulator {
    registrations: usize,
    participations: usize,
    persons_registered: HashSet<i64>,
    persons_participated: HashSet<i64>,
}

/// Computes participation indicators grouped by the requested dimensions.
///
/// Output rows are sorted by `(year, strategic_line, audience)` for
/// deterministic consumption.
///
/// # Errors
///
/// Returns an error if the source query fails.
pub fn query(
    conn: &mut SqliteConnection,
    dimensions: IndicatorDimensions,
    filter: IndicatorFilter,
) -> Result<Vec<IndicatorRow>, PersistenceError> {
    let mut source = registrations::table
        .inner_join(activities::table)
        .inner_join(persons::table)
        .select((
            activities::year,
            activities::strategic_line,
            persons::audience,
            registrations::attended,
            registrations::person_id,
        ))
        .filter(persons::merged_into_id.is_null())
        .into_boxed();

    if let Some(activity_id) = filter.activity_id {
        source = source.filter(registrations::activity_id.eq(activity_id));
    }

    let rows: Vec<SourceRow> = source.load::<SourceRow>(conn)?;

    let mut groups: BTreeMap<(Option<i32>, Option<String>, Option<String>), Accumulator> =
        BTreeMap::new();

    for (year, strategic_line, audience, attended, person_id) in rows {
        let key: (Option<i32>, Option<String>, Option<String>) = (
            dimensions.year.then_some(year),
            dimensions.strategic_line.then(|| strategic_line),
            dimensions.audience.then(|| audience),
        );

        let accumulator: &mut Accumulator = groups.entry(key).or_default();
        accumulator.registrations += 1;
        accumulator.persons_registered.insert(person_id);
        if attended == Attendance::Yes.as_str() {
            accumulator.participations += 1;
            accumulator.persons_participated.insert(person_id);
        }
    }

    let output: Vec<IndicatorRow> = groups
        .into_iter()
        .map(|((year, strategic_line, audience), accumulator)| {
            let conversion_rate: Option<f64> = if accumulator.registrations == 0 {
                None
            } else {
                #[allow(clippy::cast_precision_loss)]
                let rate: f64 =
                    accumulator.participations as f64 / accumulator.registrations as f64;
                Some((rate * 100.0).round() / 100.0)
            };

            IndicatorRow {
                year,
                strategic_line,
                audience,
                registrations: accumulator.registrations,
                participations: accumulator.participations,
                unique_persons_registered: accumulator.persons_registered.len(),
                unique_persons_participated: accumulator.persons_participated.len(),
                conversion_rate,
            }
        })
        .collect();

    Ok(output)
}
