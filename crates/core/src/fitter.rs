// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Header fitting: mapping raw CSV header labels to canonical fields.
//!
//! The fitter proposes a mapping; the operator may amend it before the
//! ingest commits. An exact fold match against the alias table locks a
//! field at confidence 100; remaining headers fall back to fuzzy matching
//! against every alias.

use num_traits::ToPrimitive;
use padron_domain::{CanonicalField, fold, similarity};
use tracing::debug;

use crate::config::AliasTable;

/// Minimum fuzzy score for a header to be proposed for a field.
const FUZZY_THRESHOLD: f64 = 85.0;

/// The proposed assignment for a single header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderProposal {
    /// The header label exactly as it appears in the file.
    pub header: String,
    /// The proposed canonical field, or `None` to ignore the column.
    pub field: Option<CanonicalField>,
    /// Match confidence in 0..=100; 100 means an exact fold match.
    pub confidence: u8,
}

/// The fitter's full output: one proposal per input header, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingProposal {
    /// Per-header proposals, aligned with the input header list.
    pub proposals: Vec<HeaderProposal>,
}

impl MappingProposal {
    /// The proposed `header -> field` pairs, skipping ignored headers.
    #[must_use]
    pub fn mapping(&self) -> Vec<(String, CanonicalField)> {
        self.proposals
            .iter()
            .filter_map(|p| p.field.map(|field| (p.header.clone(), field)))
            .collect()
    }

    /// The required canonical fields the proposal leaves unmapped.
    #[must_use]
    pub fn unmapped_required(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .iter()
            .copied()
            .filter(|field| !self.proposals.iter().any(|p| p.field == Some(*field)))
            .collect()
    }
}

/// Fits an ordered header list to the canonical fields.
///
/// The output is a pure function of the header list and the alias table:
///
/// 1. For each canonical field in required order, the first header whose
///    fold exactly matches one of the field's aliases locks the mapping at
///    confidence 100.
/// 2. Each remaining header takes the best fuzzy score across all aliases
///    of the still-unmapped fields; a score of at least 85 proposes the
///    field, anything lower leaves the header ignored at confidence 0.
/// 3. Ties prefer the field that appears earlier in the required order.
#[must_use]
pub fn fit_headers(headers: &[String], aliases: &AliasTable) -> MappingProposal {
    let folded: Vec<String> = headers.iter().map(|h| fold(h)).collect();

    let mut assigned_field: Vec<Option<CanonicalField>> = vec![None; headers.len()];
    let mut confidence: Vec<u8> = vec![0; headers.len()];
    let mut taken: Vec<CanonicalField> = Vec::new();

    // Pass 1: exact fold matches lock their field.
    for field in CanonicalField::ALL {
        let labels: &[String] = aliases.labels(field);
        for (index, header_fold) in folded.iter().enumerate() {
            if assigned_field[index].is_some() {
                continue;
            }
            if labels.iter().any(|label| label == header_fold) {
                assigned_field[index] = Some(field);
                confidence[index] = 100;
                taken.push(field);
                break;
            }
        }
    }

    // Pass 2: fuzzy fallback for the remaining headers, in file order.
    for (index, header_fold) in folded.iter().enumerate() {
        if assigned_field[index].is_some() {
            continue;
        }

        let mut best: Option<(CanonicalField, f64)> = None;
        for field in CanonicalField::ALL {
            if taken.contains(&field) {
                continue;
            }
            for label in aliases.labels(field) {
                let score: f64 = similarity(header_fold, label);
                let improves: bool = match best {
                    None => true,
                    // Strict inequality keeps the earlier-ranked field on ties.
                    Some((_, best_score)) => score > best_score,
                };
                if improves {
                    best = Some((field, score));
                }
            }
        }

        if let Some((field, score)) = best
            && score >= FUZZY_THRESHOLD
        {
            assigned_field[index] = Some(field);
            confidence[index] = score.round().to_u8().unwrap_or(0).min(100);
            taken.push(field);
        }
    }

    let proposals: Vec<HeaderProposal> = headers
        .iter()
        .zip(assigned_field.iter().zip(confidence.iter()))
        .map(|(header, (field, conf))| HeaderProposal {
            header: header.clone(),
            field: *field,
            confidence: *conf,
        })
        .collect();

    debug!(
        header_count = headers.len(),
        mapped = proposals.iter().filter(|p| p.field.is_some()).count(),
        "Fitted CSV headers"
    );

    MappingProposal { proposals }
}
