// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Duplicate-candidate generation over person snapshots.
//!
//! A full pairwise pass over N persons is quadratic; blocking keeps the
//! comparison count at O(N * average block size). Two persons are only
//! compared when they share at least one block key and the same audience.

use padron_domain::{Audience, fold, similarity};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Prefix length for the name and email block keys.
const BLOCK_PREFIX_LEN: usize = 4;

/// The slice of a person the detector needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonSnapshot {
    /// The person's identifier.
    pub id: i64,
    /// Canonical full name when set, normalized full name otherwise.
    pub name: String,
    /// Folded institutional email, if any.
    pub email: Option<String>,
    /// Career or area, if any.
    pub career: Option<String>,
    /// The person's audience.
    pub audience: Audience,
}

/// A scored candidate pair. `left_id < right_id` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePair {
    /// The smaller person id of the unordered pair.
    pub left_id: i64,
    /// The larger person id of the unordered pair.
    pub right_id: i64,
    /// Token-sort similarity of the two names, 0..100.
    pub similarity: f64,
    /// The audience shared by both persons.
    pub audience: Audience,
}

/// Counters describing a detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DetectionStats {
    /// Persons considered.
    pub scanned_persons: usize,
    /// Pairs that shared a block and were actually compared.
    pub blocked_pairs: usize,
    /// Pairs at or above the threshold.
    pub candidates_found: usize,
}

/// Finds candidate duplicate pairs among the given persons.
///
/// Pairs listed in `skip` (as `(min, max)` id tuples) are never compared
/// again; callers pass the set of pairs already present in the review
/// queue, which makes repeated runs over unchanged data yield nothing
/// new. Self-pairs are skipped by construction. The output is sorted by
/// `(left_id, right_id)` so runs are deterministic.
#[must_use]
pub fn find_candidates(
    persons: &[PersonSnapshot],
    threshold: f64,
    skip: &HashSet<(i64, i64)>,
) -> (Vec<CandidatePair>, DetectionStats) {
    let mut blocks: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, person) in persons.iter().enumerate() {
        for key in block_keys(person) {
            blocks.entry(key).or_default().push(index);
        }
    }

    let mut stats: DetectionStats = DetectionStats {
        scanned_persons: persons.len(),
        ..DetectionStats::default()
    };
    let mut compared: HashSet<(i64, i64)> = HashSet::new();
    let mut candidates: Vec<CandidatePair> = Vec::new();

    for members in blocks.values() {
        for (position, &left_index) in members.iter().enumerate() {
            for &right_index in &members[position + 1..] {
                let left: &PersonSnapshot = &persons[left_index];
                let right: &PersonSnapshot = &persons[right_index];

                if left.id == right.id || left.audience != right.audience {
                    continue;
                }

                let pair: (i64, i64) = ordered(left.id, right.id);
                if skip.contains(&pair) || !compared.insert(pair) {
                    continue;
                }

                stats.blocked_pairs += 1;
                let score: f64 = similarity(&left.name, &right.name);
                if score >= threshold {
                    stats.candidates_found += 1;
                    candidates.push(CandidatePair {
                        left_id: pair.0,
                        right_id: pair.1,
                        similarity: score,
                        audience: left.audience,
                    });
                }
            }
        }
    }

    candidates.sort_by_key(|pair| (pair.left_id, pair.right_id));

    debug!(
        scanned = stats.scanned_persons,
        compared = stats.blocked_pairs,
        found = stats.candidates_found,
        "Duplicate detection pass complete"
    );

    (candidates, stats)
}

const fn ordered(a: i64, b: i64) -> (i64, i64) {
    if a < b { (a, b) } else { (b, a) }
}

/// The block keys a person participates in:
///
/// 1. first four characters of the first name token plus first four of the
///    last token,
/// 2. first four characters of the email local part,
/// 3. the folded career string.
fn block_keys(person: &PersonSnapshot) -> Vec<String> {
    let mut keys: Vec<String> = Vec::with_capacity(3);

    let folded_name: String = fold(&person.name);
    let tokens: Vec<&str> = folded_name.split_whitespace().collect();
    if let (Some(first), Some(last)) = (tokens.first(), tokens.last()) {
        keys.push(format!(
            "nm:{}:{}",
            prefix(first, BLOCK_PREFIX_LEN),
            prefix(last, BLOCK_PREFIX_LEN)
        ));
    }

    if let Some(email) = &person.email {
        let local: &str = email.split('@').next().unwrap_or("");
        if !local.is_empty() {
            keys.push(format!("em:{}", prefix(&fold(local), BLOCK_PREFIX_LEN)));
        }
    }

    if let Some(career) = &person.career {
        let folded: String = fold(career);
        if !folded.is_empty() {
            keys.push(format!("ca:{folded}"));
        }
    }

    keys
}

fn prefix(s: &str, len: usize) -> String {
    s.chars().take(len).collect()
}
