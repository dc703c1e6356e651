// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Pure text normalization used for all case- and accent-insensitive
//! comparisons across the system.

use crate::error::DomainError;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Spanish particles kept lowercase in title-cased names.
const LOWERCASE_PARTICLES: &[&str] = &[
    "de", "del", "la", "las", "el", "los", "y", "e", "da", "do", "dos", "das", "van", "von", "le",
    "du",
];

/// Accent-folds a string for insensitive comparison.
///
/// NFD decomposition, combining marks stripped, lower-cased, internal
/// whitespace collapsed to single spaces, trimmed.
#[must_use]
pub fn fold(input: &str) -> String {
    let stripped: String = input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();

    stripped.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Normalizes a person name for lookup and comparison.
///
/// Applies [`fold`] and strips punctuation except hyphens, collapsing the
/// resulting whitespace again.
#[must_use]
pub fn normalize_name(input: &str) -> String {
    let folded: String = fold(input);
    let stripped: String = folded
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == ' ' {
                c
            } else {
                ' '
            }
        })
        .collect();

    stripped.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Title-cases a name for display, keeping Spanish particles lowercase.
///
/// The first word is always capitalized; particles like "de" or "del" stay
/// lowercase elsewhere.
#[must_use]
pub fn spanish_title_case(input: &str) -> String {
    let words: Vec<&str> = input.split_whitespace().collect();
    let mut result: Vec<String> = Vec::with_capacity(words.len());

    for (index, word) in words.iter().enumerate() {
        let lower: String = word.to_lowercase();
        if index > 0 && LOWERCASE_PARTICLES.contains(&lower.as_str()) {
            result.push(lower);
        } else {
            result.push(capitalize(&lower));
        }
    }

    result.join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}

/// Normalizes an email address.
///
/// The address is accent-folded and lower-cased; the local part is kept
/// as-is otherwise (plus-tags are not stripped).
///
/// # Errors
///
/// Returns [`DomainError::InvalidEmail`] when the address has no `@`, an
/// empty local part, or a domain without a dot.
pub fn normalize_email(input: &str) -> Result<String, DomainError> {
    let folded: String = fold(input);

    let Some((local, domain)) = folded.rsplit_once('@') else {
        return Err(DomainError::InvalidEmail(input.to_string()));
    };

    if local.is_empty() || domain.is_empty() || !domain.contains('.') || folded.contains(' ') {
        return Err(DomainError::InvalidEmail(input.to_string()));
    }

    Ok(folded)
}

/// Normalizes a phone number.
///
/// Spaces, dashes, dots and parentheses are removed; a single leading `+`
/// is kept.
///
/// # Errors
///
/// Returns [`DomainError::InvalidPhone`] when the remainder contains
/// non-digit characters or fewer than eight digits.
pub fn normalize_phone(input: &str) -> Result<String, DomainError> {
    let trimmed: &str = input.trim();
    let (prefix, rest) = trimmed
        .strip_prefix('+')
        .map_or(("", trimmed), |rest| ("+", rest));

    let digits: String = rest
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::InvalidPhone(input.to_string()));
    }

    if digits.len() < 8 {
        return Err(DomainError::InvalidPhone(input.to_string()));
    }

    Ok(format!("{prefix}{digits}"))
}

/// Token-sort similarity ratio between two strings, scaled to 0..100.
///
/// Both inputs are folded, split into whitespace tokens, sorted and
/// rejoined before taking the normalized edit-distance ratio, which makes
/// the score insensitive to word order. Symmetric and deterministic.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    let sorted_a: String = token_sort(a);
    let sorted_b: String = token_sort(b);

    if sorted_a.is_empty() || sorted_b.is_empty() {
        return 0.0;
    }

    strsim::normalized_levenshtein(&sorted_a, &sorted_b) * 100.0
}

fn token_sort(input: &str) -> String {
    let folded: String = fold(input);
    let mut tokens: Vec<&str> = folded.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
