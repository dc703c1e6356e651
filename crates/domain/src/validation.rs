// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row-level validation against the canonical field rules.
//!
//! Validation never rejects a row: it returns the normalized values along
//! with the (possibly empty) set of error tags so the caller can persist
//! the row and surface the tags to the operator.

use crate::error::DomainError;
use crate::national_id::NationalId;
use crate::normalize::{fold, normalize_email, normalize_name, normalize_phone};
use crate::types::ErrorKind;

/// The raw values of a row after mapping headers to canonical fields.
///
/// Empty strings mean the cell was empty or the column was unmapped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// The registrant's full name as received.
    pub full_name: String,
    /// The national identifier as received.
    pub national_id: String,
    /// The institutional email as received.
    pub institutional_email: String,
    /// The career or area as received.
    pub program_or_area: String,
    /// The phone number as received.
    pub phone: String,
}

/// The normalized values of a validated row.
///
/// Fields that failed to normalize are `None`; the corresponding error tag
/// records what went wrong. A national ID with a bad check digit is dropped
/// here so that identity resolution falls back to the email.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRow {
    /// The name exactly as received.
    pub raw_full_name: String,
    /// Accent-folded, punctuation-stripped form of the name.
    pub normalized_full_name: String,
    /// Verified national identifier, if present and valid.
    pub national_id: Option<NationalId>,
    /// Folded email address, if present and well formed.
    pub institutional_email: Option<String>,
    /// Trimmed career or area, if present.
    pub program_or_area: Option<String>,
    /// Canonical phone number, if present and well formed.
    pub phone: Option<String>,
}

/// Validates and normalizes a mapped row.
///
/// Each canonical field contributes at most one error tag. Optional fields
/// (national ID, email, program, phone) that are empty produce no tag
/// except the program, which is required to be non-empty.
///
/// `email_suffixes` is the configured list of institution domain suffixes;
/// an address whose domain matches none of them is tagged
/// `email.non_institutional` but its normalized value is still kept for
/// identity resolution.
#[must_use]
pub fn validate_row(row: &RawRow, email_suffixes: &[String]) -> (NormalizedRow, Vec<ErrorKind>) {
    let mut errors: Vec<ErrorKind> = Vec::new();

    let normalized_name: String = normalize_name(&row.full_name);
    if normalized_name.is_empty() {
        errors.push(ErrorKind::NameMissing);
    } else if normalized_name.split_whitespace().count() < 2 {
        errors.push(ErrorKind::NameSingleToken);
    }

    let national_id: Option<NationalId> = if row.national_id.trim().is_empty() {
        None
    } else {
        match NationalId::parse(&row.national_id) {
            Ok(id) => Some(id),
            Err(DomainError::NationalIdBadCheckDigit { .. }) => {
                errors.push(ErrorKind::NidBadCheck);
                None
            }
            Err(_) => {
                errors.push(ErrorKind::NidMalformed);
                None
            }
        }
    };

    let institutional_email: Option<String> = if row.institutional_email.trim().is_empty() {
        None
    } else {
        match normalize_email(&row.institutional_email) {
            Ok(email) => {
                if !is_institutional(&email, email_suffixes) {
                    errors.push(ErrorKind::EmailNonInstitutional);
                }
                Some(email)
            }
            Err(_) => {
                errors.push(ErrorKind::EmailMalformed);
                None
            }
        }
    };

    let program: String = collapse_whitespace(&row.program_or_area);
    let program_or_area: Option<String> = if program.is_empty() {
        errors.push(ErrorKind::ProgramMissing);
        None
    } else {
        Some(program)
    };

    let phone: Option<String> = if row.phone.trim().is_empty() {
        None
    } else {
        match normalize_phone(&row.phone) {
            Ok(number) => Some(number),
            Err(_) => {
                errors.push(ErrorKind::PhoneMalformed);
                None
            }
        }
    };

    let normalized: NormalizedRow = NormalizedRow {
        raw_full_name: row.full_name.trim().to_string(),
        normalized_full_name: normalized_name,
        national_id,
        institutional_email,
        program_or_area,
        phone,
    };

    (normalized, errors)
}

/// Whether an already-folded email address belongs to a configured
/// institution domain.
fn is_institutional(email: &str, suffixes: &[String]) -> bool {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };

    suffixes.iter().any(|suffix| {
        let folded_suffix: String = fold(suffix);
        domain == folded_suffix || domain.ends_with(&format!(".{folded_suffix}"))
    })
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<&str>>().join(" ")
}
