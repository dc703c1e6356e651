// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A national identifier in canonical `NNNNNNNN-D` form.
///
/// Accepts the common input shapes (`12345678-5`, `12.345.678-5`,
/// `123456785`) and verifies the check digit with the standard modulo-11
/// scheme before construction, so a value of this type is always valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NationalId {
    body: String,
    check: char,
}

impl NationalId {
    /// Parses and verifies a national identifier.
    ///
    /// Dots, hyphens and internal whitespace are stripped; the last
    /// remaining character is the check digit and everything before it is
    /// the numeric body.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NationalIdMalformed`] when the input is too
    /// short or the body contains non-digits, and
    /// [`DomainError::NationalIdBadCheckDigit`] when the body is well formed
    /// but the supplied check digit does not match the computed one.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let cleaned: String = input
            .trim()
            .chars()
            .filter(|c| !matches!(c, '.' | '-' | ' '))
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if cleaned.len() < 2 {
            return Err(DomainError::NationalIdMalformed {
                input: input.to_string(),
                reason: "too short",
            });
        }

        let (body, check_str) = cleaned.split_at(cleaned.len() - 1);
        if !body.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::NationalIdMalformed {
                input: input.to_string(),
                reason: "body must contain only digits",
            });
        }

        // split_at guarantees exactly one trailing character
        let got: char = check_str.chars().next().ok_or(
            DomainError::NationalIdMalformed {
                input: input.to_string(),
                reason: "missing check digit",
            },
        )?;

        let expected: char = Self::compute_check_digit(body);
        if got != expected {
            return Err(DomainError::NationalIdBadCheckDigit {
                body: body.to_string(),
                expected,
                got,
            });
        }

        Ok(Self {
            body: body.to_string(),
            check: expected,
        })
    }

    /// Computes the modulo-11 check digit for a digit body.
    ///
    /// Digits are weighted 2,3,4,5,6,7 (repeating) from the least
    /// significant digit; the result `11 - (sum mod 11)` maps 11 to `0` and
    /// 10 to `K`.
    #[must_use]
    pub fn compute_check_digit(body: &str) -> char {
        let mut weight: u32 = 2;
        let mut sum: u32 = 0;

        for digit in body.chars().rev().filter_map(|c| c.to_digit(10)) {
            sum += digit * weight;
            weight = if weight == 7 { 2 } else { weight + 1 };
        }

        match 11 - (sum % 11) {
            11 => '0',
            10 => 'K',
            n => char::from_digit(n, 10).unwrap_or('0'),
        }
    }

    /// The numeric body of the identifier.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The verified check digit.
    #[must_use]
    pub const fn check_digit(&self) -> char {
        self.check
    }

    /// The canonical textual form `NNNNNNNN-D`.
    #[must_use]
    pub fn canonical(&self) -> String {
        format!("{}-{}", self.body, self.check)
    }
}

impl FromStr for NationalId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for NationalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.body, self.check)
    }
}
