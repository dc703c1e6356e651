// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation and normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The audience string is not a recognized value.
    InvalidAudience(String),
    /// The registration source string is not a recognized value.
    InvalidSource(String),
    /// The attendance string is not a recognized value.
    InvalidAttendance(String),
    /// The catalog kind string is not a recognized value.
    InvalidCatalogKind(String),
    /// The canonical field name is not a recognized value.
    InvalidCanonicalField(String),
    /// The error-kind tag is not a recognized value.
    InvalidErrorKind(String),
    /// The review status string is not a recognized value.
    InvalidReviewStatus(String),
    /// A national identifier could not be parsed.
    NationalIdMalformed {
        /// The input as received.
        input: String,
        /// Why parsing failed.
        reason: &'static str,
    },
    /// A national identifier parsed but its check digit is wrong.
    NationalIdBadCheckDigit {
        /// The digit body of the identifier.
        body: String,
        /// The check digit derived from the body.
        expected: char,
        /// The check digit supplied by the input.
        got: char,
    },
    /// An email address could not be normalized.
    InvalidEmail(String),
    /// A phone number could not be normalized.
    InvalidPhone(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAudience(value) => write!(f, "Invalid audience: '{value}'"),
            Self::InvalidSource(value) => write!(f, "Invalid registration source: '{value}'"),
            Self::InvalidAttendance(value) => write!(f, "Invalid attendance value: '{value}'"),
            Self::InvalidCatalogKind(value) => write!(f, "Invalid catalog kind: '{value}'"),
            Self::InvalidCanonicalField(value) => {
                write!(f, "Invalid canonical field: '{value}'")
            }
            Self::InvalidErrorKind(value) => write!(f, "Invalid error kind tag: '{value}'"),
            Self::InvalidReviewStatus(value) => write!(f, "Invalid review status: '{value}'"),
            Self::NationalIdMalformed { input, reason } => {
                write!(f, "Malformed national ID '{input}': {reason}")
            }
            Self::NationalIdBadCheckDigit {
                body,
                expected,
                got,
            } => {
                write!(
                    f,
                    "Bad check digit for national ID '{body}': expected '{expected}', got '{got}'"
                )
            }
            Self::InvalidEmail(value) => write!(f, "Invalid email address: '{value}'"),
            Self::InvalidPhone(value) => write!(f, "Invalid phone number: '{value}'"),
        }
    }
}

impl std::error::Error for DomainError {}
