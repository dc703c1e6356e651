// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The operator-declared population of an activity.
///
/// The audience is set once per upload and stamped onto every person the
/// upload creates. It is never recomputed from career or program text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    /// Student registrants.
    Students,
    /// Staff and collaborator registrants.
    Staff,
}

impl Audience {
    /// Converts this audience to its string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Staff => "staff",
        }
    }
}

impl FromStr for Audience {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "students" => Ok(Self::Students),
            "staff" => Ok(Self::Staff),
            _ => Err(DomainError::InvalidAudience(s.to_string())),
        }
    }
}

impl std::fmt::Display for Audience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a registration entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Imported from a survey-export CSV.
    Csv,
    /// Created at attendance time without a prior CSV row.
    WalkIn,
}

impl Source {
    /// Converts this source to its string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::WalkIn => "walk_in",
        }
    }
}

impl FromStr for Source {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(Self::Csv),
            "walk_in" => Ok(Self::WalkIn),
            _ => Err(DomainError::InvalidSource(s.to_string())),
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Attendance state of a registration.
///
/// New registrations start as `Unknown`; the attendance toggle moves them
/// between `Yes`, `No` and back to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attendance {
    /// Attendance has not been recorded yet.
    #[default]
    Unknown,
    /// The person attended.
    Yes,
    /// The person did not attend.
    No,
}

impl Attendance {
    /// Converts this attendance value to its string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

impl FromStr for Attendance {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(Self::Unknown),
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            _ => Err(DomainError::InvalidAttendance(s.to_string())),
        }
    }
}

impl std::fmt::Display for Attendance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State of a duplicate-review queue item.
///
/// `Pending` is the only non-terminal state; every transition out of it
/// is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    /// Awaiting an operator decision.
    #[default]
    Pending,
    /// Accepted as a duplicate; the pair was merged. Terminal.
    Accepted,
    /// Rejected as distinct persons. Terminal.
    Rejected,
    /// Skipped without a verdict. Terminal.
    Skipped,
}

impl ReviewStatus {
    /// Converts this status to its string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Skipped => "skipped",
        }
    }

    /// Whether this status is final.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl FromStr for ReviewStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "skipped" => Ok(Self::Skipped),
            _ => Err(DomainError::InvalidReviewStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kinds of controlled vocabulary entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    /// Strategic lines grouping activities.
    StrategicLine,
    /// Names of event occurrences.
    ActivityName,
    /// Careers and organizational areas.
    Career,
}

impl CatalogKind {
    /// Converts this kind to its string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StrategicLine => "strategic_line",
            Self::ActivityName => "activity_name",
            Self::Career => "career",
        }
    }
}

impl FromStr for CatalogKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strategic_line" => Ok(Self::StrategicLine),
            "activity_name" => Ok(Self::ActivityName),
            "career" => Ok(Self::Career),
            _ => Err(DomainError::InvalidCatalogKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The five canonical attributes extracted from every CSV, in required order.
///
/// The order doubles as the tie-break rank during header fitting: when two
/// fields score the same against a header, the earlier field wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    /// The registrant's full name.
    FullName,
    /// The national identifier with check digit.
    NationalId,
    /// The institutional email address.
    InstitutionalEmail,
    /// The career (students) or organizational area (staff).
    ProgramOrArea,
    /// A contact phone number.
    Phone,
}

impl CanonicalField {
    /// All canonical fields in required order.
    pub const ALL: [Self; 5] = [
        Self::FullName,
        Self::NationalId,
        Self::InstitutionalEmail,
        Self::ProgramOrArea,
        Self::Phone,
    ];

    /// Converts this field to its string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::NationalId => "national_id",
            Self::InstitutionalEmail => "institutional_email",
            Self::ProgramOrArea => "program_or_area",
            Self::Phone => "phone",
        }
    }

    /// The position of this field in the required order.
    #[must_use]
    pub fn required_rank(self) -> usize {
        Self::ALL
            .iter()
            .position(|field| *field == self)
            .unwrap_or(Self::ALL.len())
    }
}

impl FromStr for CanonicalField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full_name" => Ok(Self::FullName),
            "national_id" => Ok(Self::NationalId),
            "institutional_email" => Ok(Self::InstitutionalEmail),
            "program_or_area" => Ok(Self::ProgramOrArea),
            "phone" => Ok(Self::Phone),
            _ => Err(DomainError::InvalidCanonicalField(s.to_string())),
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Row-level validation error tags.
///
/// A row carrying one or more of these is still persisted; the tags travel
/// with the registration so the operator can filter and correct it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The full name is empty after folding.
    NameMissing,
    /// The full name has fewer than two tokens.
    NameSingleToken,
    /// The national ID could not be parsed.
    NidMalformed,
    /// The national ID parsed but its check digit is wrong.
    NidBadCheck,
    /// The email address could not be parsed.
    EmailMalformed,
    /// The email address does not belong to a configured institution domain.
    EmailNonInstitutional,
    /// The program or area field is empty.
    ProgramMissing,
    /// The phone number has fewer than eight digits.
    PhoneMalformed,
    /// The row failed to persist after validation.
    PersistFailed,
}

impl ErrorKind {
    /// Converts this tag to its dotted string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NameMissing => "name.missing",
            Self::NameSingleToken => "name.single_token",
            Self::NidMalformed => "nid.malformed",
            Self::NidBadCheck => "nid.bad_check",
            Self::EmailMalformed => "email.malformed",
            Self::EmailNonInstitutional => "email.non_institutional",
            Self::ProgramMissing => "program.missing",
            Self::PhoneMalformed => "phone.malformed",
            Self::PersistFailed => "persist.failed",
        }
    }
}

impl FromStr for ErrorKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name.missing" => Ok(Self::NameMissing),
            "name.single_token" => Ok(Self::NameSingleToken),
            "nid.malformed" => Ok(Self::NidMalformed),
            "nid.bad_check" => Ok(Self::NidBadCheck),
            "email.malformed" => Ok(Self::EmailMalformed),
            "email.non_institutional" => Ok(Self::EmailNonInstitutional),
            "program.missing" => Ok(Self::ProgramMissing),
            "phone.malformed" => Ok(Self::PhoneMalformed),
            "persist.failed" => Ok(Self::PersistFailed),
            _ => Err(DomainError::InvalidErrorKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
