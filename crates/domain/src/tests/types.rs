// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    Attendance, Audience, CanonicalField, CatalogKind, DomainError, ErrorKind, ReviewStatus,
    Source,
};
use std::str::FromStr;

#[test]
fn test_audience_round_trip() {
    for audience in [Audience::Students, Audience::Staff] {
        let parsed: Audience = Audience::from_str(audience.as_str()).expect("round trip");
        assert_eq!(parsed, audience);
    }
}

#[test]
fn test_audience_rejects_unknown_value() {
    assert!(matches!(
        Audience::from_str("everyone"),
        Err(DomainError::InvalidAudience(_))
    ));
}

#[test]
fn test_source_round_trip() {
    assert_eq!(Source::from_str("csv").expect("valid"), Source::Csv);
    assert_eq!(Source::from_str("walk_in").expect("valid"), Source::WalkIn);
}

#[test]
fn test_attendance_round_trip_and_default() {
    assert_eq!(Attendance::default(), Attendance::Unknown);
    for value in [Attendance::Unknown, Attendance::Yes, Attendance::No] {
        let parsed: Attendance = Attendance::from_str(value.as_str()).expect("round trip");
        assert_eq!(parsed, value);
    }
}

#[test]
fn test_review_status_round_trip_and_terminality() {
    for status in [
        ReviewStatus::Pending,
        ReviewStatus::Accepted,
        ReviewStatus::Rejected,
        ReviewStatus::Skipped,
    ] {
        let parsed: ReviewStatus = ReviewStatus::from_str(status.as_str()).expect("round trip");
        assert_eq!(parsed, status);
    }

    assert!(!ReviewStatus::Pending.is_terminal());
    assert!(ReviewStatus::Accepted.is_terminal());
    assert!(ReviewStatus::Rejected.is_terminal());
    assert!(ReviewStatus::Skipped.is_terminal());
}

#[test]
fn test_catalog_kind_round_trip() {
    for kind in [
        CatalogKind::StrategicLine,
        CatalogKind::ActivityName,
        CatalogKind::Career,
    ] {
        let parsed: CatalogKind = CatalogKind::from_str(kind.as_str()).expect("round trip");
        assert_eq!(parsed, kind);
    }
}

#[test]
fn test_canonical_field_order_is_required_rank() {
    assert_eq!(CanonicalField::FullName.required_rank(), 0);
    assert_eq!(CanonicalField::NationalId.required_rank(), 1);
    assert_eq!(CanonicalField::InstitutionalEmail.required_rank(), 2);
    assert_eq!(CanonicalField::ProgramOrArea.required_rank(), 3);
    assert_eq!(CanonicalField::Phone.required_rank(), 4);
}

#[test]
fn test_error_kind_tags_round_trip() {
    for kind in [
        ErrorKind::NameMissing,
        ErrorKind::NameSingleToken,
        ErrorKind::NidMalformed,
        ErrorKind::NidBadCheck,
        ErrorKind::EmailMalformed,
        ErrorKind::EmailNonInstitutional,
        ErrorKind::ProgramMissing,
        ErrorKind::PhoneMalformed,
        ErrorKind::PersistFailed,
    ] {
        let parsed: ErrorKind = ErrorKind::from_str(kind.as_str()).expect("round trip");
        assert_eq!(parsed, kind);
    }
}
