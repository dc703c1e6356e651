// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{ErrorKind, NormalizedRow, RawRow, validate_row};

fn suffixes() -> Vec<String> {
    vec![String::from("uni.cl")]
}

fn valid_row() -> RawRow {
    RawRow {
        full_name: String::from("Ada Lovelace"),
        national_id: String::from("12.345.678-5"),
        institutional_email: String::from("ada@uni.cl"),
        program_or_area: String::from("Math"),
        phone: String::from("+56 9 1234 5678"),
    }
}

#[test]
fn test_valid_row_produces_no_errors() {
    let (normalized, errors) = validate_row(&valid_row(), &suffixes());

    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(normalized.raw_full_name, "Ada Lovelace");
    assert_eq!(normalized.normalized_full_name, "ada lovelace");
    assert_eq!(
        normalized.national_id.as_ref().map(crate::NationalId::canonical),
        Some(String::from("12345678-5"))
    );
    assert_eq!(
        normalized.institutional_email,
        Some(String::from("ada@uni.cl"))
    );
    assert_eq!(normalized.program_or_area, Some(String::from("Math")));
    assert_eq!(normalized.phone, Some(String::from("+56912345678")));
}

#[test]
fn test_missing_name_is_tagged() {
    let mut row: RawRow = valid_row();
    row.full_name = String::from("   ");
    let (_, errors) = validate_row(&row, &suffixes());
    assert_eq!(errors, vec![ErrorKind::NameMissing]);
}

#[test]
fn test_single_token_name_is_tagged() {
    let mut row: RawRow = valid_row();
    row.full_name = String::from("Madonna");
    let (_, errors) = validate_row(&row, &suffixes());
    assert_eq!(errors, vec![ErrorKind::NameSingleToken]);
}

#[test]
fn test_bad_check_digit_drops_id_but_keeps_email() {
    let mut row: RawRow = valid_row();
    row.national_id = String::from("12345678-0");
    let (normalized, errors) = validate_row(&row, &suffixes());

    assert_eq!(errors, vec![ErrorKind::NidBadCheck]);
    assert!(normalized.national_id.is_none());
    assert_eq!(
        normalized.institutional_email,
        Some(String::from("ada@uni.cl"))
    );
}

#[test]
fn test_malformed_id_is_tagged() {
    let mut row: RawRow = valid_row();
    row.national_id = String::from("not-an-id");
    let (normalized, errors) = validate_row(&row, &suffixes());

    assert_eq!(errors, vec![ErrorKind::NidMalformed]);
    assert!(normalized.national_id.is_none());
}

#[test]
fn test_blank_optional_fields_produce_no_tags() {
    let mut row: RawRow = valid_row();
    row.national_id = String::new();
    row.institutional_email = String::new();
    row.phone = String::new();
    let (normalized, errors) = validate_row(&row, &suffixes());

    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert!(normalized.national_id.is_none());
    assert!(normalized.institutional_email.is_none());
    assert!(normalized.phone.is_none());
}

#[test]
fn test_non_institutional_email_keeps_value() {
    let mut row: RawRow = valid_row();
    row.institutional_email = String::from("ada@gmail.com");
    let (normalized, errors) = validate_row(&row, &suffixes());

    assert_eq!(errors, vec![ErrorKind::EmailNonInstitutional]);
    assert_eq!(
        normalized.institutional_email,
        Some(String::from("ada@gmail.com"))
    );
}

#[test]
fn test_subdomain_of_institution_suffix_is_accepted() {
    let mut row: RawRow = valid_row();
    row.institutional_email = String::from("ada@mail.uni.cl");
    let (_, errors) = validate_row(&row, &suffixes());
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
}

#[test]
fn test_malformed_email_is_dropped() {
    let mut row: RawRow = valid_row();
    row.institutional_email = String::from("not-an-email");
    let (normalized, errors) = validate_row(&row, &suffixes());

    assert_eq!(errors, vec![ErrorKind::EmailMalformed]);
    assert!(normalized.institutional_email.is_none());
}

#[test]
fn test_missing_program_is_tagged() {
    let mut row: RawRow = valid_row();
    row.program_or_area = String::from("  ");
    let (_, errors) = validate_row(&row, &suffixes());
    assert_eq!(errors, vec![ErrorKind::ProgramMissing]);
}

#[test]
fn test_short_phone_is_tagged() {
    let mut row: RawRow = valid_row();
    row.phone = String::from("123 45");
    let (normalized, errors) = validate_row(&row, &suffixes());

    assert_eq!(errors, vec![ErrorKind::PhoneMalformed]);
    assert!(normalized.phone.is_none());
}

#[test]
fn test_each_field_contributes_at_most_one_tag() {
    let row: RawRow = RawRow {
        full_name: String::from("X"),
        national_id: String::from("bogus"),
        institutional_email: String::from("bad"),
        program_or_area: String::new(),
        phone: String::from("12"),
    };
    let (_, errors) = validate_row(&row, &suffixes());

    assert_eq!(
        errors,
        vec![
            ErrorKind::NameSingleToken,
            ErrorKind::NidMalformed,
            ErrorKind::EmailMalformed,
            ErrorKind::ProgramMissing,
            ErrorKind::PhoneMalformed,
        ]
    );
}

#[test]
fn test_validation_is_deterministic() {
    let row: RawRow = valid_row();
    let first: (NormalizedRow, Vec<ErrorKind>) = validate_row(&row, &suffixes());
    for _ in 0..3 {
        assert_eq!(validate_row(&row, &suffixes()), first);
    }
}
