// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use padron_audit::{Actor, Cause};
use padron_domain::{Audience, Source};

use super::{attrs, create_test_activity, create_test_actor, create_test_cause, create_test_persistence};
use crate::{Persistence, PersonRow, RowPersistResult};

fn ingest(
    persistence: &mut Persistence,
    raw_name: &str,
    national_id: Option<&str>,
    email: Option<&str>,
    activity_id: i64,
) -> RowPersistResult {
    let actor: Actor = create_test_actor();
    let cause: Cause = create_test_cause();
    persistence
        .persist_ingested_row(
            &attrs(raw_name, national_id, email),
            Audience::Students,
            activity_id,
            Source::Csv,
            &[],
            "{}",
            None,
            None,
            &actor,
            &cause,
        )
        .expect("Failed to persist row")
}

#[test]
fn test_new_row_creates_person_and_registration() {
    let mut persistence: Persistence = create_test_persistence();
    let activity_id: i64 = create_test_activity(&mut persistence, "Fair");

    let result: RowPersistResult = ingest(
        &mut persistence,
        "Ada Lovelace",
        Some("12345678-5"),
        Some("ada@uni.cl"),
        activity_id,
    );

    assert!(result.created_person);
    assert!(result.inserted_registration);

    let person: PersonRow = persistence.get_person(result.person_id).expect("person");
    assert_eq!(person.raw_full_name, "Ada Lovelace");
    assert_eq!(person.normalized_full_name, "ada lovelace");
    assert_eq!(person.national_id.as_deref(), Some("12345678-5"));
    assert_eq!(person.audience, "students");
    assert!(!person.is_tombstone());
}

#[test]
fn test_same_national_id_reuses_person() {
    let mut persistence: Persistence = create_test_persistence();
    let first_activity: i64 = create_test_activity(&mut persistence, "Fair");
    let (second_activity, _) = persistence
        .get_or_create_activity("Workshop", "Community", 2026, Audience::Students)
        .expect("activity");

    let first: RowPersistResult = ingest(
        &mut persistence,
        "Ada Lovelace",
        Some("12345678-5"),
        None,
        first_activity,
    );
    let second: RowPersistResult = ingest(
        &mut persistence,
        "Ada King",
        Some("12345678-5"),
        Some("ada@uni.cl"),
        second_activity,
    );

    assert_eq!(first.person_id, second.person_id);
    assert!(!second.created_person);
    assert!(second.inserted_registration);
}

#[test]
fn test_email_fallback_when_national_id_absent() {
    let mut persistence: Persistence = create_test_persistence();
    let activity_a: i64 = create_test_activity(&mut persistence, "Fair");
    let (activity_b, _) = persistence
        .get_or_create_activity("Workshop", "Community", 2026, Audience::Students)
        .expect("activity");

    let first: RowPersistResult =
        ingest(&mut persistence, "Bob Smith", None, Some("bob@uni.cl"), activity_a);
    let second: RowPersistResult =
        ingest(&mut persistence, "Bob Smith", None, Some("bob@uni.cl"), activity_b);

    assert_eq!(first.person_id, second.person_id);
    assert!(!second.created_person);
}

#[test]
fn test_attribute_merge_fills_missing_only() {
    let mut persistence: Persistence = create_test_persistence();
    let activity_a: i64 = create_test_activity(&mut persistence, "Fair");
    let (activity_b, _) = persistence
        .get_or_create_activity("Workshop", "Community", 2026, Audience::Students)
        .expect("activity");

    let first: RowPersistResult = ingest(
        &mut persistence,
        "Ada Lovelace",
        Some("12345678-5"),
        None,
        activity_a,
    );

    // Second upload brings an email; the national ID hit back-fills it.
    ingest(
        &mut persistence,
        "Ada Lovelace",
        Some("12345678-5"),
        Some("ada@uni.cl"),
        activity_b,
    );

    let person: PersonRow = persistence.get_person(first.person_id).expect("person");
    assert_eq!(person.email.as_deref(), Some("ada@uni.cl"));
}

#[test]
fn test_attribute_merge_never_overwrites() {
    let mut persistence: Persistence = create_test_persistence();
    let activity_a: i64 = create_test_activity(&mut persistence, "Fair");
    let (activity_b, _) = persistence
        .get_or_create_activity("Workshop", "Community", 2026, Audience::Students)
        .expect("activity");

    let first: RowPersistResult = ingest(
        &mut persistence,
        "Ada Lovelace",
        Some("12345678-5"),
        Some("ada@uni.cl"),
        activity_a,
    );
    ingest(
        &mut persistence,
        "Ada Lovelace",
        Some("12345678-5"),
        Some("other@uni.cl"),
        activity_b,
    );

    let person: PersonRow = persistence.get_person(first.person_id).expect("person");
    assert_eq!(person.email.as_deref(), Some("ada@uni.cl"));
}

#[test]
fn test_differing_raw_name_lands_in_history() {
    let mut persistence: Persistence = create_test_persistence();
    let activity_a: i64 = create_test_activity(&mut persistence, "Fair");
    let (activity_b, _) = persistence
        .get_or_create_activity("Workshop", "Community", 2026, Audience::Students)
        .expect("activity");

    let first: RowPersistResult = ingest(
        &mut persistence,
        "Ada Lovelace",
        Some("12345678-5"),
        None,
        activity_a,
    );
    ingest(
        &mut persistence,
        "Ada King-Lovelace",
        Some("12345678-5"),
        None,
        activity_b,
    );

    let person: PersonRow = persistence.get_person(first.person_id).expect("person");
    assert_eq!(person.raw_full_name, "Ada Lovelace");
    let history: Vec<String> =
        serde_json::from_str(&person.name_history).expect("valid history JSON");
    assert_eq!(history, vec![String::from("Ada King-Lovelace")]);
}

#[test]
fn test_rows_without_identifiers_create_distinct_persons() {
    let mut persistence: Persistence = create_test_persistence();
    let activity_id: i64 = create_test_activity(&mut persistence, "Fair");
    let (other_activity, _) = persistence
        .get_or_create_activity("Workshop", "Community", 2026, Audience::Students)
        .expect("activity");

    let first: RowPersistResult = ingest(&mut persistence, "Juan Perez", None, None, activity_id);
    let second: RowPersistResult =
        ingest(&mut persistence, "Juan Perez", None, None, other_activity);

    assert_ne!(first.person_id, second.person_id);
    assert!(second.created_person);
}

#[test]
fn test_reconcile_preview_finds_without_creating() {
    let mut persistence: Persistence = create_test_persistence();
    let activity_id: i64 = create_test_activity(&mut persistence, "Fair");
    let result: RowPersistResult = ingest(
        &mut persistence,
        "Ada Lovelace",
        Some("12345678-5"),
        Some("ada@uni.cl"),
        activity_id,
    );

    let by_id: Option<i64> = persistence
        .reconcile_preview(Some("12345678-5"), None)
        .expect("preview");
    assert_eq!(by_id, Some(result.person_id));

    let by_email: Option<i64> = persistence
        .reconcile_preview(None, Some("ada@uni.cl"))
        .expect("preview");
    assert_eq!(by_email, Some(result.person_id));

    let missing: Option<i64> = persistence
        .reconcile_preview(Some("11111111-1"), Some("nobody@uni.cl"))
        .expect("preview");
    assert_eq!(missing, None);

    let persons: Vec<PersonRow> = persistence.list_live_persons().expect("list");
    assert_eq!(persons.len(), 1, "preview must not create rows");
}

#[test]
fn test_person_creation_is_audited() {
    let mut persistence: Persistence = create_test_persistence();
    let activity_id: i64 = create_test_activity(&mut persistence, "Fair");
    let result: RowPersistResult =
        ingest(&mut persistence, "Ada Lovelace", None, None, activity_id);

    let trail = persistence
        .audit_for_entity("person", result.person_id)
        .expect("audit trail");
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].action_name, "CreatePerson");
    assert_eq!(trail[0].before_json, "null");
}
