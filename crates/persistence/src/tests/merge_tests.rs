// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use padron_domain::Audience;

use super::{
    create_test_activity, create_test_actor, create_test_cause, create_test_persistence,
    seed_person_with_registration,
};
use crate::{MergeOutcome, Persistence, PersistenceError, PersonRow};

#[test]
fn test_merge_moves_registrations_to_survivor() {
    let mut persistence: Persistence = create_test_persistence();
    let activity_a: i64 = create_test_activity(&mut persistence, "Fair");
    let (activity_b, _) = persistence
        .get_or_create_activity("Workshop", "Community", 2026, Audience::Students)
        .expect("activity");

    let survivor: i64 = seed_person_with_registration(
        &mut persistence,
        "Juan Perez",
        Some("11111111-1"),
        None,
        activity_a,
    );
    let loser: i64 = seed_person_with_registration(
        &mut persistence,
        "Juán Pérez",
        None,
        Some("juan@uni.cl"),
        activity_b,
    );

    let outcome: MergeOutcome = persistence
        .merge_persons(
            survivor,
            loser,
            "Juan Pérez",
            &create_test_actor(),
            &create_test_cause(),
        )
        .expect("merge");

    assert_eq!(outcome.moved_registrations, 1);
    assert_eq!(outcome.dropped_registrations, 0);

    let survivor_registrations = persistence
        .registrations_for_person(survivor)
        .expect("registrations");
    assert_eq!(survivor_registrations.len(), 2);

    let loser_registrations = persistence
        .registrations_for_person(loser)
        .expect("registrations");
    assert!(loser_registrations.is_empty());
}

#[test]
fn test_merge_drops_duplicate_activity_registrations() {
    let mut persistence: Persistence = create_test_persistence();
    let activity: i64 = create_test_activity(&mut persistence, "Fair");

    let survivor: i64 = seed_person_with_registration(
        &mut persistence,
        "Juan Perez",
        Some("11111111-1"),
        None,
        activity,
    );
    let loser: i64 = seed_person_with_registration(
        &mut persistence,
        "Juán Pérez",
        None,
        Some("juan@uni.cl"),
        activity,
    );

    let outcome: MergeOutcome = persistence
        .merge_persons(
            survivor,
            loser,
            "Juan Pérez",
            &create_test_actor(),
            &create_test_cause(),
        )
        .expect("merge");

    assert_eq!(outcome.moved_registrations, 0);
    assert_eq!(outcome.dropped_registrations, 1);

    let survivor_registrations = persistence
        .registrations_for_person(survivor)
        .expect("registrations");
    assert_eq!(survivor_registrations.len(), 1);
}

#[test]
fn test_merge_stamps_canonical_name_and_tombstones_loser() {
    let mut persistence: Persistence = create_test_persistence();
    let activity_a: i64 = create_test_activity(&mut persistence, "Fair");
    let (activity_b, _) = persistence
        .get_or_create_activity("Workshop", "Community", 2026, Audience::Students)
        .expect("activity");

    let survivor: i64 = seed_person_with_registration(
        &mut persistence,
        "Juan Perez",
        Some("11111111-1"),
        None,
        activity_a,
    );
    let loser: i64 = seed_person_with_registration(
        &mut persistence,
        "Juán Pérez",
        None,
        Some("juan@uni.cl"),
        activity_b,
    );

    persistence
        .merge_persons(
            survivor,
            loser,
            "Juan Pérez",
            &create_test_actor(),
            &create_test_cause(),
        )
        .expect("merge");

    let survivor_row: PersonRow = persistence.get_person(survivor).expect("person");
    assert_eq!(survivor_row.canonical_full_name.as_deref(), Some("Juan Pérez"));
    assert_eq!(survivor_row.display_name(), "Juan Pérez");
    // Inherited from the loser.
    assert_eq!(survivor_row.email.as_deref(), Some("juan@uni.cl"));

    let loser_row: PersonRow = persistence.get_person(loser).expect("person");
    assert!(loser_row.is_tombstone());
    assert_eq!(loser_row.merged_into_id, Some(survivor));
    assert_eq!(loser_row.email, None);
    assert_eq!(loser_row.national_id, None);
    // Names stay for the audit trail.
    assert_eq!(loser_row.raw_full_name, "Juán Pérez");
}

#[test]
fn test_merge_transfers_national_id_to_survivor() {
    let mut persistence: Persistence = create_test_persistence();
    let activity_a: i64 = create_test_activity(&mut persistence, "Fair");
    let (activity_b, _) = persistence
        .get_or_create_activity("Workshop", "Community", 2026, Audience::Students)
        .expect("activity");

    let survivor: i64 = seed_person_with_registration(
        &mut persistence,
        "Juan Perez",
        None,
        Some("juan@uni.cl"),
        activity_a,
    );
    let loser: i64 = seed_person_with_registration(
        &mut persistence,
        "Juán Pérez",
        Some("11111111-1"),
        None,
        activity_b,
    );

    persistence
        .merge_persons(
            survivor,
            loser,
            "Juan Pérez",
            &create_test_actor(),
            &create_test_cause(),
        )
        .expect("merge");

    let survivor_row: PersonRow = persistence.get_person(survivor).expect("person");
    assert_eq!(survivor_row.national_id.as_deref(), Some("11111111-1"));

    // The national ID is unique over live persons again.
    let found: Option<i64> = persistence
        .reconcile_preview(Some("11111111-1"), None)
        .expect("preview");
    assert_eq!(found, Some(survivor));
}

#[test]
fn test_merge_rejects_self_merge() {
    let mut persistence: Persistence = create_test_persistence();
    let activity: i64 = create_test_activity(&mut persistence, "Fair");
    let person: i64 =
        seed_person_with_registration(&mut persistence, "Juan Perez", None, None, activity);

    let result: Result<MergeOutcome, PersistenceError> = persistence.merge_persons(
        person,
        person,
        "Juan Perez",
        &create_test_actor(),
        &create_test_cause(),
    );
    assert!(matches!(
        result,
        Err(PersistenceError::InvariantViolation(_))
    ));
}

#[test]
fn test_merge_rejects_tombstone_participants() {
    let mut persistence: Persistence = create_test_persistence();
    let activity_a: i64 = create_test_activity(&mut persistence, "Fair");
    let (activity_b, _) = persistence
        .get_or_create_activity("Workshop", "Community", 2026, Audience::Students)
        .expect("activity");
    let (activity_c, _) = persistence
        .get_or_create_activity("Talk", "Community", 2026, Audience::Students)
        .expect("activity");

    let a: i64 =
        seed_person_with_registration(&mut persistence, "Juan Perez", None, None, activity_a);
    let b: i64 =
        seed_person_with_registration(&mut persistence, "Juán Pérez", None, None, activity_b);
    let c: i64 =
        seed_person_with_registration(&mut persistence, "J Perez", None, None, activity_c);

    persistence
        .merge_persons(a, b, "Juan Perez", &create_test_actor(), &create_test_cause())
        .expect("first merge");

    // b is now a tombstone; using it in either role must fail.
    let as_loser: Result<MergeOutcome, PersistenceError> = persistence.merge_persons(
        c,
        b,
        "Juan Perez",
        &create_test_actor(),
        &create_test_cause(),
    );
    assert!(matches!(
        as_loser,
        Err(PersistenceError::InvariantViolation(_))
    ));

    let as_survivor: Result<MergeOutcome, PersistenceError> = persistence.merge_persons(
        b,
        c,
        "Juan Perez",
        &create_test_actor(),
        &create_test_cause(),
    );
    assert!(matches!(
        as_survivor,
        Err(PersistenceError::InvariantViolation(_))
    ));
}

#[test]
fn test_merge_failure_rolls_back_registrations() {
    let mut persistence: Persistence = create_test_persistence();
    let activity_a: i64 = create_test_activity(&mut persistence, "Fair");
    let (activity_b, _) = persistence
        .get_or_create_activity("Workshop", "Community", 2026, Audience::Students)
        .expect("activity");

    let a: i64 =
        seed_person_with_registration(&mut persistence, "Juan Perez", None, None, activity_a);
    let b: i64 =
        seed_person_with_registration(&mut persistence, "Juán Pérez", None, None, activity_b);

    persistence
        .merge_persons(a, b, "Juan Perez", &create_test_actor(), &create_test_cause())
        .expect("merge");

    // The failing re-merge must leave the first merge's state intact.
    let failed: Result<MergeOutcome, PersistenceError> = persistence.merge_persons(
        a,
        b,
        "Another Name",
        &create_test_actor(),
        &create_test_cause(),
    );
    assert!(failed.is_err());

    let survivor_row: PersonRow = persistence.get_person(a).expect("person");
    assert_eq!(survivor_row.canonical_full_name.as_deref(), Some("Juan Perez"));
    assert_eq!(
        persistence
            .registrations_for_person(a)
            .expect("registrations")
            .len(),
        2
    );
}

#[test]
fn test_resolve_survivor_follows_and_compresses_chain() {
    let mut persistence: Persistence = create_test_persistence();
    let activity_a: i64 = create_test_activity(&mut persistence, "Fair");
    let (activity_b, _) = persistence
        .get_or_create_activity("Workshop", "Community", 2026, Audience::Students)
        .expect("activity");
    let (activity_c, _) = persistence
        .get_or_create_activity("Talk", "Community", 2026, Audience::Students)
        .expect("activity");

    let a: i64 =
        seed_person_with_registration(&mut persistence, "Juan Perez", None, None, activity_a);
    let b: i64 =
        seed_person_with_registration(&mut persistence, "Juán Pérez", None, None, activity_b);
    let c: i64 =
        seed_person_with_registration(&mut persistence, "J Perez", None, None, activity_c);

    // c -> b, then b -> a: resolving c must land on a.
    persistence
        .merge_persons(b, c, "Juan Perez", &create_test_actor(), &create_test_cause())
        .expect("merge c into b");
    persistence
        .merge_persons(a, b, "Juan Perez", &create_test_actor(), &create_test_cause())
        .expect("merge b into a");

    let resolved: i64 = persistence.resolve_survivor(c).expect("resolve");
    assert_eq!(resolved, a);

    // The chain is compressed: c now points directly at a.
    let c_row: PersonRow = persistence.get_person(c).expect("person");
    assert_eq!(c_row.merged_into_id, Some(a));
}

#[test]
fn test_merge_writes_audit_event_with_snapshots() {
    let mut persistence: Persistence = create_test_persistence();
    let activity_a: i64 = create_test_activity(&mut persistence, "Fair");
    let (activity_b, _) = persistence
        .get_or_create_activity("Workshop", "Community", 2026, Audience::Students)
        .expect("activity");

    let a: i64 =
        seed_person_with_registration(&mut persistence, "Juan Perez", None, None, activity_a);
    let b: i64 =
        seed_person_with_registration(&mut persistence, "Juán Pérez", None, None, activity_b);

    let outcome: MergeOutcome = persistence
        .merge_persons(a, b, "Juan Pérez", &create_test_actor(), &create_test_cause())
        .expect("merge");

    let trail = persistence.audit_for_entity("person", a).expect("trail");
    let merge_event = trail
        .iter()
        .find(|event| event.event_id == outcome.audit_event_id)
        .expect("merge event in trail");
    assert_eq!(merge_event.action_name, "MergePersons");
    assert!(merge_event.before_json.contains("Juan Perez"));
    assert!(merge_event.after_json.contains("Juan Pérez"));
}
