// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use padron_audit::{Actor, Cause};
use padron_domain::{Attendance, Audience, Source};

use super::{attrs, create_test_actor, create_test_cause, create_test_persistence};
use crate::{
    IndicatorDimensions, IndicatorFilter, IndicatorRow, Persistence, ReviewDecision,
    ReviewListFilter,
};

/// Seeds two activities in different years with three persons:
/// Ada and Bob in 2025 (Ada attended), Ada again in 2026 (attended).
fn seed_registry(persistence: &mut Persistence) {
    let actor: Actor = create_test_actor();
    let cause: Cause = create_test_cause();

    let (fair_2025, _) = persistence
        .get_or_create_activity("Fair", "Community", 2025, Audience::Students)
        .expect("activity");
    let (fair_2026, _) = persistence
        .get_or_create_activity("Fair", "Community", 2026, Audience::Students)
        .expect("activity");

    for (name, national_id, activity_id, attended) in [
        ("Ada Lovelace", "12345678-5", fair_2025, true),
        ("Bob Smith", "11111111-1", fair_2025, false),
        ("Ada Lovelace", "12345678-5", fair_2026, true),
    ] {
        let result = persistence
            .persist_ingested_row(
                &attrs(name, Some(national_id), None),
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
            .expect("row");
        if attended {
            persistence
                .toggle_attendance(result.registration_id, Attendance::Yes, &actor, &cause)
                .expect("toggle");
        }
    }
}

#[test]
fn test_totals_without_dimensions() {
    let mut persistence: Persistence = create_test_persistence();
    seed_registry(&mut persistence);

    let rows: Vec<IndicatorRow> = persistence
        .indicators(IndicatorDimensions::default(), IndicatorFilter::default())
        .expect("indicators");

    assert_eq!(rows.len(), 1);
    let total: &IndicatorRow = &rows[0];
    assert_eq!(total.registrations, 3);
    assert_eq!(total.participations, 2);
    assert_eq!(total.unique_persons_registered, 2);
    assert_eq!(total.unique_persons_participated, 1);
    assert_eq!(total.conversion_rate, Some(0.67));
}

#[test]
fn test_grouping_by_year() {
    let mut persistence: Persistence = create_test_persistence();
    seed_registry(&mut persistence);

    let rows: Vec<IndicatorRow> = persistence
        .indicators(
            IndicatorDimensions {
                year: true,
                ..IndicatorDimensions::default()
            },
            IndicatorFilter::default(),
        )
        .expect("indicators");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].year, Some(2025));
    assert_eq!(rows[0].registrations, 2);
    assert_eq!(rows[0].participations, 1);
    assert_eq!(rows[0].conversion_rate, Some(0.5));
    assert_eq!(rows[1].year, Some(2026));
    assert_eq!(rows[1].registrations, 1);
    assert_eq!(rows[1].conversion_rate, Some(1.0));
}

#[test]
fn test_participations_never_exceed_registrations() {
    let mut persistence: Persistence = create_test_persistence();
    seed_registry(&mut persistence);

    let rows: Vec<IndicatorRow> = persistence
        .indicators(
            IndicatorDimensions {
                year: true,
                strategic_line: true,
                audience: true,
            },
            IndicatorFilter::default(),
        )
        .expect("indicators");

    for row in &rows {
        assert!(row.participations <= row.registrations);
        assert!(row.unique_persons_registered <= row.registrations);
        assert!(row.unique_persons_participated <= row.participations);
    }
}

#[test]
fn test_activity_filter_restricts_rows() {
    let mut persistence: Persistence = create_test_persistence();
    seed_registry(&mut persistence);

    let (fair_2026, _) = persistence
        .get_or_create_activity("Fair", "Community", 2026, Audience::Students)
        .expect("activity");

    let rows: Vec<IndicatorRow> = persistence
        .indicators(
            IndicatorDimensions::default(),
            IndicatorFilter {
                activity_id: Some(fair_2026),
            },
        )
        .expect("indicators");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].registrations, 1);
}

#[test]
fn test_audience_is_read_from_person_not_program() {
    let mut persistence: Persistence = create_test_persistence();
    let actor: Actor = create_test_actor();
    let cause: Cause = create_test_cause();

    let (activity_id, _) = persistence
        .get_or_create_activity("Staff Day", "Community", 2026, Audience::Staff)
        .expect("activity");

    // The program text says "Estudiante" but the upload declared staff.
    let mut staff_attrs = attrs("Carla Ruiz", Some("12345678-5"), None);
    staff_attrs.career = Some(String::from("Estudiante de apoyo"));
    persistence
        .persist_ingested_row(
            &staff_attrs,
            Audience::Staff,
            activity_id,
            Source::Csv,
            &[],
            "{}",
            None,
            None,
            &actor,
            &cause,
        )
        .expect("row");

    let rows: Vec<IndicatorRow> = persistence
        .indicators(
            IndicatorDimensions {
                audience: true,
                ..IndicatorDimensions::default()
            },
            IndicatorFilter::default(),
        )
        .expect("indicators");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].audience.as_deref(), Some("staff"));
}

#[test]
fn test_merge_consolidates_unique_person_counts() {
    let mut persistence: Persistence = create_test_persistence();
    let actor: Actor = create_test_actor();
    let cause: Cause = create_test_cause();

    let (fair, _) = persistence
        .get_or_create_activity("Fair", "Community", 2026, Audience::Students)
        .expect("activity");
    let (workshop, _) = persistence
        .get_or_create_activity("Workshop", "Community", 2026, Audience::Students)
        .expect("activity");

    let first = persistence
        .persist_ingested_row(
            &attrs("Juan Perez", Some("11111111-1"), None),
            Audience::Students,
            fair,
            Source::Csv,
            &[],
            "{}",
            None,
            None,
            &actor,
            &cause,
        )
        .expect("row");
    let second = persistence
        .persist_ingested_row(
            &attrs("Juán Pérez", None, Some("juan@uni.cl")),
            Audience::Students,
            workshop,
            Source::Csv,
            &[],
            "{}",
            None,
            None,
            &actor,
            &cause,
        )
        .expect("row");

    let before: Vec<IndicatorRow> = persistence
        .indicators(IndicatorDimensions::default(), IndicatorFilter::default())
        .expect("indicators");
    assert_eq!(before[0].unique_persons_registered, 2);

    persistence
        .merge_persons(
            first.person_id,
            second.person_id,
            "Juan Pérez",
            &actor,
            &cause,
        )
        .expect("merge");

    let after: Vec<IndicatorRow> = persistence
        .indicators(IndicatorDimensions::default(), IndicatorFilter::default())
        .expect("indicators");
    assert_eq!(after[0].registrations, 2);
    assert_eq!(after[0].unique_persons_registered, 1);
}

#[test]
fn test_attendance_toggle_moves_participations_symmetrically() {
    let mut persistence: Persistence = create_test_persistence();
    let actor: Actor = create_test_actor();
    let cause: Cause = create_test_cause();

    let (activity_id, _) = persistence
        .get_or_create_activity("Fair", "Community", 2026, Audience::Students)
        .expect("activity");
    let result = persistence
        .persist_ingested_row(
            &attrs("Ada Lovelace", Some("12345678-5"), None),
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
        .expect("row");

    let participations = |p: &mut Persistence| -> usize {
        p.indicators(IndicatorDimensions::default(), IndicatorFilter::default())
            .expect("indicators")[0]
            .participations
    };

    assert_eq!(participations(&mut persistence), 0);

    persistence
        .toggle_attendance(result.registration_id, Attendance::Yes, &actor, &cause)
        .expect("toggle");
    assert_eq!(participations(&mut persistence), 1);

    persistence
        .toggle_attendance(result.registration_id, Attendance::Unknown, &actor, &cause)
        .expect("toggle back");
    assert_eq!(participations(&mut persistence), 0);
}

#[test]
fn test_decided_review_item_keeps_indicators_consistent() {
    let mut persistence: Persistence = create_test_persistence();
    let actor: Actor = create_test_actor();
    let cause: Cause = create_test_cause();

    let (fair, _) = persistence
        .get_or_create_activity("Fair", "Community", 2026, Audience::Students)
        .expect("activity");
    let (workshop, _) = persistence
        .get_or_create_activity("Workshop", "Community", 2026, Audience::Students)
        .expect("activity");

    let first = persistence
        .persist_ingested_row(
            &attrs("Juan Perez", Some("11111111-1"), None),
            Audience::Students,
            fair,
            Source::Csv,
            &[],
            "{}",
            None,
            None,
            &actor,
            &cause,
        )
        .expect("row");
    let second = persistence
        .persist_ingested_row(
            &attrs("Juán Pérez", None, Some("juan@uni.cl")),
            Audience::Students,
            workshop,
            Source::Csv,
            &[],
            "{}",
            None,
            None,
            &actor,
            &cause,
        )
        .expect("row");

    persistence
        .insert_review_candidates(&[padron::CandidatePair {
            left_id: first.person_id.min(second.person_id),
            right_id: first.person_id.max(second.person_id),
            similarity: 100.0,
            audience: Audience::Students,
        }])
        .expect("insert");

    let (items, _) = persistence
        .list_review_items(&ReviewListFilter::default(), 1, 10)
        .expect("list");
    persistence
        .decide_review_item(
            items[0].item_id,
            items[0].version,
            &ReviewDecision::Accept {
                canonical_person_id: first.person_id,
                canonical_name: String::from("Juan Pérez"),
            },
            "reviewer",
            &cause,
        )
        .expect("accept");

    let rows: Vec<IndicatorRow> = persistence
        .indicators(IndicatorDimensions::default(), IndicatorFilter::default())
        .expect("indicators");
    assert_eq!(rows[0].registrations, 2);
    assert_eq!(rows[0].unique_persons_registered, 1);
}
