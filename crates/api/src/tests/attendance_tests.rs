// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use padron::UploadReport;
use padron_domain::Attendance;
use padron_persistence::{
    IndicatorDimensions, IndicatorFilter, Persistence, RegistrationRow,
};

use super::{create_test_actor, create_test_persistence, csv, metadata, seed_catalog, test_config};
use crate::{bulk_toggle_attendance, indicators_query, ingest_commit, toggle_attendance};

fn seed_upload(persistence: &mut Persistence) -> UploadReport {
    let bytes: Vec<u8> = csv(&[
        "Ada Lovelace,12.345.678-5,ada@uni.cl,Math,+56 9 1234 5678",
        "Bob Smith,,bob@uni.cl,History,+56 9 8765 4321",
    ]);
    ingest_commit(
        persistence,
        &bytes,
        "export.csv",
        None,
        &metadata("Welcome Fair"),
        &test_config(),
        &create_test_actor(),
        None,
    )
    .expect("commit")
}

#[test]
fn test_toggle_cycle_audits_and_moves_indicators() {
    let mut persistence: Persistence = create_test_persistence();
    seed_catalog(&mut persistence);
    let report: UploadReport = seed_upload(&mut persistence);

    let registration: RegistrationRow = persistence
        .registrations_for_batch(report.batch_id)
        .expect("registrations")
        .remove(0);

    let participations = |p: &mut Persistence| -> usize {
        indicators_query(
            p,
            IndicatorDimensions::default(),
            IndicatorFilter {
                activity_id: Some(report.activity_id),
            },
        )
        .expect("indicators")[0]
            .participations
    };

    assert_eq!(participations(&mut persistence), 0);

    toggle_attendance(
        &mut persistence,
        registration.registration_id,
        Attendance::Yes,
        "front-desk",
    )
    .expect("toggle to yes");
    assert_eq!(participations(&mut persistence), 1);

    toggle_attendance(
        &mut persistence,
        registration.registration_id,
        Attendance::Unknown,
        "front-desk",
    )
    .expect("toggle back");
    assert_eq!(participations(&mut persistence), 0);

    let trail = persistence
        .audit_for_entity("registration", registration.registration_id)
        .expect("trail");
    assert_eq!(trail.len(), 2);
    assert!(trail.iter().all(|event| event.actor_id == "front-desk"));
    assert_eq!(trail[0].action_details.as_deref(), Some("yes -> unknown"));
    assert_eq!(trail[1].action_details.as_deref(), Some("unknown -> yes"));
}

#[test]
fn test_bulk_toggle_covers_activity() {
    let mut persistence: Persistence = create_test_persistence();
    seed_catalog(&mut persistence);
    let report: UploadReport = seed_upload(&mut persistence);

    let changed: usize = bulk_toggle_attendance(
        &mut persistence,
        report.activity_id,
        Attendance::Yes,
        "front-desk",
    )
    .expect("bulk toggle");
    assert_eq!(changed, 2);

    let rows = indicators_query(
        &mut persistence,
        IndicatorDimensions::default(),
        IndicatorFilter {
            activity_id: Some(report.activity_id),
        },
    )
    .expect("indicators");
    assert_eq!(rows[0].participations, 2);
    assert_eq!(rows[0].conversion_rate, Some(1.0));
}

#[test]
fn test_bulk_toggle_on_missing_activity_fails() {
    let mut persistence: Persistence = create_test_persistence();
    let result = bulk_toggle_attendance(&mut persistence, 999, Attendance::Yes, "front-desk");
    assert!(result.is_err());
}

#[test]
fn test_indicators_group_by_dimensions() {
    let mut persistence: Persistence = create_test_persistence();
    seed_catalog(&mut persistence);
    seed_upload(&mut persistence);

    let bytes: Vec<u8> = csv(&["Carol Diaz,,carol@uni.cl,Physics,+56 9 5555 5555"]);
    ingest_commit(
        &mut persistence,
        &bytes,
        "second.csv",
        None,
        &metadata("Spring Workshop"),
        &test_config(),
        &create_test_actor(),
        None,
    )
    .expect("commit");

    let rows = indicators_query(
        &mut persistence,
        IndicatorDimensions {
            year: true,
            strategic_line: true,
            audience: true,
        },
        IndicatorFilter::default(),
    )
    .expect("indicators");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].year, Some(2026));
    assert_eq!(rows[0].strategic_line.as_deref(), Some("Community"));
    assert_eq!(rows[0].audience.as_deref(), Some("students"));
    assert_eq!(rows[0].registrations, 3);
    assert_eq!(rows[0].unique_persons_registered, 3);
}
