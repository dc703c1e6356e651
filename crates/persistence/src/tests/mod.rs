// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod indicator_tests;
mod merge_tests;
mod registry_tests;
mod upload_tests;

use padron_audit::{Actor, Cause};
use padron_domain::Audience;

use crate::{Persistence, PersonAttributes};

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

pub fn create_test_actor() -> Actor {
    Actor::operator("test-operator")
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

pub fn attrs(
    raw_name: &str,
    national_id: Option<&str>,
    email: Option<&str>,
) -> PersonAttributes {
    PersonAttributes {
        raw_full_name: raw_name.to_string(),
        normalized_full_name: padron_domain::normalize_name(raw_name),
        national_id: national_id.map(str::to_string),
        email: email.map(str::to_string),
        career: Some(String::from("Math")),
        phone: None,
    }
}

/// Creates a test activity and returns its id.
pub fn create_test_activity(persistence: &mut Persistence, name: &str) -> i64 {
    let (activity_id, _) = persistence
        .get_or_create_activity(name, "Community", 2026, Audience::Students)
        .expect("Failed to create test activity");
    activity_id
}

/// Creates a person via the reconcile path and returns its id.
pub fn create_test_person(
    persistence: &mut Persistence,
    raw_name: &str,
    national_id: Option<&str>,
    email: Option<&str>,
) -> i64 {
    let activity_id: i64 = create_test_activity(persistence, "Seed Activity");
    seed_person_with_registration(persistence, raw_name, national_id, email, activity_id)
}

/// Creates a person registered to the given activity and returns the
/// person id.
pub fn seed_person_with_registration(
    persistence: &mut Persistence,
    raw_name: &str,
    national_id: Option<&str>,
    email: Option<&str>,
    activity_id: i64,
) -> i64 {
    let result = persistence
        .persist_ingested_row(
            &attrs(raw_name, national_id, email),
            Audience::Students,
            activity_id,
            padron_domain::Source::Csv,
            &[],
            "{}",
            None,
            None,
            &create_test_actor(),
            &create_test_cause(),
        )
        .expect("Failed to persist test row");
    result.person_id
}
