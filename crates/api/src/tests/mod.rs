// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod attendance_tests;

use padron::IngestConfig;
use padron_audit::Actor;
use padron_domain::Audience;
use padron_persistence::Persistence;

use crate::request_response::UploadMetadata;

pub const CSV_HEADERS: &str = "Nombre Completo,RUT,Correo Institucional,Carrera,Teléfono";

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

pub fn create_test_actor() -> Actor {
    Actor::operator("test-operator")
}

pub fn test_config() -> IngestConfig {
    IngestConfig {
        institution_email_suffixes: vec![String::from("uni.cl")],
        ..IngestConfig::default()
    }
}

/// Seeds the catalog entries every upload in these tests resolves
/// against.
pub fn seed_catalog(persistence: &mut Persistence) {
    for name in ["Community", "Academics"] {
        crate::catalog_create(
            persistence,
            padron_domain::CatalogKind::StrategicLine,
            name,
            "test-operator",
        )
        .expect("Failed to seed strategic line");
    }
    for name in ["Welcome Fair", "Spring Workshop"] {
        crate::catalog_create(
            persistence,
            padron_domain::CatalogKind::ActivityName,
            name,
            "test-operator",
        )
        .expect("Failed to seed activity name");
    }
}

pub fn metadata(activity_name: &str) -> UploadMetadata {
    UploadMetadata {
        activity_name: activity_name.to_string(),
        strategic_line: String::from("Community"),
        year: 2026,
        audience: Audience::Students,
    }
}

/// Builds a CSV with the standard headers and the given data lines.
pub fn csv(rows: &[&str]) -> Vec<u8> {
    let mut text: String = String::from(CSV_HEADERS);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    text.into_bytes()
}
