// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use padron::BatchState;

use super::{create_test_activity, create_test_persistence};
use crate::{Persistence, PersistenceError, UploadBatchRow};

#[test]
fn test_batch_lifecycle() {
    let mut persistence: Persistence = create_test_persistence();
    let activity_id: i64 = create_test_activity(&mut persistence, "Fair");

    let batch_id: i64 = persistence
        .create_upload_batch(
            activity_id,
            "export.csv",
            r#"["Nombre","RUT"]"#,
            r#"{"Nombre":"full_name","RUT":"national_id"}"#,
            BatchState::Mapped,
        )
        .expect("create batch");

    persistence
        .set_batch_state(batch_id, BatchState::Validating, None)
        .expect("advance state");
    persistence
        .finalize_upload_batch(batch_id, 10, 8, 2, BatchState::Reported, None)
        .expect("finalize");

    let batch: UploadBatchRow = persistence.get_upload_batch(batch_id).expect("batch");
    assert_eq!(batch.state, "reported");
    assert_eq!(batch.row_count, 10);
    assert_eq!(batch.valid_count, 8);
    assert_eq!(batch.invalid_count, 2);
    assert_eq!(batch.aborted_at_row, None);
    assert_eq!(batch.filename, "export.csv");
}

#[test]
fn test_aborted_batch_records_row_position() {
    let mut persistence: Persistence = create_test_persistence();
    let activity_id: i64 = create_test_activity(&mut persistence, "Fair");

    let batch_id: i64 = persistence
        .create_upload_batch(activity_id, "export.csv", "[]", "{}", BatchState::Mapped)
        .expect("create batch");
    persistence
        .finalize_upload_batch(batch_id, 4, 4, 0, BatchState::Aborted, Some(4))
        .expect("finalize aborted");

    let batch: UploadBatchRow = persistence.get_upload_batch(batch_id).expect("batch");
    assert_eq!(batch.state, "aborted");
    assert_eq!(batch.aborted_at_row, Some(4));
}

#[test]
fn test_list_batches_newest_first_and_by_activity() {
    let mut persistence: Persistence = create_test_persistence();
    let activity_a: i64 = create_test_activity(&mut persistence, "Fair");
    let activity_b: i64 = create_test_activity(&mut persistence, "Workshop");

    let first: i64 = persistence
        .create_upload_batch(activity_a, "one.csv", "[]", "{}", BatchState::Mapped)
        .expect("batch");
    let second: i64 = persistence
        .create_upload_batch(activity_a, "two.csv", "[]", "{}", BatchState::Mapped)
        .expect("batch");
    persistence
        .create_upload_batch(activity_b, "three.csv", "[]", "{}", BatchState::Mapped)
        .expect("batch");

    let for_a: Vec<UploadBatchRow> = persistence
        .list_upload_batches(Some(activity_a))
        .expect("list");
    let ids: Vec<i64> = for_a.iter().map(|b| b.batch_id).collect();
    assert_eq!(ids, vec![second, first]);

    let all: Vec<UploadBatchRow> = persistence.list_upload_batches(None).expect("list");
    assert_eq!(all.len(), 3);
}

#[test]
fn test_missing_batch_is_not_found() {
    let mut persistence: Persistence = create_test_persistence();
    let result: Result<UploadBatchRow, PersistenceError> = persistence.get_upload_batch(404);
    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
}
