mod common;

use bson::doc;
use common::{assert_same_set, docs};
use mongo_copy::store::memory::{MemoryStore, WriteOp};
use mongo_copy::{Copier, MigrateError, Phase};

#[test]
fn test_copy_collection_in_batches() {
    let source = MemoryStore::new("src").with_collection("items", docs(5));
    let target = MemoryStore::new("dst").with_collection("items", docs(1));

    let report = Copier::new(&source, &target, 2)
        .copy_collection("items")
        .unwrap();

    assert_eq!(report.deleted, 1);
    assert_eq!(report.inserted, 5);
    assert!(!report.skipped);
    assert_eq!(
        target.journal(),
        vec![
            WriteOp::Clear("items".to_string()),
            WriteOp::Insert("items".to_string(), 2),
            WriteOp::Insert("items".to_string(), 2),
            WriteOp::Insert("items".to_string(), 1),
        ]
    );
    assert_same_set(&target.documents_of("items").unwrap(), &docs(5));
}

#[test]
fn test_copy_collection_batch_size_matches_count() {
    let source = MemoryStore::new("src").with_collection("items", docs(4));
    let target = MemoryStore::new("dst");

    let report = Copier::new(&source, &target, 4)
        .copy_collection("items")
        .unwrap();

    assert_eq!(report.inserted, 4);
    assert_eq!(
        target.journal(),
        vec![
            WriteOp::Clear("items".to_string()),
            WriteOp::Insert("items".to_string(), 4),
        ]
    );
}

#[test]
fn test_copy_missing_target_collection() {
    let source = MemoryStore::new("src").with_collection("fresh", docs(2));
    let target = MemoryStore::new("dst");

    let report = Copier::new(&source, &target, 100)
        .copy_collection("fresh")
        .unwrap();

    assert_eq!(report.deleted, 0);
    assert_eq!(report.inserted, 2);
    assert_same_set(&target.documents_of("fresh").unwrap(), &docs(2));
}

#[test]
fn test_copy_empty_collection_skips_target() {
    let source = MemoryStore::new("src").with_collection("empty", vec![]);
    let target = MemoryStore::new("dst").with_collection("empty", docs(3));

    let report = Copier::new(&source, &target, 100)
        .copy_collection("empty")
        .unwrap();

    assert!(report.skipped);
    assert_eq!(report.inserted, 0);
    assert!(target.journal().is_empty());
    assert_eq!(target.documents_of("empty").unwrap().len(), 3);
}

#[test]
fn test_copy_failed_read_after_clear_leaves_collection_partial() {
    let source = MemoryStore::new("src")
        .with_collection("items", docs(5))
        .failing_read_after("items", 3);
    let target = MemoryStore::new("dst").with_collection("items", docs(4));

    let err = Copier::new(&source, &target, 2)
        .copy_collection("items")
        .unwrap_err();

    assert!(matches!(err, MigrateError::Read { ref coll, .. } if coll == "items"));
    assert_eq!(
        target.journal(),
        vec![
            WriteOp::Clear("items".to_string()),
            WriteOp::Insert("items".to_string(), 2),
        ]
    );
    assert_same_set(&target.documents_of("items").unwrap(), &docs(2));
}

#[test]
fn test_copy_failed_clear_inserts_nothing() {
    let source = MemoryStore::new("src").with_collection("items", docs(2));
    let target = MemoryStore::new("dst")
        .with_collection("items", docs(3))
        .failing_clear("items");

    let err = Copier::new(&source, &target, 10)
        .copy_collection("items")
        .unwrap_err();

    assert!(matches!(
        err,
        MigrateError::Insert {
            phase: Phase::Delete,
            ..
        }
    ));
    assert_eq!(target.journal(), vec![WriteOp::Clear("items".to_string())]);
    assert_eq!(target.documents_of("items").unwrap().len(), 3);
}

#[test]
fn test_copy_failed_insert_leaves_collection_partial() {
    let source = MemoryStore::new("src").with_collection(
        "items",
        vec![doc! {"_id": 1}, doc! {"_id": 2, "blob": "y".repeat(128)}],
    );
    let target = MemoryStore::new("dst")
        .with_collection("items", docs(3))
        .with_max_document_size(32);

    let err = Copier::new(&source, &target, 10)
        .copy_collection("items")
        .unwrap_err();

    match err {
        MigrateError::Insert { coll, phase, .. } => {
            assert_eq!(coll, "items");
            assert_eq!(phase, Phase::Insert);
        }
        other => panic!("unexpected error {:?}", other),
    }
    // old documents are gone, only the one before the rejected document made it.
    assert_eq!(target.documents_of("items").unwrap(), vec![doc! {"_id": 1}]);
}
