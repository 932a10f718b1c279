#![allow(dead_code)]
use bson::{doc, oid::ObjectId, Document};
use mongo_copy::{Endpoint, MigrateConf};

pub fn conf() -> MigrateConf {
    MigrateConf::new(
        Endpoint::new("mongodb://localhost:27017", "copy_test_source"),
        Endpoint::new("mongodb://localhost:27018", "copy_test_target"),
    )
}

/// `n` flat documents with integer ids.
pub fn docs(n: i32) -> Vec<Document> {
    (0..n).map(|i| doc! {"_id": i, "a": 3}).collect()
}

/// a document with nested mapping, list values and an ObjectId.
pub fn nested_doc() -> Document {
    doc! {
        "_id": ObjectId::new(),
        "name": "Main office renovation",
        "client": {"name": "Kim", "phone": "010-0000-0000"},
        "tags": ["interior", "urgent", 3, 4.5],
        "schedules": [
            {"title": "demolition", "done": true},
            {"title": "painting", "done": false, "assignees": ["a", "b"]}
        ],
        "budget": bson::Bson::Null,
    }
}

/// assert `left` and `right` hold the same documents, order doesn't matter.
pub fn assert_same_set(left: &[Document], right: &[Document]) {
    assert_eq!(left.len(), right.len(), "{:?} != {:?}", left, right);
    for doc in left {
        assert!(right.contains(doc), "{:?} is missing in {:?}", doc, right);
    }
}
