use super::{DocumentStream, SourceStore, Store, StoreError, StoreResult, TargetStore};
use bson::{doc, Document};
use mongodb::options::FindOptions;
use mongodb::sync::{Collection, Database};

/// A mongodb database, usable both as migration source and target.
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// wrap database handle `db`, no round trip is made.
    pub fn new(db: Database) -> MongoStore {
        MongoStore { db }
    }

    /// issue a `ping` command, it's the only way to know the server is reachable and
    /// we are authenticated, because mongodb client connects lazily.
    pub fn ping(&self) -> StoreResult<()> {
        self.db.run_command(doc! {"ping": 1}, None)?;
        Ok(())
    }

    fn coll(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }
}

impl Store for MongoStore {
    fn database_name(&self) -> &str {
        self.db.name()
    }

    fn count_documents(&self, coll: &str) -> StoreResult<u64> {
        Ok(self.coll(coll).count_documents(None, None)?)
    }
}

impl SourceStore for MongoStore {
    fn collection_names(&self) -> StoreResult<Vec<String>> {
        Ok(self.db.list_collection_names(None)?)
    }

    fn documents(&self, coll: &str, batch_size: usize) -> StoreResult<DocumentStream<'_>> {
        let batch_size = u32::try_from(batch_size).unwrap_or(u32::MAX);
        let cursor = self
            .coll(coll)
            .find(None, FindOptions::builder().batch_size(batch_size).build())?;
        Ok(Box::new(cursor.map(|doc| doc.map_err(StoreError::from))))
    }
}

impl TargetStore for MongoStore {
    fn clear(&self, coll: &str) -> StoreResult<u64> {
        // delete_many on a missing collection succeeds with 0 deleted.
        let res = self.coll(coll).delete_many(doc! {}, None)?;
        Ok(res.deleted_count)
    }

    fn insert_batch(&self, coll: &str, docs: Vec<Document>) -> StoreResult<u64> {
        if docs.is_empty() {
            return Ok(0);
        }
        let res = self.coll(coll).insert_many(docs, None)?;
        Ok(res.inserted_ids.len() as u64)
    }
}
