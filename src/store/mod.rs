//! Document stores the migration reads from and writes to.
//!
//! [MongoStore] talks to a real mongodb database, [memory::MemoryStore] keeps
//! everything in process and is what the test suite runs the migration against.
use bson::Document;
use mongodb::error::Error as MongoError;
use std::result::Result as StdResult;
use thiserror::Error;

#[doc(hidden)]
pub mod memory;
mod mongo;

pub use mongo::MongoStore;

/// Failure reported by a document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// error from mongodb driver or server.
    #[error("mongodb error: {0}")]
    Mongo(#[from] MongoError),
    /// operation refused by a store which isn't mongodb.
    #[error("rejected by store: {0}")]
    Rejected(String),
}

/// Result type of store operations.
pub type StoreResult<T> = StdResult<T, StoreError>;

/// Documents of one collection, yielded in server order.
pub type DocumentStream<'a> = Box<dyn Iterator<Item = StoreResult<Document>> + 'a>;

/// Operations shared by source and target databases.
pub trait Store {
    /// name of the database this store is bound to.
    fn database_name(&self) -> &str;

    /// count documents in collection `coll`, 0 when the collection doesn't exist.
    fn count_documents(&self, coll: &str) -> StoreResult<u64>;
}

/// Database which documents are copied from.
pub trait SourceStore: Store {
    /// list all collection names, in the order the database reports them.
    fn collection_names(&self) -> StoreResult<Vec<String>>;

    /// open a cursor over every document in `coll`.
    ///
    /// `batch_size` is a hint for how many documents one round trip should fetch.
    fn documents(&self, coll: &str, batch_size: usize) -> StoreResult<DocumentStream<'_>>;
}

/// Database which documents are copied into.
pub trait TargetStore: Store {
    /// delete every document in `coll`, return how many were deleted.
    ///
    /// Clearing a collection which doesn't exist is a no-op.
    fn clear(&self, coll: &str) -> StoreResult<u64>;

    /// insert `docs` into `coll` as they are, return how many were inserted.
    fn insert_batch(&self, coll: &str, docs: Vec<Document>) -> StoreResult<u64>;
}
