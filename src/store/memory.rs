//! In process document store.
//!
//! Keeps collections in insertion order, can be told to reject oversized documents,
//! to fail listing collections, clearing or reading a collection, and journals every
//! write it receives.
use super::{DocumentStream, SourceStore, Store, StoreError, StoreResult, TargetStore};
use bson::Document;
use std::cell::RefCell;

/// A write operation received by [MemoryStore].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// clear of the named collection.
    Clear(String),
    /// insert of a batch of that many documents into the named collection.
    Insert(String, usize),
}

/// Document store living in process memory, single threaded.
#[derive(Default)]
pub struct MemoryStore {
    name: String,
    colls: RefCell<Vec<(String, Vec<Document>)>>,
    journal: RefCell<Vec<WriteOp>>,
    max_document_size: Option<usize>,
    fail_listing: bool,
    fail_clear: Option<String>,
    fail_read: Option<(String, usize)>,
}

impl MemoryStore {
    /// create an empty store for database `name`.
    pub fn new(name: &str) -> MemoryStore {
        MemoryStore {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// add (or replace) collection `coll` holding `docs`.
    pub fn with_collection(self, coll: &str, docs: Vec<Document>) -> MemoryStore {
        self.put(coll, docs);
        self
    }

    /// reject any inserted document whose bson encoding is larger than `size` bytes.
    pub fn with_max_document_size(mut self, size: usize) -> MemoryStore {
        self.max_document_size = Some(size);
        self
    }

    /// make `collection_names` fail, as if permission was denied.
    pub fn failing_listing(mut self) -> MemoryStore {
        self.fail_listing = true;
        self
    }

    /// make `clear` of collection `coll` fail, nothing is deleted.
    pub fn failing_clear(mut self, coll: &str) -> MemoryStore {
        self.fail_clear = Some(coll.to_string());
        self
    }

    /// make reading collection `coll` fail after `n` documents were yielded.
    pub fn failing_read_after(mut self, coll: &str, n: usize) -> MemoryStore {
        self.fail_read = Some((coll.to_string(), n));
        self
    }

    /// set documents of collection `coll`, creating it when missing.
    pub fn put(&self, coll: &str, docs: Vec<Document>) {
        let mut colls = self.colls.borrow_mut();
        match colls.iter_mut().find(|(name, _)| name == coll) {
            Some((_, existing)) => *existing = docs,
            None => colls.push((coll.to_string(), docs)),
        }
    }

    /// documents of `coll`, None when the collection doesn't exist.
    pub fn documents_of(&self, coll: &str) -> Option<Vec<Document>> {
        self.colls
            .borrow()
            .iter()
            .find(|(name, _)| name == coll)
            .map(|(_, docs)| docs.clone())
    }

    /// every write received so far, in order.
    pub fn journal(&self) -> Vec<WriteOp> {
        self.journal.borrow().clone()
    }

    fn check_size(&self, doc: &Document) -> StoreResult<()> {
        let max = match self.max_document_size {
            Some(max) => max,
            None => return Ok(()),
        };
        let mut buf = Vec::new();
        doc.to_writer(&mut buf)
            .map_err(|e| StoreError::Rejected(e.to_string()))?;
        if buf.len() > max {
            return Err(StoreError::Rejected(format!(
                "document is {} bytes, limit is {} bytes",
                buf.len(),
                max
            )));
        }
        Ok(())
    }
}

impl Store for MemoryStore {
    fn database_name(&self) -> &str {
        &self.name
    }

    fn count_documents(&self, coll: &str) -> StoreResult<u64> {
        Ok(self.documents_of(coll).map_or(0, |docs| docs.len() as u64))
    }
}

impl SourceStore for MemoryStore {
    fn collection_names(&self) -> StoreResult<Vec<String>> {
        if self.fail_listing {
            return Err(StoreError::Rejected(format!(
                "not authorized on {} to execute command listCollections",
                self.name
            )));
        }
        Ok(self
            .colls
            .borrow()
            .iter()
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn documents(&self, coll: &str, _batch_size: usize) -> StoreResult<DocumentStream<'_>> {
        let docs = self.documents_of(coll).unwrap_or_default();
        match &self.fail_read {
            Some((name, n)) if name == coll => {
                let err = StoreError::Rejected(format!("cursor of {} killed", coll));
                let stream = docs
                    .into_iter()
                    .take(*n)
                    .map(Ok)
                    .chain(std::iter::once(Err(err)));
                Ok(Box::new(stream))
            }
            _ => Ok(Box::new(docs.into_iter().map(Ok))),
        }
    }
}

impl TargetStore for MemoryStore {
    fn clear(&self, coll: &str) -> StoreResult<u64> {
        self.journal
            .borrow_mut()
            .push(WriteOp::Clear(coll.to_string()));
        if self.fail_clear.as_deref() == Some(coll) {
            return Err(StoreError::Rejected(format!(
                "not authorized on {} to execute command delete on {}",
                self.name, coll
            )));
        }
        let mut colls = self.colls.borrow_mut();
        match colls.iter_mut().find(|(name, _)| name == coll) {
            Some((_, docs)) => Ok(std::mem::take(docs).len() as u64),
            None => Ok(0),
        }
    }

    fn insert_batch(&self, coll: &str, docs: Vec<Document>) -> StoreResult<u64> {
        self.journal
            .borrow_mut()
            .push(WriteOp::Insert(coll.to_string(), docs.len()));
        let mut colls = self.colls.borrow_mut();
        let idx = match colls.iter().position(|(name, _)| name == coll) {
            Some(idx) => idx,
            None => {
                colls.push((coll.to_string(), Vec::new()));
                colls.len() - 1
            }
        };

        // ordered insert: documents before the rejected one stay inserted.
        let mut inserted = 0;
        for doc in docs {
            self.check_size(&doc)?;
            colls[idx].1.push(doc);
            inserted += 1;
        }
        Ok(inserted)
    }
}
