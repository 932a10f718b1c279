use super::report::{CollectionReport, Phase};
use crate::error::{MigrateError, Result};
use crate::store::{DocumentStream, SourceStore, TargetStore};
use bson::Document;
use tracing::info;

/// Replaces one target collection with the documents of the same source collection.
pub struct Copier<'a, S: ?Sized, T: ?Sized> {
    source: &'a S,
    target: &'a T,
    batch_size: usize,
    clear_empty: bool,
}

impl<'a, S, T> Copier<'a, S, T>
where
    S: SourceStore + ?Sized,
    T: TargetStore + ?Sized,
{
    /// create copier reading and writing `batch_size` documents at once.
    pub fn new(source: &'a S, target: &'a T, batch_size: usize) -> Self {
        Copier {
            source,
            target,
            batch_size: batch_size.max(1),
            clear_empty: false,
        }
    }

    /// also clear target collections whose source collection is empty.
    pub fn clear_empty(mut self, clear_empty: bool) -> Self {
        self.clear_empty = clear_empty;
        self
    }

    /// Copy collection `coll`: delete everything in target, then insert every source
    /// document, batch by batch.
    ///
    /// When source is empty target is left untouched, unless `clear_empty` is set.
    /// Delete and insert are not atomic, a reader of target may see the collection empty
    /// or half filled in between.
    pub fn copy_collection(&self, coll: &str) -> Result<CollectionReport> {
        info!(%coll, phase = %Phase::Read, "Begin to copy collection.");
        let mut cursor = self
            .source
            .documents(coll, self.batch_size)
            .map_err(|detail| MigrateError::Read {
                coll: coll.to_string(),
                detail,
            })?;

        let mut buffer = self.next_batch(&mut cursor, coll)?;
        if buffer.is_empty() {
            if !self.clear_empty {
                info!(%coll, inserted = 0u64, "Source collection is empty, skip it.");
                return Ok(CollectionReport::skipped(coll));
            }
            let deleted = self.clear(coll)?;
            info!(%coll, deleted, inserted = 0u64, "Source collection is empty, target cleared.");
            return Ok(CollectionReport {
                name: coll.to_string(),
                deleted,
                inserted: 0,
                skipped: false,
            });
        }

        let deleted = self.clear(coll)?;
        info!(%coll, phase = %Phase::Delete, deleted, "Target collection cleared.");

        let mut inserted = 0;
        while !buffer.is_empty() {
            inserted += self
                .target
                .insert_batch(coll, buffer)
                .map_err(|detail| MigrateError::Insert {
                    coll: coll.to_string(),
                    phase: Phase::Insert,
                    detail,
                })?;
            buffer = self.next_batch(&mut cursor, coll)?;
        }
        info!(%coll, phase = %Phase::Insert, deleted, inserted, "Copy collection complete.");

        Ok(CollectionReport {
            name: coll.to_string(),
            deleted,
            inserted,
            skipped: false,
        })
    }

    fn clear(&self, coll: &str) -> Result<u64> {
        self.target
            .clear(coll)
            .map_err(|detail| MigrateError::Insert {
                coll: coll.to_string(),
                phase: Phase::Delete,
                detail,
            })
    }

    /// pull at most `batch_size` documents from `cursor`, empty result means exhausted.
    fn next_batch(&self, cursor: &mut DocumentStream<'_>, coll: &str) -> Result<Vec<Document>> {
        let mut buffer = Vec::with_capacity(self.batch_size);
        for doc in cursor.by_ref().take(self.batch_size) {
            let doc = doc.map_err(|detail| MigrateError::Read {
                coll: coll.to_string(),
                detail,
            })?;
            buffer.push(doc);
        }
        Ok(buffer)
    }
}
