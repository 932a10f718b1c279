use super::copier::Copier;
use super::report::{CollectionReport, MigrationReport};
use crate::config::{ErrorPolicy, MigrateConf};
use crate::error::{Aborted, MigrateError, Result};
use crate::store::{SourceStore, TargetStore};
use tracing::{error, info, warn};

/// Document count of one source collection, as found before copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionPlan {
    /// collection name.
    pub name: String,
    /// document count in source.
    pub documents: u64,
}

/// Source and target document counts of one collection after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountCheck {
    /// collection name.
    pub name: String,
    /// document count in source.
    pub source: u64,
    /// document count in target.
    pub target: u64,
}

impl CountCheck {
    /// source and target hold the same number of documents.
    pub fn is_match(&self) -> bool {
        self.source == self.target
    }
}

/// Copies every collection of `source` into `target`, one after another.
pub struct Migrator<'a, S: ?Sized, T: ?Sized> {
    source: &'a S,
    target: &'a T,
    batch_size: usize,
    on_error: ErrorPolicy,
    clear_empty: bool,
}

impl<'a, S, T> Migrator<'a, S, T>
where
    S: SourceStore + ?Sized,
    T: TargetStore + ?Sized,
{
    /// create migrator, only batch size, error policy and clear_empty of `conf` are used.
    pub fn new(source: &'a S, target: &'a T, conf: &MigrateConf) -> Self {
        Migrator {
            source,
            target,
            batch_size: conf.get_batch_size(),
            on_error: conf.get_error_policy(),
            clear_empty: conf.get_clear_empty(),
        }
    }

    /// Run the migration.
    ///
    /// Under [ErrorPolicy::Abort] the first failed collection stops the run, collections
    /// before it stay migrated, the failed one may be left cleared, the ones after it
    /// are untouched.  Under [ErrorPolicy::Continue] failures are collected in the
    /// returned report.  Failing to list collections always aborts.
    pub fn run(&self) -> std::result::Result<MigrationReport, Aborted> {
        let mut report =
            MigrationReport::start(self.source.database_name(), self.target.database_name());

        let coll_names = match self.list_collections() {
            Ok(names) => names,
            Err(cause) => {
                report.finish();
                return Err(Aborted { report, cause });
            }
        };
        info!(
            count = coll_names.len(),
            source_db = %report.source_db,
            target_db = %report.target_db,
            "Begin to migrate collections."
        );

        let copier = Copier::new(self.source, self.target, self.batch_size)
            .clear_empty(self.clear_empty);
        for coll in coll_names.iter() {
            match copier.copy_collection(coll) {
                Ok(coll_report) => report.record(coll_report),
                Err(cause) => match self.on_error {
                    ErrorPolicy::Abort => {
                        error!(%coll, error = %cause, "Copy collection failed, abort migration.");
                        report.finish();
                        return Err(Aborted { report, cause });
                    }
                    ErrorPolicy::Continue => {
                        warn!(%coll, error = %cause, "Copy collection failed, continue with next one.");
                        report.record_failure(coll, cause);
                    }
                },
            }
        }

        report.finish();
        info!(
            collections = report.collections_processed(),
            failed = report.failures.len(),
            total = report.total_migrated(),
            "Migration complete."
        );
        Ok(report)
    }

    /// Count documents of every source collection, without touching target.
    pub fn plan(&self) -> Result<Vec<CollectionPlan>> {
        let mut plans = vec![];
        for name in self.list_collections()? {
            let documents =
                self.source
                    .count_documents(&name)
                    .map_err(|detail| MigrateError::Read {
                        coll: name.clone(),
                        detail,
                    })?;
            info!(coll = %name, documents, "Planned collection.");
            plans.push(CollectionPlan { name, documents });
        }
        Ok(plans)
    }

    /// Compare source and target document counts of every collection copied in `report`.
    ///
    /// Skipped collections are left out, their target was never touched.
    pub fn verify(&self, report: &MigrationReport) -> Result<Vec<CountCheck>> {
        let mut checks = vec![];
        for coll in report.collections.iter().filter(|c| !c.skipped) {
            let check = self.count_check(coll)?;
            if check.is_match() {
                info!(coll = %check.name, documents = check.source, "Count check passed.");
            } else {
                warn!(
                    coll = %check.name,
                    source = check.source,
                    target = check.target,
                    "Count check failed."
                );
            }
            checks.push(check);
        }
        Ok(checks)
    }

    fn count_check(&self, coll: &CollectionReport) -> Result<CountCheck> {
        let source = self
            .source
            .count_documents(&coll.name)
            .map_err(|detail| MigrateError::Read {
                coll: coll.name.clone(),
                detail,
            })?;
        let target = self
            .target
            .count_documents(&coll.name)
            .map_err(|detail| MigrateError::Read {
                coll: coll.name.clone(),
                detail,
            })?;
        Ok(CountCheck {
            name: coll.name.clone(),
            source,
            target,
        })
    }

    fn list_collections(&self) -> Result<Vec<String>> {
        self.source
            .collection_names()
            .map_err(|detail| MigrateError::Enumeration {
                db: self.source.database_name().to_string(),
                detail,
            })
    }
}
