use super::migrator::CountCheck;
use crate::error::{MigrateError, EXIT_FAILURE};
use chrono::{DateTime, Utc};
use std::fmt;

/// Step of copying one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// reading source documents.
    Read,
    /// clearing target collection.
    Delete,
    /// inserting documents into target.
    Insert,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Read => "read",
            Phase::Delete => "delete",
            Phase::Insert => "insert",
        };
        f.write_str(name)
    }
}

/// Outcome of copying one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionReport {
    /// collection name.
    pub name: String,
    /// documents removed from target before inserting, for information only.
    pub deleted: u64,
    /// documents inserted into target.
    pub inserted: u64,
    /// source collection was empty, target was left alone.
    pub skipped: bool,
}

impl CollectionReport {
    /// report of empty source collection `name` which was left alone.
    pub fn skipped(name: &str) -> CollectionReport {
        CollectionReport {
            name: name.to_string(),
            deleted: 0,
            inserted: 0,
            skipped: true,
        }
    }
}

/// A collection whose copy failed while the run went on.
#[derive(Debug)]
pub struct CollectionFailure {
    /// collection name.
    pub name: String,
    /// why it failed.
    pub error: MigrateError,
}

/// Result of a whole run, kept in memory for reporting.
#[derive(Debug)]
pub struct MigrationReport {
    /// source database name.
    pub source_db: String,
    /// target database name.
    pub target_db: String,
    /// when the run began.
    pub started_at: DateTime<Utc>,
    /// when the run ended, None while running.
    pub finished_at: Option<DateTime<Utc>>,
    /// collections copied, in processing order.
    pub collections: Vec<CollectionReport>,
    /// collections which failed under the continue policy.
    pub failures: Vec<CollectionFailure>,
}

impl MigrationReport {
    /// begin report of a run from `source_db` to `target_db`, now.
    pub fn start(source_db: &str, target_db: &str) -> MigrationReport {
        MigrationReport {
            source_db: source_db.to_string(),
            target_db: target_db.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            collections: vec![],
            failures: vec![],
        }
    }

    /// add a copied collection.
    pub fn record(&mut self, coll: CollectionReport) {
        self.collections.push(coll);
    }

    /// add a failed collection.
    pub fn record_failure(&mut self, name: &str, error: MigrateError) {
        self.failures.push(CollectionFailure {
            name: name.to_string(),
            error,
        });
    }

    /// mark the run as ended, now.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// collections copied successfully, including the skipped empty ones.
    pub fn collections_processed(&self) -> usize {
        self.collections.len()
    }

    /// documents inserted into target across all collections.
    pub fn total_migrated(&self) -> u64 {
        self.collections.iter().map(|c| c.inserted).sum()
    }

    /// documents deleted from target across all collections.
    pub fn total_deleted(&self) -> u64 {
        self.collections.iter().map(|c| c.deleted).sum()
    }

    /// report of collection `name`, None when it was not copied.
    pub fn get(&self, name: &str) -> Option<&CollectionReport> {
        self.collections.iter().find(|c| c.name == name)
    }

    /// no collection failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// wall clock time of the run, None while still running.
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }

    /// process exit status of a finished run, `checks` are the counts from a verify pass.
    ///
    /// 0 when every collection was copied and every check matched, 1 otherwise.
    pub fn exit_code(&self, checks: Option<&[CountCheck]>) -> u8 {
        let mismatch = checks.map_or(false, |checks| checks.iter().any(|c| !c.is_match()));
        if self.is_success() && !mismatch {
            0
        } else {
            EXIT_FAILURE
        }
    }
}
