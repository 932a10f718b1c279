use crate::blocking::migrator::{MigrationReport, Phase};
use crate::store::StoreError;
use std::result::Result as StdResult;
use thiserror::Error;

/// Process exit status of a run which failed to connect, read or write.
pub const EXIT_FAILURE: u8 = 1;
/// Process exit status of an invalid configuration.
pub const EXIT_CONFIG: u8 = 2;

/// Error happened while preparing or running a migration.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// configuration is missing a value or is not usable.
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// a server can't be reached, `uri` has its password masked.
    #[error("Connect to {uri:?} failed, detailed: {detail}")]
    Connection {
        /// redacted connection string.
        uri: String,
        /// driver error.
        detail: StoreError,
    },
    /// collection names of the source database can't be listed.
    #[error("List collections of database {db:?} failed, detailed: {detail}")]
    Enumeration {
        /// source database name.
        db: String,
        /// driver error.
        detail: StoreError,
    },
    /// reading documents of a source collection failed.
    #[error("Read source collection {coll:?} failed, detailed: {detail}")]
    Read {
        /// collection name.
        coll: String,
        /// driver error.
        detail: StoreError,
    },
    /// clearing or inserting into a target collection failed.
    #[error("Write target collection {coll:?} failed during {phase}, detailed: {detail}")]
    Insert {
        /// collection name.
        coll: String,
        /// [Phase::Delete] or [Phase::Insert].
        phase: Phase,
        /// driver error.
        detail: StoreError,
    },
}

impl MigrateError {
    /// name of the collection this error happened on, if any.
    pub fn collection(&self) -> Option<&str> {
        match self {
            MigrateError::Read { coll, .. } | MigrateError::Insert { coll, .. } => Some(coll),
            _ => None,
        }
    }

    /// Connection and enumeration errors stop the run whatever the error policy is.
    pub fn is_fatal(&self) -> bool {
        self.collection().is_none()
    }

    /// process exit status this error should end the program with.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_) => EXIT_CONFIG,
            _ => EXIT_FAILURE,
        }
    }
}

/// A run stopped before every collection was processed.
///
/// `report` holds the collections which were fully migrated before `cause` happened.
#[derive(Error, Debug)]
#[error("Migration aborted: {cause}")]
pub struct Aborted {
    /// what was done before the run stopped.
    pub report: MigrationReport,
    /// why the run stopped.
    #[source]
    pub cause: MigrateError,
}

/// Result type of this crate.
pub type Result<T> = StdResult<T, MigrateError>;
