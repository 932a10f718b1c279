//! Mongo copy lib, which replaces every collection of a target mongodb database with
//! the documents of the same collection in a source database.
//!
//! The run is one linear procedure: connect to both databases, list source collections,
//! then for each collection delete everything in target and insert every source document.
//! Collections which only exist in target are left alone.
//!
//! Delete and insert of one collection are not atomic: while a collection is being copied
//! any other reader of the target sees it empty or half filled.  Run it in a maintenance
//! window.
//!
//! # Example:
//! ```no_run
//! use mongo_copy::{migrate, Endpoint, MigrateConf};
//!
//! let conf = MigrateConf::new(
//!     Endpoint::new("mongodb://localhost:27017", "app"),
//!     Endpoint::new("mongodb://localhost:27018", "app"),
//! );
//! let report = migrate(&conf).unwrap();
//! println!("{} documents migrated", report.total_migrated());
//! ```
//!
//! The copy procedure is generic over [SourceStore] and [TargetStore], so it can also run
//! against any other store implementing them:
//! ```
//! use bson::doc;
//! use mongo_copy::store::memory::MemoryStore;
//! use mongo_copy::{Endpoint, MigrateConf, Migrator};
//!
//! let source = MemoryStore::new("src").with_collection("users", vec![doc! {"_id": 1}]);
//! let target = MemoryStore::new("dst");
//! let conf = MigrateConf::new(Endpoint::new("mem://src", "src"), Endpoint::new("mem://dst", "dst"));
//! let report = Migrator::new(&source, &target, &conf).run().unwrap();
//! assert_eq!(report.total_migrated(), 1);
//! ```

#![warn(missing_docs)]

#[doc(hidden)]
pub mod blocking;
mod config;
mod error;
pub mod store;

pub use blocking::migrator::{
    CollectionFailure, CollectionPlan, CollectionReport, CountCheck, Phase,
};
pub use blocking::{migrate, open_or_abort, Connection, Copier, MigrationReport, Migrator};
pub use config::{
    redact_uri, ConfFile, CopyConf, Endpoint, EndpointConf, ErrorPolicy, MigrateConf,
    DEFAULT_BATCH_SIZE,
};
pub use error::{Aborted, MigrateError, Result, EXIT_CONFIG, EXIT_FAILURE};
pub use store::{SourceStore, Store, StoreError, TargetStore};
