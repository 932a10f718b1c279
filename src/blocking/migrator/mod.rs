#[doc(hidden)]
pub mod copier;
#[allow(clippy::module_inception)]
mod migrator;
mod report;

pub use copier::Copier;
pub use migrator::{CollectionPlan, CountCheck, Migrator};
pub use report::{CollectionFailure, CollectionReport, MigrationReport, Phase};
