/// provide mongo copy blocking apis.
mod connection;
#[doc(hidden)]
pub mod migrator;

use crate::config::MigrateConf;
use crate::error::Aborted;

pub use connection::Connection;
pub use migrator::{Copier, MigrationReport, Migrator};

/// Connect to source and target given by `conf`, copy every collection, disconnect.
///
/// Connections are dropped before returning, whatever the outcome is.
pub fn migrate(conf: &MigrateConf) -> Result<MigrationReport, Aborted> {
    let conn = open_or_abort(conf)?;
    let migrator = Migrator::new(conn.source(), conn.target(), conf);
    migrator.run()
}

/// Connect and open [Connection], a failure is turned into an [Aborted] with an
/// empty report, nothing was migrated.
pub fn open_or_abort(conf: &MigrateConf) -> Result<Connection<'_>, Aborted> {
    Connection::open(conf).map_err(|cause| {
        let mut report =
            MigrationReport::start(conf.get_source().get_db(), conf.get_target().get_db());
        report.finish();
        Aborted { report, cause }
    })
}
