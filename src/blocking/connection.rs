use crate::config::{Endpoint, MigrateConf};
use crate::error::{MigrateError, Result};
use crate::store::{MongoStore, StoreError};
use mongodb::sync::Client;
use tracing::{debug, info};

/// Source and target mongodb connections for one run.
///
/// Both clients are released when the connection is dropped, so holding it in a scope
/// guarantees nothing leaks, even when the run stops half way.
pub struct Connection<'a> {
    source: MongoStore,
    target: MongoStore,
    config: &'a MigrateConf,
}

impl<'a> Connection<'a> {
    /// connect to source and target databases given by `config`.
    ///
    /// Fails with [MigrateError::Connection] when either server can't be reached or
    /// rejects our credentials.
    pub fn open(config: &'a MigrateConf) -> Result<Connection<'a>> {
        config.validate()?;
        let source = connect(config.get_source())?;
        let target = connect(config.get_target())?;
        info!(
            source = %config.get_source().get_redacted_uri(),
            target = %config.get_target().get_redacted_uri(),
            "Connected to source and target mongodb."
        );
        Ok(Connection {
            source,
            target,
            config,
        })
    }

    /// source database.
    pub fn source(&self) -> &MongoStore {
        &self.source
    }

    /// target database.
    pub fn target(&self) -> &MongoStore {
        &self.target
    }

    /// configuration the connection was opened with.
    pub fn get_conf(&self) -> &MigrateConf {
        self.config
    }
}

impl Drop for Connection<'_> {
    fn drop(&mut self) {
        debug!("Releasing source and target mongodb connections.");
    }
}

fn connect(endpoint: &Endpoint) -> Result<MongoStore> {
    let to_conn_err = |detail: StoreError| MigrateError::Connection {
        uri: endpoint.get_redacted_uri(),
        detail,
    };
    let client = Client::with_uri_str(endpoint.get_uri()).map_err(|e| to_conn_err(e.into()))?;
    let store = MongoStore::new(client.database(endpoint.get_db()));
    store.ping().map_err(to_conn_err)?;
    Ok(store)
}
