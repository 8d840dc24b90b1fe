//! Pluggable connect, create and delete behaviors.
//!
//! Each behavior is a plain function value. The defaults below can be passed
//! directly to the [`Options`](crate::Options) builder, as can closures that
//! return a boxed future.

use std::sync::Arc;

use futures::future::BoxFuture;
use sqlx::{Connection, Executor, PgConnection};

use crate::{
    error::{Error, Result},
    util::DatabaseName,
};

/// Opens a connection to the server at the given address
pub type ConnectFn =
    Arc<dyn for<'a> Fn(&'a str) -> BoxFuture<'a, Result<PgConnection>> + Send + Sync + 'static>;

/// Creates or deletes the named database over an open connection
pub type DatabaseFn = Arc<
    dyn for<'a> Fn(&'a mut PgConnection, &'a DatabaseName) -> BoxFuture<'a, Result<()>>
        + Send
        + Sync
        + 'static,
>;

/// Connect with sqlx using the address as a connection URL
pub fn default_connect(address: &str) -> BoxFuture<'_, Result<PgConnection>> {
    Box::pin(async move {
        tracing::debug!("Connecting to {}", address);
        PgConnection::connect(address)
            .await
            .map_err(|source| Error::ConnectionFailed {
                address: address.to_string(),
                source,
            })
    })
}

/// Issue `CREATE DATABASE <name>`
pub fn default_create_database<'a>(
    conn: &'a mut PgConnection,
    name: &'a DatabaseName,
) -> BoxFuture<'a, Result<()>> {
    execute(conn, format!("CREATE DATABASE {}", name))
}

/// Issue `DROP DATABASE <name>`
pub fn default_delete_database<'a>(
    conn: &'a mut PgConnection,
    name: &'a DatabaseName,
) -> BoxFuture<'a, Result<()>> {
    execute(conn, format!("DROP DATABASE {}", name))
}

/// Issue `DROP DATABASE <name> WITH (FORCE)`.
///
/// Use this when the test may leave connections open to the scratch database;
/// a plain drop fails while other sessions are attached. Requires PostgreSQL 13+.
pub fn force_delete_database<'a>(
    conn: &'a mut PgConnection,
    name: &'a DatabaseName,
) -> BoxFuture<'a, Result<()>> {
    execute(conn, format!("DROP DATABASE {} WITH (FORCE)", name))
}

fn execute(conn: &mut PgConnection, sql: String) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        tracing::debug!("Executing: {}", sql);
        conn.execute(sql.as_str()).await?;
        Ok(())
    })
}
