use std::{fmt, sync::Arc};

use futures::future::BoxFuture;
use sqlx::PgConnection;

use crate::{
    backend::{
        default_connect, default_create_database, default_delete_database, ConnectFn, DatabaseFn,
    },
    env::{base_address_from_env, resolve_base_address},
    error::Result,
    util::DatabaseName,
};

/// Configuration for provisioning a scratch database
#[derive(Clone)]
pub struct Options {
    /// Explicit base server address; falls back to the environment, then the default
    pub base_address: Option<String>,
    /// Opens connections to the base server
    pub connect: ConnectFn,
    /// Creates the scratch database
    pub create_database: DatabaseFn,
    /// Deletes the scratch database on cleanup. `None` disables cleanup.
    pub delete_database: Option<DatabaseFn>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            base_address: None,
            connect: Arc::new(default_connect),
            create_database: Arc::new(default_create_database),
            delete_database: Some(Arc::new(default_delete_database)),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("base_address", &self.base_address)
            .field("cleanup", &self.delete_database.is_some())
            .finish_non_exhaustive()
    }
}

impl Options {
    /// Options with the default behaviors
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base server address
    pub fn base_address(mut self, address: impl Into<String>) -> Self {
        self.base_address = Some(address.into());
        self
    }

    /// Set the function used to open connections to the base server
    pub fn connect_with<F>(mut self, connect: F) -> Self
    where
        F: for<'a> Fn(&'a str) -> BoxFuture<'a, Result<PgConnection>> + Send + Sync + 'static,
    {
        self.connect = Arc::new(connect);
        self
    }

    /// Set the function used to create the scratch database
    pub fn create_database_with<F>(mut self, create: F) -> Self
    where
        F: for<'a> Fn(&'a mut PgConnection, &'a DatabaseName) -> BoxFuture<'a, Result<()>>
            + Send
            + Sync
            + 'static,
    {
        self.create_database = Arc::new(create);
        self
    }

    /// Set the function used to delete the scratch database
    pub fn delete_database_with<F>(mut self, delete: F) -> Self
    where
        F: for<'a> Fn(&'a mut PgConnection, &'a DatabaseName) -> BoxFuture<'a, Result<()>>
            + Send
            + Sync
            + 'static,
    {
        self.delete_database = Some(Arc::new(delete));
        self
    }

    /// Leave the scratch database in place after the test
    pub fn without_cleanup(mut self) -> Self {
        self.delete_database = None;
        self
    }

    /// The base address these options resolve to right now
    pub fn resolved_base_address(&self) -> String {
        resolve_base_address(self.base_address.as_deref(), base_address_from_env())
    }
}
