use sqlx::{Connection, PgConnection};

use crate::{
    backend::{ConnectFn, DatabaseFn},
    error::{Error, Result},
    options::Options,
    util::{database_url, DatabaseName},
};

/// A scratch database that lives for the duration of one test.
///
/// Dropping the value drops the database on the base server, including when
/// the test panics. Cleanup runs at most once.
pub struct TestDatabase {
    name: DatabaseName,
    url: String,
    base_address: String,
    connect: ConnectFn,
    delete_database: Option<DatabaseFn>,
}

impl std::fmt::Debug for TestDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestDatabase")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("cleanup", &self.delete_database.is_some())
            .finish()
    }
}

impl TestDatabase {
    /// Create a scratch database, failing the current test on any error.
    ///
    /// # Panics
    ///
    /// Panics if connecting to the base server, generating the name, creating
    /// the database or building the connection string fails.
    pub async fn new(options: Options) -> Self {
        match Self::try_new(options).await {
            Ok(db) => db,
            Err(err) => panic!("Failed to create test database: {}", err),
        }
    }

    /// Create a scratch database on the base server described by `options`
    pub async fn try_new(options: Options) -> Result<Self> {
        let base_address = options.resolved_base_address();

        let mut conn = (options.connect)(&base_address).await?;
        let name = DatabaseName::generate()?;

        tracing::debug!("Creating database: {}", name);
        (options.create_database)(&mut conn, &name).await?;
        close(conn).await;

        // From here on the database exists, so an error must still drop it
        let mut db = Self {
            name,
            url: String::new(),
            base_address,
            connect: options.connect,
            delete_database: options.delete_database,
        };
        db.url = database_url(&db.base_address, &db.name)?;

        Ok(db)
    }

    /// The connection string of the scratch database
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The name of the scratch database
    pub fn name(&self) -> &DatabaseName {
        &self.name
    }

    /// The base server the database was created on
    pub fn base_address(&self) -> &str {
        &self.base_address
    }

    /// Open a connection to the scratch database with the configured connect function
    pub async fn connect(&self) -> Result<PgConnection> {
        (self.connect)(&self.url).await
    }

    /// Drop the database now instead of when the value goes out of scope
    pub async fn cleanup(mut self) -> Result<()> {
        match self.delete_database.take() {
            Some(delete) => {
                drop_database(&self.connect, &self.base_address, &self.name, &delete).await
            }
            None => Ok(()),
        }
    }

    /// Run cleanup from synchronous code.
    ///
    /// The delete runs on its own thread with a private runtime, so this is
    /// safe to call from inside any tokio runtime flavor or outside one.
    fn blocking_cleanup(&mut self, delete: DatabaseFn) -> Result<()> {
        let connect = self.connect.clone();
        let base_address = self.base_address.clone();
        let name = self.name.clone();

        std::thread::spawn(move || -> Result<()> {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            rt.block_on(drop_database(&connect, &base_address, &name, &delete))
        })
        .join()
        .map_err(|_| Error::CleanupPanicked(self.name.to_string()))?
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        let Some(delete) = self.delete_database.take() else {
            return;
        };

        match self.blocking_cleanup(delete) {
            Ok(()) => tracing::debug!("Dropped database {}", self.name),
            // A second panic while unwinding would abort the test binary
            Err(err) if std::thread::panicking() => {
                tracing::error!("Failed to drop database {}: {}", self.name, err);
            }
            Err(err) => panic!("Failed to drop database {}: {}", self.name, err),
        }
    }
}

async fn drop_database(
    connect: &ConnectFn,
    base_address: &str,
    name: &DatabaseName,
    delete: &DatabaseFn,
) -> Result<()> {
    let mut conn = connect(base_address).await?;
    tracing::debug!("Dropping database: {}", name);
    delete(&mut conn, name).await?;
    close(conn).await;
    Ok(())
}

async fn close(conn: PgConnection) {
    if let Err(err) = conn.close().await {
        tracing::debug!("Error closing base connection: {}", err);
    }
}

/// Create a scratch database with default options, failing the test on error
pub async fn new_postgres_test() -> TestDatabase {
    TestDatabase::new(Options::default()).await
}
