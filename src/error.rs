use thiserror::Error;

/// Error type for scratch database operations
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to open a connection to the server
    #[error("Failed to connect to {address}: {source}")]
    ConnectionFailed {
        address: String,
        #[source]
        source: sqlx::Error,
    },

    /// A statement or catalog query failed
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// The operating system RNG could not produce a database name
    #[error("Failed to generate database name: {0}")]
    NameGenerationFailed(#[from] rand::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The cleanup runtime could not be started
    #[error("Runtime error: {0}")]
    RuntimeError(#[from] std::io::Error),

    /// The cleanup thread panicked before dropping the database
    #[error("Cleanup of database {0} panicked")]
    CleanupPanicked(String),

    /// Generic error with message, for user-supplied behaviors
    #[error("{0}")]
    Generic(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Generic(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Generic(s.to_string())
    }
}

/// Result type for scratch database operations
pub type Result<T> = std::result::Result<T, Error>;
