//! Common utilities for tests

use sqlx::{Connection, PgConnection};

/// Initialize tracing for tests if it hasn't been already
#[allow(dead_code)]
pub fn init_tracing() {
    postgres_testkit::init_tracing();
}

/// Open a connection, panicking with the address on failure
#[allow(dead_code)]
pub async fn connect(url: &str) -> PgConnection {
    PgConnection::connect(url)
        .await
        .unwrap_or_else(|e| panic!("Failed to connect to {}: {}", url, e))
}

/// Whether `name` looks like `testing_db_` followed by 16 lowercase hex chars
#[allow(dead_code)]
pub fn is_scratch_name(name: &str) -> bool {
    name.strip_prefix("testing_db_").is_some_and(|hex| {
        hex.len() == 16
            && hex
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    })
}
