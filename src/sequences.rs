//! Randomize sequence start values.
//!
//! A fresh database starts every sequence at 1, so ids in different tables
//! line up and bugs that join on the wrong column go unnoticed. Restarting
//! each sequence at an unrelated value makes those bugs visible.

use std::ops::RangeInclusive;

use rand::Rng;
use sqlx::PgConnection;

use crate::error::Result;

/// Range that restart values are drawn from
pub const SEQUENCE_RESTART_RANGE: RangeInclusive<i64> = 100..=100_099;

const LIST_SEQUENCES: &str = r#"
    SELECT n.nspname, c.relname
    FROM pg_class c
    JOIN pg_namespace n ON n.oid = c.relnamespace
    WHERE c.relkind = 'S'
"#;

/// A sequence that was restarted and the value it now starts at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRestart {
    pub schema: String,
    pub name: String,
    pub restart_with: i64,
}

/// Restart every sequence visible on `conn` at a random value, failing the
/// current test on any error.
///
/// # Panics
///
/// Panics if the catalog query or any `ALTER SEQUENCE` fails.
pub async fn randomize_sequences(conn: &mut PgConnection) -> Vec<SequenceRestart> {
    match try_randomize_sequences(conn).await {
        Ok(restarts) => restarts,
        Err(err) => panic!("Failed to randomize sequences: {}", err),
    }
}

/// Restart every sequence visible on `conn` at a value drawn from
/// [`SEQUENCE_RESTART_RANGE`]
pub async fn try_randomize_sequences(conn: &mut PgConnection) -> Result<Vec<SequenceRestart>> {
    let sequences: Vec<(String, String)> = sqlx::query_as(LIST_SEQUENCES)
        .fetch_all(&mut *conn)
        .await?;

    let mut restarts = Vec::with_capacity(sequences.len());
    for (schema, name) in sequences {
        let restart_with = rand::thread_rng().gen_range(SEQUENCE_RESTART_RANGE);
        let sql = restart_statement(&schema, &name, restart_with);
        tracing::debug!("Executing: {}", sql);
        sqlx::query(&sql).execute(&mut *conn).await?;

        restarts.push(SequenceRestart {
            schema,
            name,
            restart_with,
        });
    }

    Ok(restarts)
}

fn restart_statement(schema: &str, name: &str, restart_with: i64) -> String {
    format!(
        "ALTER SEQUENCE {}.{} RESTART WITH {}",
        quote_ident(schema),
        quote_ident(name),
        restart_with
    )
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
