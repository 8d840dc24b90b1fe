//! Integration tests for scratch database provisioning.
//!
//! These need a PostgreSQL server reachable through `TESTING_POSTGRES_TEST`
//! or the default address.

mod common;

use postgres_testkit::{force_delete_database, new_postgres_test, Options, TestDatabase};
use sqlx::{Connection, PgConnection};
use url::Url;

#[tokio::test]
async fn test_new_postgres_test() {
    common::init_tracing();
    let db = new_postgres_test().await;

    let mut conn = common::connect(db.url()).await;
    let value: i32 = sqlx::query_scalar("SELECT 42")
        .fetch_one(&mut conn)
        .await
        .unwrap();
    assert_eq!(value, 42);
    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_url_path_is_scratch_name() {
    let db = new_postgres_test().await;

    let url = Url::parse(db.url()).unwrap();
    let path = url.path().trim_start_matches('/');
    assert!(common::is_scratch_name(path), "unexpected path: {}", path);
    assert_eq!(path, db.name().as_str());
}

#[tokio::test]
async fn test_database_is_empty() {
    let db = new_postgres_test().await;
    let mut conn = db.connect().await.unwrap();

    let tables: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = 'public'",
    )
    .fetch_one(&mut conn)
    .await
    .unwrap();
    assert_eq!(tables, 0);
    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_database_dropped_on_scope_exit() {
    let url = {
        let db = new_postgres_test().await;
        let conn = common::connect(db.url()).await;
        conn.close().await.unwrap();
        db.url().to_string()
    };

    assert!(
        PgConnection::connect(&url).await.is_err(),
        "database behind {} should have been dropped",
        url
    );
}

#[tokio::test]
async fn test_explicit_cleanup() {
    let db = new_postgres_test().await;
    let url = db.url().to_string();

    db.cleanup().await.unwrap();

    assert!(PgConnection::connect(&url).await.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_databases_are_distinct() {
    let handles = (0..8)
        .map(|_| tokio::spawn(async { new_postgres_test().await }))
        .collect::<Vec<_>>();

    let mut dbs = Vec::new();
    for handle in handles {
        dbs.push(handle.await.unwrap());
    }

    let mut names = dbs
        .iter()
        .map(|db| db.name().to_string())
        .collect::<Vec<_>>();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), dbs.len());
}

#[tokio::test]
async fn test_force_delete_with_open_connection() {
    let db = TestDatabase::new(Options::new().delete_database_with(force_delete_database)).await;
    let url = db.url().to_string();

    // Left open on purpose: a plain DROP DATABASE would refuse
    let _conn = common::connect(&url).await;
    drop(db);

    assert!(PgConnection::connect(&url).await.is_err());
}

#[tokio::test]
async fn test_database_dropped_when_test_panics() {
    let (url_tx, url_rx) = tokio::sync::oneshot::channel();

    let handle = tokio::spawn(async move {
        let db =
            TestDatabase::new(Options::new().delete_database_with(force_delete_database)).await;
        let _conn = common::connect(db.url()).await;
        let _ = url_tx.send(db.url().to_string());
        panic!("test body failed");
    });

    let err = handle.await.unwrap_err();
    assert!(err.is_panic());

    let url = url_rx.await.unwrap();
    assert!(
        PgConnection::connect(&url).await.is_err(),
        "database behind {} should have been dropped",
        url
    );
}

#[tokio::test]
async fn test_without_cleanup_leaves_database() {
    let db = TestDatabase::new(Options::new().without_cleanup()).await;
    let url = db.url().to_string();
    let name = db.name().clone();
    let base_address = db.base_address().to_string();
    drop(db);

    let conn = common::connect(&url).await;
    conn.close().await.unwrap();

    let mut admin = common::connect(&base_address).await;
    sqlx::query(&format!("DROP DATABASE {}", name))
        .execute(&mut admin)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_invalid_base_address_fails() {
    let result =
        TestDatabase::try_new(Options::new().base_address("postgres://nobody@127.0.0.1:1")).await;
    assert!(result.is_err());
}
