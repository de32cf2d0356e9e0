//! Runs against a real Postgres. Set `DATABASE_URL` and run with `--ignored`.

mod common;

use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;

use common::record;
use propex::config::TableName;
use propex::store::{PostgresStore, RecordStore, RowOutcome};

fn database_url() -> String {
    std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a scratch database")
}

async fn drop_table(table: &TableName) {
    let mut conn = PgConnection::connect(&database_url()).await.unwrap();
    sqlx::query(&format!("DROP TABLE IF EXISTS {}", table.quoted()))
        .execute(&mut conn)
        .await
        .unwrap();
    conn.close().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn upsert_statement_inserts_updates_and_skips() {
    let table = TableName::parse(&format!("propex_it_{}", std::process::id())).unwrap();
    drop_table(&table).await;
    let options = PgConnectOptions::from_str(&database_url()).unwrap();
    let store = PostgresStore::new(options, table.clone());

    assert!(store.load_all().await.unwrap().is_none());

    let first = store
        .upsert_rows(&[record("2025-04", 1001, false), record("2025-04", 1002, false)])
        .await
        .unwrap();
    assert_eq!(first, vec![RowOutcome::Inserted, RowOutcome::Inserted]);

    let mut edited = record("2025-04", 1001, true);
    edited.comment = "Updated".into();
    let mut unedited = record("2025-04", 1002, false);
    unedited.comment = "ignored".into();
    let second = store.upsert_rows(&[edited, unedited]).await.unwrap();
    assert_eq!(second, vec![RowOutcome::Updated, RowOutcome::Skipped]);

    let rows = store.load_all().await.unwrap().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].comment, "Updated");
    assert!(rows[0].edited);
    assert_eq!(rows[1].comment, "");

    drop_table(&table).await;
}
