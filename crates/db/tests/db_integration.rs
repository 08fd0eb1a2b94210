//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `bramble_test`)
//!   `TEST_DB_PASSWORD` (default: `bramble_test`)
//!   `TEST_DB_NAME` (default: `bramble_test`)

#![allow(clippy::unwrap_used)]

use bramble_db::test_utils::{TestDatabase, TestDbConfig};

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_migrations_apply() {
    let db = TestDatabase::create_unique().await.expect("create failed");
    let result = bramble_db::migrate(db.connection()).await;
    assert!(result.is_ok(), "Migration failed: {:?}", result.err());
    db.drop_database().await.expect("drop failed");
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_cleanup() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    let result = db.cleanup().await;
    assert!(result.is_ok(), "Cleanup failed: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_execute_query() {
    let db = TestDatabase::new().await.expect("Failed to connect");

    use sea_orm::ConnectionTrait;
    let result = db
        .connection()
        .execute(sea_orm::Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT 1".to_string(),
        ))
        .await;

    assert!(result.is_ok(), "Query failed: {:?}", result.err());
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires running PostgreSQL instance"]
async fn test_concurrent_votes_lose_no_increment() {
    use bramble_db::entities::{choice, question};
    use bramble_db::repositories::{ChoiceRepository, QuestionRepository};
    use sea_orm::Set;
    use std::sync::Arc;

    const VOTERS: usize = 32;

    let db = TestDatabase::create_unique().await.expect("create failed");
    bramble_db::migrate(db.connection())
        .await
        .expect("migrate failed");

    let conn = Arc::new(
        sea_orm::Database::connect(&db.config.database_url())
            .await
            .expect("connect failed"),
    );
    let questions = QuestionRepository::new(Arc::clone(&conn));
    let choices = ChoiceRepository::new(Arc::clone(&conn));

    questions
        .create(question::ActiveModel {
            id: Set("q1".to_string()),
            text: Set("Favourite crate?".to_string()),
            ..Default::default()
        })
        .await
        .expect("question insert failed");
    choices
        .create(choice::ActiveModel {
            id: Set("c1".to_string()),
            question_id: Set("q1".to_string()),
            text: Set("serde".to_string()),
            votes: Set(0),
        })
        .await
        .expect("choice insert failed");

    // Fire all votes in parallel; the single conditional UPDATE serializes
    // them in the database.
    let mut handles = Vec::with_capacity(VOTERS);
    for _ in 0..VOTERS {
        let repo = choices.clone();
        handles.push(tokio::spawn(
            async move { repo.increment_votes("q1", "c1").await },
        ));
    }
    for handle in handles {
        let rows = handle.await.expect("task panicked").expect("vote failed");
        assert_eq!(rows, 1);
    }

    let tally = choices.find_by_question("q1").await.expect("read failed");
    assert_eq!(tally.len(), 1);
    assert_eq!(tally[0].votes, VOTERS as i64);

    drop(choices);
    drop(questions);
    drop(conn);
    db.drop_database().await.expect("drop failed");
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_database_url_format() {
    let config = TestDbConfig {
        host: "testhost".to_string(),
        port: 5432,
        username: "testuser".to_string(),
        password: "testpass".to_string(),
        database: "testdb".to_string(),
    };

    let url = config.database_url();
    assert!(url.starts_with("postgres://"));
    assert!(url.contains("testhost"));
    assert!(url.contains("5432"));
    assert!(url.contains("testuser"));
    assert!(url.contains("testdb"));
}
