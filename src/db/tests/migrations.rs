use crate::db::*;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_database_creation() {
    let temp_file = NamedTempFile::new().unwrap();
    let db_path = temp_file.path();

    let db = Database::new(db_path).await.unwrap();

    // Verify tables exist
    let mut conn = db.pool.acquire().await.unwrap();

    let tables: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .fetch_all(&mut *conn)
            .await
            .unwrap();

    for table in [
        "categories",
        "difficulties",
        "question_types",
        "answers",
        "questions",
        "question_incorrect_answers",
        "runtime_state",
        "schema_version",
    ] {
        assert!(tables.contains(&table.to_string()), "missing table {table}");
    }

    drop(conn);
    db.close().await;
}

#[tokio::test]
async fn test_reopen_does_not_rerun_migrations() {
    let temp_file = NamedTempFile::new().unwrap();

    {
        let db = Database::new(temp_file.path()).await.unwrap();
        db.upsert_category(9, "General Knowledge").await.unwrap();
        db.close().await;
    }

    let db = Database::new(temp_file.path()).await.unwrap();
    let versions: Vec<i64> = sqlx::query_scalar("SELECT version FROM schema_version")
        .fetch_all(db.pool())
        .await
        .unwrap();
    assert_eq!(versions, vec![1]);

    // Data from the first session survives
    assert!(db.category_by_external_id(9).await.unwrap().is_some());

    db.close().await;
}
