use crate::db::*;
use tempfile::NamedTempFile;

/// Verify that querying the database after closing the pool returns an error
/// rather than hanging or panicking.
#[tokio::test]
async fn test_queries_after_pool_close_return_errors() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    db.close().await;

    let result = db.question_count().await;
    assert!(
        result.is_err(),
        "question_count after close should return an error, got: {:?}",
        result
    );

    let result = db.resolve_answer("Paris").await;
    assert!(
        result.is_err(),
        "resolve_answer after close should return an error, got: {:?}",
        result
    );
}
