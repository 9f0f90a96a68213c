use super::insert_question;
use crate::db::*;
use crate::error::{DatabaseError, Error};
use crate::store::NewQuestion;
use crate::types::{Difficulty, QuestionKind};
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_create_and_list_question() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let id = insert_question(
        &db,
        22,
        "What is the capital of Australia?",
        "Canberra",
        &["Sydney", "Melbourne", "Perth"],
    )
    .await;

    let questions = db.list_questions().await.unwrap();
    assert_eq!(questions.len(), 1);
    let q = &questions[0];
    assert_eq!(q.id, id);
    assert_eq!(q.text, "What is the capital of Australia?");
    assert_eq!(q.category, "Category 22");
    assert_eq!(q.external_category_id, 22);
    assert_eq!(q.difficulty, "medium");
    assert_eq!(q.kind, "multiple");
    assert_eq!(q.correct_answer, "Canberra");
    assert_eq!(q.incorrect_answers, vec!["Sydney", "Melbourne", "Perth"]);

    assert_eq!(
        db.find_question_by_text("What is the capital of Australia?")
            .await
            .unwrap(),
        Some(id)
    );
    assert_eq!(db.find_question_by_text("Unknown?").await.unwrap(), None);

    db.close().await;
}

#[tokio::test]
async fn test_duplicate_text_is_constraint_violation() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    insert_question(&db, 9, "Same text?", "A", &["B"]).await;

    let category = db.upsert_category(9, "Category 9").await.unwrap();
    let err = db
        .create_question(&NewQuestion {
            text: "Same text?".to_string(),
            category_id: category.id,
            difficulty_id: db.resolve_difficulty(Difficulty::Easy).await.unwrap(),
            type_id: db
                .resolve_question_type(QuestionKind::Multiple)
                .await
                .unwrap(),
            correct_answer_id: db.resolve_answer("C").await.unwrap(),
            incorrect_answer_ids: vec![db.resolve_answer("D").await.unwrap()],
        })
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::Database(DatabaseError::ConstraintViolation(_))),
        "got: {err:?}"
    );
    assert_eq!(db.question_count().await.unwrap(), 1);

    db.close().await;
}

#[tokio::test]
async fn test_correct_answer_in_incorrect_set_is_rejected() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let category = db.upsert_category(9, "Category 9").await.unwrap();
    let answer = db.resolve_answer("Both").await.unwrap();
    let question = NewQuestion {
        text: "Inconsistent?".to_string(),
        category_id: category.id,
        difficulty_id: db.resolve_difficulty(Difficulty::Easy).await.unwrap(),
        type_id: db
            .resolve_question_type(QuestionKind::Boolean)
            .await
            .unwrap(),
        correct_answer_id: answer,
        incorrect_answer_ids: vec![answer],
    };
    assert!(!question.is_consistent());

    let err = db.create_question(&question).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Database(DatabaseError::ConstraintViolation(_))
    ));
    assert_eq!(db.question_count().await.unwrap(), 0);

    db.close().await;
}

#[tokio::test]
async fn test_failed_link_rolls_back_question() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let category = db.upsert_category(9, "Category 9").await.unwrap();
    let err = db
        .create_question(&NewQuestion {
            text: "Dangling link?".to_string(),
            category_id: category.id,
            difficulty_id: db.resolve_difficulty(Difficulty::Easy).await.unwrap(),
            type_id: db
                .resolve_question_type(QuestionKind::Multiple)
                .await
                .unwrap(),
            correct_answer_id: db.resolve_answer("Real").await.unwrap(),
            // No such answer row: the foreign key rejects the link
            incorrect_answer_ids: vec![424242],
        })
        .await;

    assert!(err.is_err());
    assert_eq!(db.question_count().await.unwrap(), 0);
    assert_eq!(db.find_question_by_text("Dangling link?").await.unwrap(), None);

    db.close().await;
}

#[tokio::test]
async fn test_insert_after_rolled_back_question_succeeds() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let category = db.upsert_category(9, "Category 9").await.unwrap();
    let difficulty_id = db.resolve_difficulty(Difficulty::Easy).await.unwrap();
    let type_id = db
        .resolve_question_type(QuestionKind::Multiple)
        .await
        .unwrap();
    let correct_answer_id = db.resolve_answer("Real").await.unwrap();
    let question = |text: &str, incorrect_answer_ids: Vec<i64>| NewQuestion {
        text: text.to_string(),
        category_id: category.id,
        difficulty_id,
        type_id,
        correct_answer_id,
        incorrect_answer_ids,
    };

    for _ in 0..3 {
        assert!(db.create_question(&question("Dangling link?", vec![424242])).await.is_err());
    }
    let wrong = db.resolve_answer("Fake").await.unwrap();
    let id = db
        .create_question(&question("Dangling link?", vec![wrong]))
        .await
        .unwrap();

    assert_eq!(db.find_question_by_text("Dangling link?").await.unwrap(), Some(id));
    assert_eq!(db.question_count().await.unwrap(), 1);

    db.close().await;
}

#[tokio::test]
async fn test_question_counts() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    insert_question(&db, 9, "One?", "A", &["B"]).await;
    insert_question(&db, 9, "Two?", "A", &["C"]).await;
    insert_question(&db, 18, "Three?", "True", &["False"]).await;

    assert_eq!(db.question_count().await.unwrap(), 3);
    assert_eq!(db.question_count_for_category(9).await.unwrap(), 2);
    assert_eq!(db.question_count_for_category(18).await.unwrap(), 1);
    assert_eq!(db.question_count_for_category(99).await.unwrap(), 0);
    // "A" is shared by two questions
    assert_eq!(db.answer_count().await.unwrap(), 5);

    db.close().await;
}

#[tokio::test]
async fn test_list_questions_keeps_incorrect_answer_order() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    // Resolve in a different order than the link order
    db.resolve_answer("Zeta").await.unwrap();
    db.resolve_answer("Alpha").await.unwrap();
    insert_question(&db, 9, "Order?", "Omega", &["Alpha", "Zeta", "Mu"]).await;

    let questions = db.list_questions().await.unwrap();
    assert_eq!(questions[0].incorrect_answers, vec!["Alpha", "Zeta", "Mu"]);

    db.close().await;
}
