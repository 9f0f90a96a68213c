mod close;
mod migrations;
mod questions;

use crate::db::Database;
use crate::store::NewQuestion;
use crate::types::{Difficulty, QuestionKind};

/// Resolve every relation and create one question in category `external_id`
async fn insert_question(
    db: &Database,
    external_id: i64,
    text: &str,
    correct: &str,
    incorrect: &[&str],
) -> i64 {
    let category = db
        .upsert_category(external_id, &format!("Category {external_id}"))
        .await
        .unwrap();
    let difficulty_id = db.resolve_difficulty(Difficulty::Medium).await.unwrap();
    let type_id = db
        .resolve_question_type(QuestionKind::Multiple)
        .await
        .unwrap();
    let correct_answer_id = db.resolve_answer(correct).await.unwrap();
    let mut incorrect_answer_ids = Vec::new();
    for answer in incorrect {
        incorrect_answer_ids.push(db.resolve_answer(answer).await.unwrap());
    }

    db.create_question(&NewQuestion {
        text: text.to_string(),
        category_id: category.id,
        difficulty_id,
        type_id,
        correct_answer_id,
        incorrect_answer_ids,
    })
    .await
    .unwrap()
}
