//! Question creation, lookup and read-back.

use crate::error::DatabaseError;
use crate::store::NewQuestion;
use crate::{Error, Result};
use std::collections::HashMap;

use super::catalog::map_write_error;
use super::{Database, StoredQuestion};

impl Database {
    /// Insert a question and link its incorrect answers in one transaction
    ///
    /// Rejects a question whose correct answer is also listed as incorrect,
    /// and a question whose text is already stored.
    pub async fn create_question(&self, question: &NewQuestion) -> Result<i64> {
        if !question.is_consistent() {
            return Err(Error::Database(DatabaseError::ConstraintViolation(format!(
                "correct answer {} is also listed as incorrect for '{}'",
                question.correct_answer_id, question.text
            ))));
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to begin transaction: {}",
                e
            )))
        })?;

        let now = chrono::Utc::now().timestamp();
        let inserted = async {
            let question_id = sqlx::query(
                r#"
                INSERT INTO questions (
                    text, category_id, difficulty_id, type_id, correct_answer_id, created_at
                )
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&question.text)
            .bind(question.category_id)
            .bind(question.difficulty_id)
            .bind(question.type_id)
            .bind(question.correct_answer_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error("insert question", e))?
            .last_insert_rowid();

            for (position, answer_id) in question.incorrect_answer_ids.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO question_incorrect_answers (question_id, answer_id, position)
                    VALUES (?, ?, ?)
                    "#,
                )
                .bind(question_id)
                .bind(*answer_id)
                .bind(position as i64)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_write_error("link incorrect answer", e))?;
            }

            Ok::<i64, Error>(question_id)
        }
        .await;

        let question_id = match inserted {
            Ok(id) => id,
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(
                        error = %rollback_err,
                        text = %question.text,
                        "Failed to roll back question insert"
                    );
                }
                return Err(e);
            }
        };

        tx.commit().await.map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to commit question: {}",
                e
            )))
        })?;

        Ok(question_id)
    }

    /// Id of the question with exactly this text
    pub async fn find_question_by_text(&self, text: &str) -> Result<Option<i64>> {
        sqlx::query_scalar("SELECT id FROM questions WHERE text = ?")
            .bind(text)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to find question by text: {}",
                    e
                )))
            })
    }

    /// Number of question rows
    pub async fn question_count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM questions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to count questions: {}",
                    e
                )))
            })
    }

    /// Number of question rows in one category, by OpenTDB id
    pub async fn question_count_for_category(&self, external_id: i64) -> Result<i64> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM questions q
            JOIN categories c ON c.id = q.category_id
            WHERE c.external_id = ?
            "#,
        )
        .bind(external_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to count questions for category: {}",
                e
            )))
        })
    }

    /// Every stored question with its relations resolved, oldest first
    pub async fn list_questions(&self) -> Result<Vec<StoredQuestion>> {
        let mut questions = sqlx::query_as::<_, StoredQuestion>(
            r#"
            SELECT
                q.id AS id,
                q.text AS text,
                c.name AS category,
                c.external_id AS external_category_id,
                d.level AS difficulty,
                t.type AS kind,
                a.text AS correct_answer
            FROM questions q
            JOIN categories c ON c.id = q.category_id
            JOIN difficulties d ON d.id = q.difficulty_id
            JOIN question_types t ON t.id = q.type_id
            JOIN answers a ON a.id = q.correct_answer_id
            ORDER BY q.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list questions: {}",
                e
            )))
        })?;

        let links: Vec<(i64, String)> = sqlx::query_as(
            r#"
            SELECT qia.question_id, a.text
            FROM question_incorrect_answers qia
            JOIN answers a ON a.id = qia.answer_id
            ORDER BY qia.question_id ASC, qia.position ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list incorrect answers: {}",
                e
            )))
        })?;

        let mut incorrect: HashMap<i64, Vec<String>> = HashMap::new();
        for (question_id, text) in links {
            incorrect.entry(question_id).or_default().push(text);
        }
        for question in &mut questions {
            question.incorrect_answers = incorrect.remove(&question.id).unwrap_or_default();
        }

        Ok(questions)
    }
}
