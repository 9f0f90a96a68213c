//! Persistence interface used by the upsert layer
//!
//! The importer only needs resolve-or-create by unique key for the lookup
//! entities and create-with-relations for questions. [`Database`](crate::db::Database)
//! is the SQLite implementation; tests wrap it to inject failures.

use crate::db::Category;
use crate::error::Result;
use crate::types::{Difficulty, QuestionKind};
use async_trait::async_trait;

/// A question ready to be linked to its resolved lookup and answer rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    /// Decoded question text (unique)
    pub text: String,
    /// Category row id
    pub category_id: i64,
    /// Difficulty row id
    pub difficulty_id: i64,
    /// Question type row id
    pub type_id: i64,
    /// Answer row id of the correct answer
    pub correct_answer_id: i64,
    /// Answer row ids of the incorrect answers, in API order, without duplicates
    /// and never containing `correct_answer_id`
    pub incorrect_answer_ids: Vec<i64>,
}

impl NewQuestion {
    /// Whether the correct answer is kept out of the incorrect set
    pub fn is_consistent(&self) -> bool {
        !self.incorrect_answer_ids.contains(&self.correct_answer_id)
    }
}

/// Storage operations the importer relies on
///
/// Every `resolve_*` method returns the id of the row holding the given unique
/// key, creating the row when it does not exist yet. None of them ever
/// produces a second row for the same key.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Create the category or refresh its name; returns the stored row
    async fn upsert_category(&self, external_id: i64, name: &str) -> Result<Category>;

    /// Resolve-or-create the difficulty row for `level`
    async fn resolve_difficulty(&self, level: Difficulty) -> Result<i64>;

    /// Resolve-or-create the question type row for `kind`
    async fn resolve_question_type(&self, kind: QuestionKind) -> Result<i64>;

    /// Resolve-or-create the answer row holding exactly `text`
    async fn resolve_answer(&self, text: &str) -> Result<i64>;

    /// Id of the question with exactly this text, if stored
    async fn find_question(&self, text: &str) -> Result<Option<i64>>;

    /// Insert the question and its incorrect-answer links atomically
    ///
    /// # Errors
    /// Fails with a constraint violation when the text already exists or the
    /// correct answer appears among the incorrect ones.
    async fn create_question(&self, question: &NewQuestion) -> Result<i64>;
}
