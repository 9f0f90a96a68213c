//! Database layer for opentdb-import
//!
//! Handles SQLite persistence for the normalized trivia schema.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`]: Database lifecycle, schema migrations
//! - [`catalog`]: Resolve-or-create for categories, difficulties, types and answers
//! - [`questions`]: Question creation, lookup and read-back
//! - [`state`]: Runtime key/value state (persisted session token)

use crate::error::Result;
use crate::store::{NewQuestion, QuestionStore};
use crate::types::{Difficulty, QuestionKind};
use async_trait::async_trait;
use sqlx::{FromRow, sqlite::SqlitePool};

mod catalog;
mod migrations;
mod questions;
mod state;

/// Category record from database
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Category {
    /// Unique database ID
    pub id: i64,
    /// OpenTDB category id
    pub external_id: i64,
    /// Display name
    pub name: String,
}

/// Question record joined with its lookup rows, as read back for export
#[derive(Debug, Clone, FromRow)]
pub struct StoredQuestion {
    /// Unique database ID
    pub id: i64,
    /// Question text (decoded)
    pub text: String,
    /// Category display name
    pub category: String,
    /// OpenTDB category id
    pub external_category_id: i64,
    /// Difficulty level key
    pub difficulty: String,
    /// Question type key
    pub kind: String,
    /// Correct answer text
    pub correct_answer: String,
    /// Incorrect answer texts in API order
    #[sqlx(skip)]
    pub incorrect_answers: Vec<String>,
}

/// Database handle for opentdb-import
pub struct Database {
    pool: SqlitePool,
}

#[async_trait]
impl QuestionStore for Database {
    async fn upsert_category(&self, external_id: i64, name: &str) -> Result<Category> {
        Database::upsert_category(self, external_id, name).await
    }

    async fn resolve_difficulty(&self, level: Difficulty) -> Result<i64> {
        Database::resolve_difficulty(self, level).await
    }

    async fn resolve_question_type(&self, kind: QuestionKind) -> Result<i64> {
        Database::resolve_question_type(self, kind).await
    }

    async fn resolve_answer(&self, text: &str) -> Result<i64> {
        Database::resolve_answer(self, text).await
    }

    async fn find_question(&self, text: &str) -> Result<Option<i64>> {
        Database::find_question_by_text(self, text).await
    }

    async fn create_question(&self, question: &NewQuestion) -> Result<i64> {
        Database::create_question(self, question).await
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
