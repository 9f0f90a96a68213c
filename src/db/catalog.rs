//! Resolve-or-create for the lookup entities: categories, difficulties,
//! question types and answers.

use crate::error::DatabaseError;
use crate::types::{Difficulty, QuestionKind};
use crate::{Error, Result};

use super::{Category, Database};

impl Database {
    /// Create a category, or bring an existing one in line with `external_id` and `name`
    ///
    /// Looks the row up by OpenTDB id first, then by name; a match by either key
    /// has its other column refreshed. Never creates a second row for either key.
    pub async fn upsert_category(&self, external_id: i64, name: &str) -> Result<Category> {
        let existing = match self.category_by_external_id(external_id).await? {
            Some(category) => Some(category),
            None => self.category_by_name(name).await?,
        };

        if let Some(category) = existing {
            if category.external_id == external_id && category.name == name {
                return Ok(category);
            }

            sqlx::query("UPDATE categories SET external_id = ?, name = ? WHERE id = ?")
                .bind(external_id)
                .bind(name)
                .bind(category.id)
                .execute(&self.pool)
                .await
                .map_err(|e| map_write_error("update category", e))?;

            tracing::debug!(
                category_id = category.id,
                external_id,
                name,
                "Refreshed category"
            );
            return Ok(Category {
                id: category.id,
                external_id,
                name: name.to_string(),
            });
        }

        let id = sqlx::query("INSERT INTO categories (external_id, name) VALUES (?, ?)")
            .bind(external_id)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error("insert category", e))?
            .last_insert_rowid();

        tracing::info!(category_id = id, external_id, name, "Created category");
        Ok(Category {
            id,
            external_id,
            name: name.to_string(),
        })
    }

    /// Find a category by its OpenTDB id
    pub async fn category_by_external_id(&self, external_id: i64) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(
            "SELECT id, external_id, name FROM categories WHERE external_id = ?",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to find category by external id: {}",
                e
            )))
        })
    }

    /// Find a category by its display name
    pub async fn category_by_name(&self, name: &str) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>("SELECT id, external_id, name FROM categories WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to find category by name: {}",
                    e
                )))
            })
    }

    /// Resolve-or-create the difficulty row for `level`
    pub async fn resolve_difficulty(&self, level: Difficulty) -> Result<i64> {
        self.resolve_or_create(LookupTable::Difficulties, level.as_str())
            .await
    }

    /// Resolve-or-create the question type row for `kind`
    pub async fn resolve_question_type(&self, kind: QuestionKind) -> Result<i64> {
        self.resolve_or_create(LookupTable::QuestionTypes, kind.as_str())
            .await
    }

    /// Resolve-or-create the answer row holding exactly `text`
    pub async fn resolve_answer(&self, text: &str) -> Result<i64> {
        self.resolve_or_create(LookupTable::Answers, text).await
    }

    /// Number of answer rows
    pub async fn answer_count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM answers")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to count answers: {}",
                    e
                )))
            })
    }

    /// Look a unique key up, inserting it when absent
    async fn resolve_or_create(&self, table: LookupTable, key: &str) -> Result<i64> {
        let (table_name, column) = table.columns();

        let select = format!("SELECT id FROM {} WHERE {} = ?", table_name, column);
        let existing: Option<i64> = sqlx::query_scalar(&select)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to look up {} '{}': {}",
                    table_name, key, e
                )))
            })?;

        if let Some(id) = existing {
            return Ok(id);
        }

        let insert = format!("INSERT INTO {} ({}) VALUES (?)", table_name, column);
        let id = sqlx::query(&insert)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(table.insert_step(), e))?
            .last_insert_rowid();

        Ok(id)
    }
}

/// Single-key lookup tables
#[derive(Clone, Copy, Debug)]
enum LookupTable {
    Difficulties,
    QuestionTypes,
    Answers,
}

impl LookupTable {
    fn columns(self) -> (&'static str, &'static str) {
        match self {
            LookupTable::Difficulties => ("difficulties", "level"),
            LookupTable::QuestionTypes => ("question_types", "type"),
            LookupTable::Answers => ("answers", "text"),
        }
    }

    fn insert_step(self) -> &'static str {
        match self {
            LookupTable::Difficulties => "insert difficulty",
            LookupTable::QuestionTypes => "insert question type",
            LookupTable::Answers => "insert answer",
        }
    }
}

/// Map a write failure, keeping unique-key violations distinguishable
pub(super) fn map_write_error(step: &str, e: sqlx::Error) -> Error {
    let is_unique = e
        .as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation());

    if is_unique {
        Error::Database(DatabaseError::ConstraintViolation(format!(
            "Failed to {}: {}",
            step, e
        )))
    } else {
        Error::Database(DatabaseError::QueryFailed(format!(
            "Failed to {}: {}",
            step, e
        )))
    }
}
