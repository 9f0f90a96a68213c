//! Export of stored questions to JSON
//!
//! Produces the flat `all_questions.json` layout: one object per question with
//! its category, difficulty, type and answers inlined.

use crate::db::{Database, StoredQuestion};
use crate::error::Result;
use crate::html::decode_html_entities;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Default export file name
pub const DEFAULT_EXPORT_FILE: &str = "all_questions.json";

/// One exported question
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedQuestion {
    /// Question row id
    pub id: i64,
    /// Question text
    pub question: String,
    /// Category display name
    pub category: String,
    /// OpenTDB category id
    pub opentdb_category_id: i64,
    /// Difficulty level
    pub difficulty: String,
    /// "multiple" or "boolean"
    #[serde(rename = "type")]
    pub kind: String,
    /// Correct answer text
    pub correct_answer: String,
    /// Incorrect answer texts
    pub incorrect_answers: Vec<String>,
}

impl From<StoredQuestion> for ExportedQuestion {
    fn from(q: StoredQuestion) -> Self {
        // Rows written by older importers may still hold encoded text
        Self {
            id: q.id,
            question: decode_html_entities(&q.text),
            category: q.category,
            opentdb_category_id: q.external_category_id,
            difficulty: q.difficulty,
            kind: q.kind,
            correct_answer: decode_html_entities(&q.correct_answer),
            incorrect_answers: q
                .incorrect_answers
                .iter()
                .map(|a| decode_html_entities(a))
                .collect(),
        }
    }
}

/// Every stored question in export form, oldest first
pub async fn export_questions(db: &Database) -> Result<Vec<ExportedQuestion>> {
    Ok(db
        .list_questions()
        .await?
        .into_iter()
        .map(ExportedQuestion::from)
        .collect())
}

/// Write every stored question to `path` as pretty JSON; returns the count
pub async fn write_json(db: &Database, path: &Path) -> Result<usize> {
    let questions = export_questions(db).await?;
    let json = serde_json::to_string_pretty(&questions)?;
    tokio::fs::write(path, json).await?;

    info!(
        total = questions.len(),
        path = %path.display(),
        "Exported questions"
    );
    Ok(questions.len())
}
