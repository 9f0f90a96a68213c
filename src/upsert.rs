//! Maps raw API items onto the normalized schema
//!
//! Each item is decoded, checked against the seen-set, and then linked to its
//! resolved lookup rows (difficulty, type, answers) before the question row is
//! created. Failures are contained per item: they come back as
//! [`ItemOutcome::Skipped`] and never abort the page.

use crate::api::RawQuestion;
use crate::dedup::Deduplicator;
use crate::error::PersistError;
use crate::html::decode_html_entities;
use crate::report::{ItemOutcome, SkipReason};
use crate::store::{NewQuestion, QuestionStore};
use crate::types::{Difficulty, QuestionKind};
use tracing::{debug, warn};

/// A raw item with every text field decoded and its enums parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedQuestion {
    /// Question text
    pub text: String,
    /// Difficulty level ([`Difficulty::Unknown`] when missing)
    pub difficulty: Difficulty,
    /// Question type
    pub kind: QuestionKind,
    /// Correct answer text
    pub correct_answer: String,
    /// Incorrect answer texts in API order
    pub incorrect_answers: Vec<String>,
}

impl DecodedQuestion {
    /// Decode a raw item, rejecting items that cannot be stored
    ///
    /// # Errors
    /// [`PersistError::InvalidItem`] for an empty question or correct answer, or
    /// a type other than `multiple`/`boolean`.
    pub fn from_raw(raw: &RawQuestion) -> Result<Self, PersistError> {
        let text = decode_html_entities(raw.question.trim());
        if text.is_empty() {
            return Err(PersistError::InvalidItem("empty question text".to_string()));
        }

        let correct_answer = decode_html_entities(raw.correct_answer.trim());
        if correct_answer.is_empty() {
            return Err(PersistError::InvalidItem(format!(
                "empty correct answer for '{}'",
                text
            )));
        }

        let kind = QuestionKind::parse(raw.kind.as_deref()).ok_or_else(|| {
            PersistError::InvalidItem(format!(
                "unknown question type '{}'",
                raw.kind.as_deref().unwrap_or_default()
            ))
        })?;

        let incorrect_answers = raw
            .incorrect_answers
            .iter()
            .map(|answer| decode_html_entities(answer.trim()))
            .filter(|answer| !answer.is_empty())
            .collect();

        Ok(Self {
            text,
            difficulty: Difficulty::parse(raw.difficulty.as_deref()),
            kind,
            correct_answer,
            incorrect_answers,
        })
    }
}

/// Store one raw item under the category row `category_id`
///
/// The question text is recorded in `dedup` only once the question is stored.
/// A text that an earlier run already stored counts as imported without
/// creating a new row.
pub async fn persist_question(
    store: &dyn QuestionStore,
    dedup: &mut Deduplicator,
    category_id: i64,
    raw: &RawQuestion,
) -> ItemOutcome {
    let question = match DecodedQuestion::from_raw(raw) {
        Ok(question) => question,
        Err(e) => {
            warn!(category_id, error = %e, "Skipping invalid question");
            return ItemOutcome::Skipped(SkipReason::Invalid(e.to_string()));
        }
    };

    if dedup.seen(&question.text) {
        debug!(category_id, question = %question.text, "Skipping duplicate question");
        return ItemOutcome::Skipped(SkipReason::Duplicate);
    }

    match store_question(store, category_id, &question).await {
        Ok((question_id, created)) => {
            dedup.record(question.text);
            ItemOutcome::Imported {
                question_id,
                created,
            }
        }
        Err(e) => {
            warn!(
                category_id,
                question = %question.text,
                error = %e,
                "Skipping question that failed to persist"
            );
            ItemOutcome::Skipped(SkipReason::PersistFailed(e.to_string()))
        }
    }
}

async fn store_question(
    store: &dyn QuestionStore,
    category_id: i64,
    question: &DecodedQuestion,
) -> Result<(i64, bool), PersistError> {
    if let Some(existing) = store
        .find_question(&question.text)
        .await
        .map_err(|e| store_error("find question", e))?
    {
        debug!(question_id = existing, "Question already stored");
        return Ok((existing, false));
    }

    let difficulty_id = store
        .resolve_difficulty(question.difficulty)
        .await
        .map_err(|e| store_error("resolve difficulty", e))?;
    let type_id = store
        .resolve_question_type(question.kind)
        .await
        .map_err(|e| store_error("resolve question type", e))?;

    let correct_answer_id = store
        .resolve_answer(&question.correct_answer)
        .await
        .map_err(|e| store_error("resolve correct answer", e))?;

    let mut incorrect_answer_ids = Vec::with_capacity(question.incorrect_answers.len());
    for answer in &question.incorrect_answers {
        let answer_id = store
            .resolve_answer(answer)
            .await
            .map_err(|e| store_error("resolve incorrect answer", e))?;
        // The API occasionally repeats the correct answer among the incorrect ones
        if answer_id == correct_answer_id || incorrect_answer_ids.contains(&answer_id) {
            continue;
        }
        incorrect_answer_ids.push(answer_id);
    }

    let question_id = store
        .create_question(&NewQuestion {
            text: question.text.clone(),
            category_id,
            difficulty_id,
            type_id,
            correct_answer_id,
            incorrect_answer_ids,
        })
        .await
        .map_err(|e| store_error("create question", e))?;

    Ok((question_id, true))
}

fn store_error(step: &'static str, e: crate::Error) -> PersistError {
    PersistError::Store {
        step,
        message: e.to_string(),
    }
}
