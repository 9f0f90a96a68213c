//! Core domain types shared by the fetcher, upsert layer and store

use serde::{Deserialize, Serialize};
use std::fmt;

/// Question difficulty as stored in the `difficulties` lookup table
///
/// Anything the API sends outside easy/medium/hard (or nothing at all) is
/// folded into [`Difficulty::Unknown`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// "easy"
    Easy,
    /// "medium"
    Medium,
    /// "hard"
    Hard,
    /// Free-text fallback for missing or unrecognised levels
    Unknown,
}

impl Difficulty {
    /// Parse the API's difficulty string; never fails
    pub fn parse(level: Option<&str>) -> Self {
        match level.map(|l| l.trim().to_ascii_lowercase()).as_deref() {
            Some("easy") => Difficulty::Easy,
            Some("medium") => Difficulty::Medium,
            Some("hard") => Difficulty::Hard,
            _ => Difficulty::Unknown,
        }
    }

    /// Unique lookup key
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Question type as stored in the `question_types` lookup table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Multiple choice ("multiple"): one correct, three incorrect answers
    Multiple,
    /// True/false ("boolean"): one correct, one incorrect answer
    Boolean,
}

impl QuestionKind {
    /// Parse the API's type string
    ///
    /// A missing type defaults to multiple choice; an unrecognised one is `None`.
    pub fn parse(kind: Option<&str>) -> Option<Self> {
        match kind.map(|k| k.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("multiple") => Some(QuestionKind::Multiple),
            Some("boolean") => Some(QuestionKind::Boolean),
            _ => None,
        }
    }

    /// Unique lookup key
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Multiple => "multiple",
            QuestionKind::Boolean => "boolean",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `response_code` field returned by every OpenTDB endpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseCode {
    /// 0: results returned
    Success,
    /// 1: not enough questions for the query
    NoResults,
    /// 2: invalid argument
    InvalidParameter,
    /// 3: session token does not exist
    TokenNotFound,
    /// 4: session token has returned every question for the query
    TokenEmpty,
    /// 5: too many requests from this IP
    RateLimit,
    /// Anything undocumented
    Unknown(i64),
}

impl ResponseCode {
    /// Map a raw code to its variant
    pub fn from_i64(code: i64) -> Self {
        match code {
            0 => ResponseCode::Success,
            1 => ResponseCode::NoResults,
            2 => ResponseCode::InvalidParameter,
            3 => ResponseCode::TokenNotFound,
            4 => ResponseCode::TokenEmpty,
            5 => ResponseCode::RateLimit,
            other => ResponseCode::Unknown(other),
        }
    }

    /// Raw numeric code
    pub fn code(&self) -> i64 {
        match self {
            ResponseCode::Success => 0,
            ResponseCode::NoResults => 1,
            ResponseCode::InvalidParameter => 2,
            ResponseCode::TokenNotFound => 3,
            ResponseCode::TokenEmpty => 4,
            ResponseCode::RateLimit => 5,
            ResponseCode::Unknown(code) => *code,
        }
    }

    /// Documented meaning, for logs and errors
    pub fn meaning(&self) -> &'static str {
        match self {
            ResponseCode::Success => "success",
            ResponseCode::NoResults => "no results",
            ResponseCode::InvalidParameter => "invalid parameter",
            ResponseCode::TokenNotFound => "token not found",
            ResponseCode::TokenEmpty => "token empty",
            ResponseCode::RateLimit => "rate limit",
            ResponseCode::Unknown(_) => "undocumented",
        }
    }
}
