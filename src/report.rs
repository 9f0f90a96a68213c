//! Import outcomes, from single items up to the whole run
//!
//! Per-item results are values, not errors: a duplicate or an invalid item is an
//! expected outcome that is counted, not thrown. Items aggregate into a
//! [`BatchReport`] per page, pages into a [`CategoryReport`], and categories into
//! the [`RunReport`] printed at the end of a run.

use crate::config::CategoryConfig;
use std::fmt;

/// What happened to one API item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The question is stored
    Imported {
        /// Row id of the question
        question_id: i64,
        /// `false` when the text was already stored by an earlier run
        created: bool,
    },
    /// The item was not stored
    Skipped(SkipReason),
}

/// Why an item was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The decoded question text was already seen in this scope
    Duplicate,
    /// The item lacks required content or carries an unknown type
    Invalid(String),
    /// A persistence step failed
    PersistFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Duplicate => write!(f, "duplicate question text"),
            SkipReason::Invalid(reason) => write!(f, "invalid item: {}", reason),
            SkipReason::PersistFailed(reason) => write!(f, "persist failed: {}", reason),
        }
    }
}

/// Tally of one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Items on the page
    pub received: usize,
    /// Items stored (new to the seen-set)
    pub imported: usize,
    /// Of those, rows actually inserted
    pub created: usize,
    /// Items skipped as already seen
    pub skipped_duplicates: usize,
    /// Items skipped as invalid
    pub skipped_invalid: usize,
    /// Items skipped after a persistence failure
    pub skipped_failed: usize,
}

impl BatchReport {
    /// Count one item outcome
    pub fn record(&mut self, outcome: &ItemOutcome) {
        self.received += 1;
        match outcome {
            ItemOutcome::Imported { created, .. } => {
                self.imported += 1;
                if *created {
                    self.created += 1;
                }
            }
            ItemOutcome::Skipped(SkipReason::Duplicate) => self.skipped_duplicates += 1,
            ItemOutcome::Skipped(SkipReason::Invalid(_)) => self.skipped_invalid += 1,
            ItemOutcome::Skipped(SkipReason::PersistFailed(_)) => self.skipped_failed += 1,
        }
    }

    /// All skips on the page
    pub fn skipped(&self) -> usize {
        self.skipped_duplicates + self.skipped_invalid + self.skipped_failed
    }
}

/// Why the page loop of a category ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The count endpoint reported no questions
    NothingAvailable,
    /// The seen-set reached the reported total
    TargetReached,
    /// Response code 1
    NoResults,
    /// Response code 4; the token was retired
    TokenExhausted,
    /// A successful page carried no results
    EmptyPage,
    /// Too many consecutive pages added nothing new
    Stalled,
}

impl StopReason {
    /// Short label for logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::NothingAvailable => "nothing available",
            StopReason::TargetReached => "target reached",
            StopReason::NoResults => "no more results",
            StopReason::TokenExhausted => "token exhausted",
            StopReason::EmptyPage => "empty page",
            StopReason::Stalled => "stalled",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of importing one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryReport {
    /// OpenTDB category id
    pub category_id: i64,
    /// Category display name
    pub name: String,
    /// Total reported by the count endpoint
    pub total_available: u64,
    /// Unique questions stored (size of the seen-set)
    pub imported: usize,
    /// Rows inserted during this run
    pub created: usize,
    /// Items skipped as already seen
    pub skipped_duplicates: usize,
    /// Items skipped as invalid
    pub skipped_invalid: usize,
    /// Items skipped after a persistence failure
    pub skipped_failed: usize,
    /// Batch requests issued
    pub pages: u32,
    /// Why the loop ended
    pub stop_reason: StopReason,
}

impl CategoryReport {
    pub(crate) fn new(category: &CategoryConfig, total_available: u64) -> Self {
        Self {
            category_id: category.id,
            name: category.name.clone(),
            total_available,
            imported: 0,
            created: 0,
            skipped_duplicates: 0,
            skipped_invalid: 0,
            skipped_failed: 0,
            pages: 0,
            stop_reason: StopReason::NothingAvailable,
        }
    }

    /// Fold one page into the category totals (imported is tracked separately)
    pub(crate) fn absorb(&mut self, batch: &BatchReport) {
        self.created += batch.created;
        self.skipped_duplicates += batch.skipped_duplicates;
        self.skipped_invalid += batch.skipped_invalid;
        self.skipped_failed += batch.skipped_failed;
    }

    /// All skips in the category
    pub fn skipped(&self) -> usize {
        self.skipped_duplicates + self.skipped_invalid + self.skipped_failed
    }
}

/// How a category fared within a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryStatus {
    /// The page loop ran to one of its exit conditions
    Completed(CategoryReport),
    /// The category aborted with an error
    Failed {
        /// OpenTDB category id
        category_id: i64,
        /// Category display name
        name: String,
        /// Machine-readable error code
        error_code: &'static str,
        /// Error message
        message: String,
    },
    /// The run aborted before reaching this category
    NotAttempted {
        /// OpenTDB category id
        category_id: i64,
        /// Category display name
        name: String,
    },
}

/// Result of a multi-category run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// One entry per configured category, in run order
    pub categories: Vec<CategoryStatus>,
    /// Set when a fatal error stopped the run
    pub aborted: Option<String>,
}

impl RunReport {
    /// Whether a fatal error stopped the run
    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    fn completed(&self) -> impl Iterator<Item = &CategoryReport> {
        self.categories.iter().filter_map(|status| match status {
            CategoryStatus::Completed(report) => Some(report),
            _ => None,
        })
    }

    /// Unique questions stored across all categories
    pub fn total_imported(&self) -> usize {
        self.completed().map(|r| r.imported).sum()
    }

    /// Rows inserted across all categories
    pub fn total_created(&self) -> usize {
        self.completed().map(|r| r.created).sum()
    }

    /// Items skipped across all categories
    pub fn total_skipped(&self) -> usize {
        self.completed().map(CategoryReport::skipped).sum()
    }

    /// Categories that ended with an error
    pub fn failed_categories(&self) -> usize {
        self.categories
            .iter()
            .filter(|status| matches!(status, CategoryStatus::Failed { .. }))
            .count()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Import summary")?;
        for status in &self.categories {
            match status {
                CategoryStatus::Completed(r) => writeln!(
                    f,
                    "  [{}] {}: imported {} (new {}), skipped {} (duplicate {}, invalid {}, failed {}), {} page(s), stopped: {}",
                    r.category_id,
                    r.name,
                    r.imported,
                    r.created,
                    r.skipped(),
                    r.skipped_duplicates,
                    r.skipped_invalid,
                    r.skipped_failed,
                    r.pages,
                    r.stop_reason
                )?,
                CategoryStatus::Failed {
                    category_id,
                    name,
                    error_code,
                    message,
                } => writeln!(
                    f,
                    "  [{}] {}: FAILED ({}): {}",
                    category_id, name, error_code, message
                )?,
                CategoryStatus::NotAttempted { category_id, name } => {
                    writeln!(f, "  [{}] {}: not attempted", category_id, name)?
                }
            }
        }
        write!(
            f,
            "Total: imported {} (new {}), skipped {}, failed categories {}",
            self.total_imported(),
            self.total_created(),
            self.total_skipped(),
            self.failed_categories()
        )?;
        if let Some(reason) = &self.aborted {
            write!(f, "\nRun aborted: {}", reason)?;
        }
        Ok(())
    }
}
