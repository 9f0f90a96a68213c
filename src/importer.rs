//! Paginated crawl of OpenTDB categories
//!
//! For each category the importer asks the count endpoint how many questions
//! exist, obtains a session token, and requests pages until one of these holds:
//!
//! - the seen-set has grown to the reported total
//! - the API answers with response code 1 (no results) or 4 (token exhausted)
//! - a successful page carries no results
//! - `max_stalled_pages` consecutive pages added no new question
//!
//! Progress is the size of the seen-set, so repeated questions never count
//! twice. Categories run one after another; the token and the rate limit are
//! shared by all of them.

use crate::api::{Batch, OpenTdbClient};
use crate::config::{CategoryConfig, DedupScope, ImportConfig};
use crate::dedup::Deduplicator;
use crate::error::{FetchError, Result};
use crate::report::{BatchReport, CategoryReport, CategoryStatus, RunReport, StopReason};
use crate::store::QuestionStore;
use crate::token::TokenManager;
use crate::types::ResponseCode;
use crate::upsert::persist_question;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Drives the import of one or more categories
pub struct Importer {
    client: Arc<OpenTdbClient>,
    store: Arc<dyn QuestionStore>,
    tokens: TokenManager,
    config: ImportConfig,
    run_seen: Deduplicator,
    last_batch_at: Option<Instant>,
}

impl Importer {
    /// Create an importer over an API client, a question store and a token manager
    pub fn new(
        client: Arc<OpenTdbClient>,
        store: Arc<dyn QuestionStore>,
        tokens: TokenManager,
        config: ImportConfig,
    ) -> Self {
        Self {
            client,
            store,
            tokens,
            config,
            run_seen: Deduplicator::new(),
            last_batch_at: None,
        }
    }

    /// The token manager (state inspection)
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Import every category in order
    ///
    /// A failing category is logged and recorded, and the run moves on. A token
    /// acquisition failure stops the run; the remaining categories are reported
    /// as not attempted.
    pub async fn run(&mut self, categories: &[CategoryConfig]) -> RunReport {
        let mut report = RunReport::default();
        self.run_seen.clear();

        for (index, category) in categories.iter().enumerate() {
            match self.import_category(category).await {
                Ok(category_report) => {
                    report
                        .categories
                        .push(CategoryStatus::Completed(category_report));
                }
                Err(e) => {
                    error!(
                        category_id = category.id,
                        category = %category.name,
                        error = %e,
                        "Category import failed"
                    );
                    report.categories.push(CategoryStatus::Failed {
                        category_id: category.id,
                        name: category.name.clone(),
                        error_code: e.error_code(),
                        message: e.to_string(),
                    });

                    if e.is_fatal_for_run() {
                        error!(error = %e, "Aborting import run");
                        report.aborted = Some(e.to_string());
                        report.categories.extend(categories[index + 1..].iter().map(
                            |rest| CategoryStatus::NotAttempted {
                                category_id: rest.id,
                                name: rest.name.clone(),
                            },
                        ));
                        break;
                    }
                }
            }
        }

        info!(
            imported = report.total_imported(),
            skipped = report.total_skipped(),
            failed = report.failed_categories(),
            "Import run finished"
        );
        report
    }

    /// Crawl one category and return its tally
    ///
    /// # Errors
    /// [`Error::Fetch`](crate::Error::Fetch) when a count or batch request fails
    /// or the batch endpoint answers with an unexpected response code;
    /// [`Error::TokenAcquisition`](crate::Error::TokenAcquisition) when no token
    /// can be obtained; a database error when the category row cannot be stored.
    pub async fn import_category(&mut self, category: &CategoryConfig) -> Result<CategoryReport> {
        let total = self.client.category_count(category.id).await?;
        let mut report = CategoryReport::new(category, total);

        if total == 0 {
            info!(
                category_id = category.id,
                category = %category.name,
                "No questions available, skipping category"
            );
            return Ok(report);
        }

        let token = self.tokens.get_token().await?;
        let row = self
            .store
            .upsert_category(category.id, &category.name)
            .await?;

        info!(
            category_id = category.id,
            category = %category.name,
            total,
            "Importing category"
        );

        let mut dedup = match self.config.dedup_scope {
            DedupScope::Category => Deduplicator::new(),
            DedupScope::Run => std::mem::take(&mut self.run_seen),
        };
        let result = self
            .crawl(category, row.id, &token, &mut dedup, &mut report)
            .await;
        if self.config.dedup_scope == DedupScope::Run {
            self.run_seen = dedup;
        }
        result?;

        info!(
            category_id = category.id,
            category = %category.name,
            imported = report.imported,
            created = report.created,
            skipped = report.skipped(),
            pages = report.pages,
            stop_reason = %report.stop_reason,
            "Category import finished"
        );
        Ok(report)
    }

    async fn crawl(
        &mut self,
        category: &CategoryConfig,
        category_row_id: i64,
        token: &str,
        dedup: &mut Deduplicator,
        report: &mut CategoryReport,
    ) -> Result<()> {
        let page_size = u64::from(self.config.effective_page_size());
        let max_stalled = self.config.max_stalled_pages.max(1);
        let start = dedup.len();
        let mut stalled = 0;

        let stop_reason = loop {
            let progress = (dedup.len() - start) as u64;
            if progress >= report.total_available {
                break StopReason::TargetReached;
            }

            let amount = page_size.min(report.total_available - progress) as u32;
            report.pages += 1;
            let page = report.pages;
            debug!(category_id = category.id, page, requested = amount, "Requesting page");

            let batch = self.throttled_fetch(amount, category.id, token).await?;
            match batch.code {
                ResponseCode::Success => {}
                ResponseCode::NoResults => {
                    info!(category_id = category.id, page, "No more results for category");
                    break StopReason::NoResults;
                }
                ResponseCode::TokenEmpty => {
                    info!(category_id = category.id, page, "Session token exhausted");
                    self.tokens.retire().await;
                    break StopReason::TokenExhausted;
                }
                ResponseCode::TokenNotFound => {
                    // The API forgets idle tokens; drop it so the next category starts fresh
                    warn!(category_id = category.id, page, "Session token unknown to the API");
                    self.tokens.retire().await;
                    return Err(FetchError::ResponseCode {
                        category_id: category.id,
                        code: batch.code.code(),
                        meaning: batch.code.meaning(),
                    }
                    .into());
                }
                other => {
                    return Err(FetchError::ResponseCode {
                        category_id: category.id,
                        code: other.code(),
                        meaning: other.meaning(),
                    }
                    .into());
                }
            }

            if batch.results.is_empty() {
                info!(category_id = category.id, page, "Empty page, stopping");
                break StopReason::EmptyPage;
            }

            let before = dedup.len();
            let mut page_report = BatchReport::default();
            for raw in &batch.results {
                let outcome =
                    persist_question(self.store.as_ref(), dedup, category_row_id, raw).await;
                page_report.record(&outcome);
            }
            report.absorb(&page_report);

            info!(
                category_id = category.id,
                page,
                received = page_report.received,
                imported = dedup.len() - start,
                skipped = page_report.skipped(),
                "Processed page"
            );

            if dedup.len() == before {
                stalled += 1;
                if stalled >= max_stalled {
                    warn!(
                        category_id = category.id,
                        pages = stalled,
                        "No new questions in consecutive pages, stopping"
                    );
                    break StopReason::Stalled;
                }
            } else {
                stalled = 0;
            }
        };

        report.imported = dedup.len() - start;
        report.stop_reason = stop_reason;
        Ok(())
    }

    /// Request a page, keeping at least `page_delay` after the previous
    /// page request of this importer, whichever category it belonged to
    async fn throttled_fetch(
        &mut self,
        amount: u32,
        category_id: i64,
        token: &str,
    ) -> std::result::Result<Batch, FetchError> {
        if let Some(last) = self.last_batch_at {
            tokio::time::sleep_until(last + self.config.page_delay).await;
        }
        let result = self.client.fetch_batch(amount, category_id, token).await;
        self.last_batch_at = Some(Instant::now());
        result
    }
}
