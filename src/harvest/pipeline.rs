//! Cursor-based pagination driver.
//!
//! This module provides the [`PaginationDriver`] that walks the team's
//! repository connection one page at a time with:
//! - Page sizes shrunk near the configured `limit`
//! - A fixed pause between pages to respect the API rate budget
//! - Per-page retries via [`PageFetcher`]
//! - Structured logging via `tracing`

use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::config::{BatchingConfig, ConfigError};
use crate::executor::RetryPolicy;
use crate::harvest::fetcher::PageFetcher;
use crate::harvest::traits::{Delay, FetchError, PageSource};
use crate::model::{Credentials, Repository};

// ============================================================================
// Pagination State
// ============================================================================

/// Cursor bookkeeping for one pagination run.
///
/// `cursor` is only ever `Some` while another page is known to exist, so a
/// cursor from a finished connection can never be sent again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationState {
    pub cursor: Option<String>,
    pub has_next_page: bool,
    pub fetched: usize,
    pub pages: usize,
    /// Grand total used for progress reporting, set once from the first page.
    pub expected_total: Option<u64>,
}

impl PaginationState {
    fn new() -> Self {
        Self {
            has_next_page: true,
            ..Default::default()
        }
    }

    /// Page size for the next request, or `None` once the limit is reached.
    pub fn next_page_size(&self, config: &BatchingConfig) -> Option<u32> {
        match config.limit {
            Some(limit) => {
                let remaining = (limit as usize).saturating_sub(self.fetched);
                if remaining == 0 {
                    None
                } else {
                    Some(config.batch_size.min(remaining as u32))
                }
            }
            None => Some(config.batch_size),
        }
    }

    fn record_expected_total(&mut self, config: &BatchingConfig, total_count: u64) {
        if self.expected_total.is_none() {
            self.expected_total = Some(config.limit.map_or(total_count, u64::from));
        }
    }

    fn advance(&mut self, has_next_page: bool, end_cursor: Option<String>) {
        self.pages += 1;
        self.has_next_page = has_next_page;
        self.cursor = if has_next_page { end_cursor } else { None };
    }
}

/// Complete pagination result with repositories and statistics.
#[derive(Debug)]
pub struct HarvestResult {
    pub repositories: Vec<Repository>,

    /// Cursor to continue from when the run stopped at `limit` with pages left.
    ///
    /// `None` when the connection was exhausted.
    pub resume_cursor: Option<String>,

    pub stats: HarvestStats,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HarvestStats {
    pub pages_fetched: usize,
    pub repositories_fetched: usize,

    /// Sum of attempts over all pages (pages × 1 when nothing failed)
    pub total_attempts: u32,

    pub expected_total: Option<u64>,

    pub total_duration_ms: u64,
}

// ============================================================================
// Harvest Errors
// ============================================================================

#[derive(thiserror::Error, Debug)]
pub enum HarvestError {
    /// A page could not be fetched within the retry budget
    #[error("Page {page} failed after {attempts} attempt(s): {source}")]
    PageFailed {
        page: usize,
        attempts: u32,
        #[source]
        source: FetchError,
    },

    #[error("Invalid batching configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl HarvestError {
    /// The underlying fetch error, if a page failed.
    pub fn fetch_error(&self) -> Option<&FetchError> {
        match self {
            HarvestError::PageFailed { source, .. } => Some(source),
            HarvestError::InvalidConfig(_) => None,
        }
    }
}

// ============================================================================
// Pagination Driver
// ============================================================================

/// Sequential, rate-paced walk over the team's repositories.
///
/// Pages are requested strictly one at a time. Between pages the driver
/// waits `delay_between_batches`; no wait follows the final page.
///
/// # Example
///
/// ```ignore
/// let driver = PaginationDriver::new(Arc::new(client), BatchingConfig::default());
/// let result = driver.fetch_all(&credentials).await?;
/// println!("Fetched {} repositories", result.repositories.len());
/// ```
pub struct PaginationDriver<S: PageSource> {
    fetcher: PageFetcher<S>,
    delay: Arc<dyn Delay>,
    config: BatchingConfig,
}

impl<S: PageSource> PaginationDriver<S> {
    /// Creates a driver that sleeps with tokio between pages and retries.
    pub fn new(source: Arc<S>, config: BatchingConfig) -> Self {
        Self::with_delay(source, config, Arc::new(crate::harvest::traits::TokioDelay))
    }

    /// Creates a driver with an injected [`Delay`] for both retry and page pauses.
    pub fn with_delay(source: Arc<S>, config: BatchingConfig, delay: Arc<dyn Delay>) -> Self {
        let fetcher = PageFetcher::new(source, RetryPolicy::from(&config), delay.clone());
        Self {
            fetcher,
            delay,
            config,
        }
    }

    pub fn config(&self) -> &BatchingConfig {
        &self.config
    }

    /// Fetches every repository of the team, up to the configured limit.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::PageFailed`] as soon as one page exhausts its
    /// retry budget; repositories from earlier pages are discarded.
    #[instrument(skip(self, credentials), fields(org = %credentials.organization, team = %credentials.team))]
    pub async fn fetch_all(&self, credentials: &Credentials) -> Result<HarvestResult, HarvestError> {
        self.config.validate()?;

        let start = Instant::now();
        let mut state = PaginationState::new();
        let mut repositories: Vec<Repository> = Vec::new();
        let mut total_attempts = 0u32;

        while state.has_next_page {
            let Some(page_size) = state.next_page_size(&self.config) else {
                info!(limit = ?self.config.limit, "Repository limit reached, stopping");
                break;
            };

            let attempted = self
                .fetcher
                .fetch(credentials, state.cursor.as_deref(), page_size)
                .await
                .map_err(|e| HarvestError::PageFailed {
                    page: state.pages + 1,
                    attempts: e.attempts,
                    source: e.into_inner(),
                })?;
            total_attempts += attempted.attempts;
            let mut page = attempted.value;

            state.record_expected_total(&self.config, page.total_count);

            if page.repositories.len() > page_size as usize {
                warn!(
                    requested = page_size,
                    returned = page.repositories.len(),
                    "Page larger than requested, truncating"
                );
                page.repositories.truncate(page_size as usize);
            }

            state.fetched += page.repositories.len();
            repositories.append(&mut page.repositories);

            let mut has_next_page = page.has_next_page;
            if has_next_page && page.end_cursor.is_none() {
                warn!(page = state.pages + 1, "Next page announced without a cursor, stopping");
                has_next_page = false;
            }
            state.advance(has_next_page, page.end_cursor);

            info!(
                page = state.pages,
                fetched = state.fetched,
                expected_total = ?state.expected_total,
                "Fetched {} of {} repositories",
                state.fetched,
                state.expected_total.unwrap_or_default()
            );

            if state.has_next_page && state.next_page_size(&self.config).is_some() {
                self.delay.wait(self.config.delay_between_batches).await;
            }
        }

        let stats = HarvestStats {
            pages_fetched: state.pages,
            repositories_fetched: state.fetched,
            total_attempts,
            expected_total: state.expected_total,
            total_duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            pages = stats.pages_fetched,
            repositories = stats.repositories_fetched,
            attempts = stats.total_attempts,
            duration_ms = stats.total_duration_ms,
            "Pagination completed"
        );

        Ok(HarvestResult {
            repositories,
            resume_cursor: state.cursor,
            stats,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
