//! Retrying page fetcher: one [`PageSource`] call per attempt, bounded by a
//! [`RetryPolicy`].

use std::sync::Arc;
use tracing::instrument;

use crate::executor::{Attempted, RetryExecutor, RetryExhausted, RetryPolicy};
use crate::harvest::traits::{Delay, PageSource};
use crate::model::{Credentials, PageResult};

/// Fetches single pages, retrying each one under the configured budget.
///
/// The attempt counter lives inside one [`PageFetcher::fetch`] call and is
/// discarded afterwards; a later page starts with a full budget.
pub struct PageFetcher<S: PageSource> {
    source: Arc<S>,
    executor: RetryExecutor,
}

impl<S: PageSource> PageFetcher<S> {
    pub fn new(source: Arc<S>, policy: RetryPolicy, delay: Arc<dyn Delay>) -> Self {
        Self {
            source,
            executor: RetryExecutor::new(policy, delay),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        self.executor.policy()
    }

    /// Fetches one page.
    ///
    /// # Errors
    ///
    /// Returns [`RetryExhausted`] carrying the last attempt's error once
    /// `max_retries` retries have failed.
    #[instrument(skip(self, credentials), fields(org = %credentials.organization, team = %credentials.team))]
    pub async fn fetch(
        &self,
        credentials: &Credentials,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<Attempted<PageResult>, RetryExhausted> {
        let source = &self.source;
        self.executor
            .execute("repository page fetch", move || {
                source.fetch_page(credentials, cursor, page_size)
            })
            .await
    }
}
