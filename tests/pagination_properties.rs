//! Limit and page-count properties of the pagination driver over arbitrary
//! batch sizes, limits and catalog sizes.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use proptest::prelude::*;
use team_security_report::harvest::{Delay, FetchError, PageSource, PaginationDriver};
use team_security_report::{BatchingConfig, Credentials, PageResult, Repository};

struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn wait(&self, _duration: Duration) {}
}

/// Serves a fixed catalog; the cursor is the offset of the next repository.
struct CatalogSource {
    size: usize,
    requested: Mutex<Vec<u32>>,
}

impl CatalogSource {
    fn new(size: usize) -> Self {
        Self {
            size,
            requested: Mutex::new(vec![]),
        }
    }
}

#[async_trait]
impl PageSource for CatalogSource {
    async fn fetch_page(
        &self,
        _credentials: &Credentials,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<PageResult, FetchError> {
        self.requested.lock().unwrap().push(page_size);
        let start: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
        let end = (start + page_size as usize).min(self.size);
        Ok(PageResult {
            repositories: (start..end)
                .map(|i| Repository {
                    name: format!("repo-{}", i),
                    name_with_owner: format!("acme/repo-{}", i),
                    url: format!("https://github.com/acme/repo-{}", i),
                    alerts: vec![],
                    total_alerts: 0,
                })
                .collect(),
            has_next_page: end < self.size,
            end_cursor: Some(end.to_string()),
            total_count: self.size as u64,
        })
    }
}

fn harvest(batch_size: u32, limit: u32, catalog_size: usize) -> (usize, usize, Vec<u32>) {
    let source = Arc::new(CatalogSource::new(catalog_size));
    let config = BatchingConfig {
        batch_size,
        delay_between_batches: Duration::ZERO,
        max_retries: 0,
        retry_delay: Duration::ZERO,
        limit: Some(limit),
    };
    let driver = PaginationDriver::with_delay(source.clone(), config, Arc::new(NoDelay));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let result = runtime
        .block_on(driver.fetch_all(&Credentials::new("token", "acme", "platform")))
        .unwrap();

    let requested = source.requested.lock().unwrap().clone();
    (result.repositories.len(), result.stats.pages_fetched, requested)
}

proptest! {
    #[test]
    fn output_never_exceeds_limit(
        batch_size in 1u32..20,
        limit in 1u32..80,
        catalog_size in 1usize..60,
    ) {
        let (fetched, _, _) = harvest(batch_size, limit, catalog_size);
        prop_assert!(fetched <= limit as usize);
        prop_assert_eq!(fetched, catalog_size.min(limit as usize));
    }

    #[test]
    fn pages_fetched_is_the_number_needed(
        batch_size in 1u32..20,
        limit in 1u32..80,
        catalog_size in 1usize..60,
    ) {
        let (_, pages, requested) = harvest(batch_size, limit, catalog_size);
        let wanted = catalog_size.min(limit as usize);
        let needed = (wanted + batch_size as usize - 1) / batch_size as usize;
        prop_assert_eq!(pages, needed);
        prop_assert_eq!(requested.len(), needed);
    }

    #[test]
    fn last_request_is_what_the_limit_leaves(
        batch_size in 1u32..20,
        limit in 1u32..80,
        catalog_size in 1usize..60,
    ) {
        let (_, _, requested) = harvest(batch_size, limit, catalog_size);
        let (last, earlier) = requested.split_last().unwrap();
        // every earlier page was full, so this is what was fetched before
        let fetched_before: u32 = earlier.iter().sum();
        prop_assert!(earlier.iter().all(|&size| size == batch_size));
        prop_assert_eq!(*last, batch_size.min(limit - fetched_before));
        if (limit as usize) <= catalog_size {
            prop_assert_eq!(*last, limit - fetched_before);
        }
    }
}
