//! End-to-end pagination scenarios against a scripted page source.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use team_security_report::aggregate::VulnerabilityAggregator;
use team_security_report::harvest::{Delay, FetchError, PageSource, PaginationDriver};
use team_security_report::{BatchingConfig, Credentials, PageResult, Repository, VulnerabilityAlert};

#[derive(Default)]
struct NoDelay {
    waits: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Delay for NoDelay {
    async fn wait(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

struct Script {
    pages: Mutex<VecDeque<Result<PageResult, FetchError>>>,
    cursors: Mutex<Vec<Option<String>>>,
}

impl Script {
    fn new(pages: Vec<Result<PageResult, FetchError>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            cursors: Mutex::new(vec![]),
        }
    }
}

#[async_trait]
impl PageSource for Script {
    async fn fetch_page(
        &self,
        _credentials: &Credentials,
        cursor: Option<&str>,
        _page_size: u32,
    ) -> Result<PageResult, FetchError> {
        self.cursors.lock().unwrap().push(cursor.map(str::to_string));
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .expect("driver requested more pages than scripted")
    }
}

fn repository(name: &str, severities: &[&str]) -> Repository {
    Repository {
        name: name.to_string(),
        name_with_owner: format!("acme/{}", name),
        url: format!("https://github.com/acme/{}", name),
        alerts: severities
            .iter()
            .map(|severity| VulnerabilityAlert {
                number: 1,
                state: "OPEN".to_string(),
                severity: severity.to_string(),
                package_name: "openssl".to_string(),
                ecosystem: "RUST".to_string(),
                advisory_id: "GHSA-xxxx-yyyy-zzzz".to_string(),
                advisory_summary: "Use after free".to_string(),
            })
            .collect(),
        total_alerts: severities.len() as u64,
    }
}

fn fast_config() -> BatchingConfig {
    BatchingConfig {
        batch_size: 1,
        delay_between_batches: Duration::from_millis(1000),
        max_retries: 3,
        retry_delay: Duration::from_millis(5000),
        limit: None,
    }
}

#[tokio::test]
async fn two_single_repository_pages() {
    let source = Arc::new(Script::new(vec![
        Ok(PageResult {
            repositories: vec![repository("core-lib", &["HIGH", "HIGH", "LOW"])],
            has_next_page: true,
            end_cursor: Some("Y3Vyc29yOjE=".to_string()),
            total_count: 2,
        }),
        Ok(PageResult {
            repositories: vec![repository("ms-foo", &["CRITICAL"])],
            has_next_page: false,
            end_cursor: Some("Y3Vyc29yOjI=".to_string()),
            total_count: 2,
        }),
    ]));
    let delay = Arc::new(NoDelay::default());
    let driver = PaginationDriver::with_delay(source.clone(), fast_config(), delay.clone());

    let result = driver
        .fetch_all(&Credentials::new("token", "acme", "platform"))
        .await
        .unwrap();

    assert_eq!(result.repositories.len(), 2);
    assert_eq!(result.resume_cursor, None);
    assert_eq!(result.stats.pages_fetched, 2);
    assert_eq!(
        *source.cursors.lock().unwrap(),
        vec![None, Some("Y3Vyc29yOjE=".to_string())]
    );
    assert_eq!(*delay.waits.lock().unwrap(), vec![Duration::from_millis(1000)]);

    let aggregated = VulnerabilityAggregator::default().aggregate(&result.repositories);
    assert_eq!(aggregated.len(), 1);
    assert_eq!(aggregated[0].repository_name, "core-lib");
    assert_eq!(aggregated[0].vulnerabilities.get("HIGH"), Some(2));
    assert_eq!(aggregated[0].vulnerabilities.get("LOW"), Some(1));
}

#[tokio::test]
async fn transient_failures_inside_a_page_are_absorbed() {
    let source = Arc::new(Script::new(vec![
        Err(FetchError::RateLimited { status: 403 }),
        Err(FetchError::Transport("connection reset by peer".to_string())),
        Ok(PageResult {
            repositories: vec![repository("api", &[])],
            has_next_page: false,
            end_cursor: None,
            total_count: 1,
        }),
    ]));
    let delay = Arc::new(NoDelay::default());
    let driver = PaginationDriver::with_delay(source.clone(), fast_config(), delay.clone());

    let result = driver
        .fetch_all(&Credentials::new("token", "acme", "platform"))
        .await
        .unwrap();

    assert_eq!(result.repositories.len(), 1);
    assert_eq!(result.stats.total_attempts, 3);
    assert_eq!(
        *delay.waits.lock().unwrap(),
        vec![Duration::from_millis(5000), Duration::from_millis(5000)]
    );
    // every retry reused the same (absent) cursor
    assert!(source.cursors.lock().unwrap().iter().all(Option::is_none));
}

#[tokio::test]
async fn limit_reached_mid_connection() {
    let page = |names: &[&str], cursor: &str| -> Result<PageResult, FetchError> {
        Ok(PageResult {
            repositories: names.iter().map(|n| repository(n, &[])).collect(),
            has_next_page: true,
            end_cursor: Some(cursor.to_string()),
            total_count: 50,
        })
    };
    let source = Arc::new(Script::new(vec![page(&["a", "b"], "c2"), page(&["c"], "c3")]));
    let config = BatchingConfig {
        batch_size: 2,
        limit: Some(3),
        ..fast_config()
    };
    let driver = PaginationDriver::with_delay(source, config, Arc::new(NoDelay::default()));

    let result = driver
        .fetch_all(&Credentials::new("token", "acme", "platform"))
        .await
        .unwrap();

    assert_eq!(result.repositories.len(), 3);
    assert_eq!(result.stats.expected_total, Some(3));
    assert_eq!(result.resume_cursor.as_deref(), Some("c3"));
}
