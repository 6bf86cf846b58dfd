//! One report run: fetch, aggregate, build the table, hand it to the writer.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::{info, instrument};

use crate::activity::ActivityCollector;
use crate::aggregate::{ExclusionRule, VulnerabilityAggregator};
use crate::config::{ConfigError, RunConfig};
use crate::executor::{RetryExecutor, RetryExhausted, RetryPolicy};
use crate::harvest::pipeline::{HarvestError, PaginationDriver};
use crate::harvest::traits::{Delay, MemberSource, PageSource, TokioDelay};
use crate::report::{self, ReportKind, Table};
use crate::traits::{ReportError, ReportWriter};

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Repository harvest failed: {0}")]
    Harvest(#[from] HarvestError),

    #[error("Team activity fetch failed: {0}")]
    Activity(#[from] RetryExhausted),

    #[error(transparent)]
    Report(#[from] ReportError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub kind: ReportKind,
    pub output: PathBuf,
    pub rows: usize,
}

/// Wires the fetch engine, aggregation, and report writer together.
pub struct ReportRunner<S, M, W>
where
    S: PageSource,
    M: MemberSource,
    W: ReportWriter,
{
    pages: Arc<S>,
    members: Arc<M>,
    writer: W,
    delay: Arc<dyn Delay>,
    today: NaiveDate,
}

impl<S, M, W> ReportRunner<S, M, W>
where
    S: PageSource,
    M: MemberSource,
    W: ReportWriter,
{
    pub fn new(pages: Arc<S>, members: Arc<M>, writer: W) -> Self {
        Self {
            pages,
            members,
            writer,
            delay: Arc::new(TokioDelay),
            today: Utc::now().date_naive(),
        }
    }

    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    /// Overrides the UTC date the activity report checks against.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Runs one report. Nothing is written if fetching fails.
    #[instrument(skip(self, config), fields(report = %config.report_kind))]
    pub async fn run(&self, config: &RunConfig) -> Result<RunSummary, RunError> {
        config.validate()?;

        let table = match config.report_kind {
            ReportKind::Basic | ReportKind::Enhanced => self.vulnerability_table(config).await?,
            ReportKind::Activity => self.activity_table(config).await?,
        };

        let rows = table.rows.len();
        let output = self.writer.write(&table).await?;
        info!(path = %output.display(), rows, "Report generation ({}) completed", config.report_kind);

        Ok(RunSummary {
            kind: config.report_kind,
            output,
            rows,
        })
    }

    async fn vulnerability_table(&self, config: &RunConfig) -> Result<Table, RunError> {
        let driver = PaginationDriver::with_delay(
            self.pages.clone(),
            config.batching.clone(),
            self.delay.clone(),
        );
        let harvest = driver.fetch_all(&config.credentials).await?;

        let aggregator = VulnerabilityAggregator::new(ExclusionRule::prefix(&config.exclude_prefix));
        let vulnerabilities = aggregator.aggregate(&harvest.repositories);
        info!(
            fetched = harvest.repositories.len(),
            retained = vulnerabilities.len(),
            "Aggregated repository vulnerabilities"
        );

        Ok(match config.report_kind {
            ReportKind::Enhanced => report::enhanced::build(&vulnerabilities),
            _ => report::basic::build(&vulnerabilities),
        })
    }

    async fn activity_table(&self, config: &RunConfig) -> Result<Table, RunError> {
        let executor = RetryExecutor::new(RetryPolicy::from(&config.batching), self.delay.clone());
        let collector = ActivityCollector::new(self.members.clone(), executor);
        let excluded: HashSet<String> = config.excluded_members.iter().cloned().collect();

        let activity = collector
            .collect(&config.credentials, &excluded, self.today)
            .await?;
        Ok(report::activity::build(&activity))
    }
}
