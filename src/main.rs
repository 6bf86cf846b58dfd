//! team-report - GitHub team vulnerability and pull-request activity reports.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use team_security_report::config::{BatchingConfig, BatchingOverrides, RunConfig, DEFAULT_ENDPOINT};
use team_security_report::github::GitHubClient;
use team_security_report::report::csv::DEFAULT_DELIMITER;
use team_security_report::report::{CsvFileWriter, ReportKind};
use team_security_report::{Credentials, ReportRunner, RunSummary};

/// Fetch a team's repositories from the GitHub GraphQL API and write a CSV report
#[derive(Parser, Debug)]
#[command(name = "team-report", version)]
#[command(after_help = "\
Examples:
  team-report --org acme --team platform                      Severity counts per repository
  team-report --org acme --team platform --report enhanced    Mean, std dev and Gini per repository
  team-report --org acme --team platform --report activity    Who opened a pull request today")]
struct Cli {
    /// GitHub token sent as a bearer credential
    #[arg(long, env = "GITHUB_AUTH_TOKEN", hide_env_values = true)]
    token: String,

    /// Organization login
    #[arg(long, env = "ORGANIZATION")]
    org: String,

    /// Team slug
    #[arg(long, env = "TEAM")]
    team: String,

    /// Report to generate: basic (alias original), enhanced, activity
    #[arg(long, env = "REPORT_TYPE", default_value = "basic")]
    report: ReportKind,

    /// Repositories requested per page
    #[arg(long)]
    batch_size: Option<u32>,

    /// Pause between pages in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Retries per page before giving up
    #[arg(long)]
    max_retries: Option<u32>,

    /// Pause between retries in milliseconds
    #[arg(long)]
    retry_delay_ms: Option<u64>,

    /// Stop after this many repositories
    #[arg(long)]
    limit: Option<u32>,

    /// Skip repositories whose name starts with this prefix (case-insensitive)
    #[arg(long, default_value = "ms")]
    exclude_prefix: String,

    /// Member login to leave out of the activity report (repeatable)
    #[arg(long = "exclude-member", env = "EXCLUDED_MEMBERS", value_delimiter = ',')]
    excluded_members: Vec<String>,

    /// Output file (default: report.csv, or enhanced-report.csv for the enhanced report)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Field delimiter for the written report
    #[arg(long, default_value_t = DEFAULT_DELIMITER)]
    delimiter: char,

    /// GraphQL endpoint
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    log_level: String,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        let credentials = Credentials::new(&self.token, &self.org, &self.team);
        let mut config = RunConfig::new(credentials, self.report);

        config.batching = BatchingConfig::default().merged(&BatchingOverrides {
            batch_size: self.batch_size,
            delay_between_batches: self.delay_ms.map(Duration::from_millis),
            max_retries: self.max_retries,
            retry_delay: self.retry_delay_ms.map(Duration::from_millis),
            limit: self.limit,
        });
        config.exclude_prefix = self.exclude_prefix.clone();
        config.excluded_members = self.excluded_members.clone();
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        config.endpoint = self.endpoint.clone();
        config
    }
}

async fn run(cli: &Cli) -> Result<RunSummary> {
    let config = cli.run_config();
    let client = Arc::new(
        GitHubClient::new(&config.endpoint, Duration::from_secs(cli.timeout_secs))
            .context("failed to create GitHub client")?,
    );
    let writer = CsvFileWriter::new(&config.output).with_delimiter(cli.delimiter);
    let runner = ReportRunner::new(client.clone(), client, writer);

    let summary = runner.run(&config).await?;
    Ok(summary)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(&cli).await {
        Ok(summary) => {
            info!(
                report = %summary.kind,
                rows = summary.rows,
                path = %summary.output.display(),
                "Report written"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error during report generation: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
