//! Run configuration: batching defaults, caller overrides, and the
//! per-run settings assembled by the binary.

use crate::model::Credentials;
use crate::report::ReportKind;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BATCH_SIZE: u32 = 10;
pub const DEFAULT_DELAY_BETWEEN_BATCHES: Duration = Duration::from_millis(1000);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(5000);
pub const DEFAULT_EXCLUDE_PREFIX: &str = "ms";
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required option: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Page size, pacing, and retry budget for one run.
///
/// Built once and never mutated; use [`BatchingConfig::merged`] to apply
/// caller overrides on top of the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchingConfig {
    pub batch_size: u32,
    pub delay_between_batches: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    /// Upper bound on repositories fetched. `None` means unbounded.
    pub limit: Option<u32>,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            delay_between_batches: DEFAULT_DELAY_BETWEEN_BATCHES,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            limit: None,
        }
    }
}

/// Caller-supplied overrides. Unset fields keep the base value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchingOverrides {
    pub batch_size: Option<u32>,
    pub delay_between_batches: Option<Duration>,
    pub max_retries: Option<u32>,
    pub retry_delay: Option<Duration>,
    pub limit: Option<u32>,
}

impl BatchingConfig {
    /// Returns a new config with each set override replacing the matching field.
    pub fn merged(&self, overrides: &BatchingOverrides) -> Self {
        Self {
            batch_size: overrides.batch_size.unwrap_or(self.batch_size),
            delay_between_batches: overrides
                .delay_between_batches
                .unwrap_or(self.delay_between_batches),
            max_retries: overrides.max_retries.unwrap_or(self.max_retries),
            retry_delay: overrides.retry_delay.unwrap_or(self.retry_delay),
            limit: overrides.limit.or(self.limit),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "batch_size",
                reason: "must be a positive integer".to_string(),
            });
        }
        if self.limit == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "limit",
                reason: "must be a positive integer when set".to_string(),
            });
        }
        Ok(())
    }
}

/// Everything one invocation of the binary needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub credentials: Credentials,
    pub report_kind: ReportKind,
    pub batching: BatchingConfig,
    /// Repositories whose name starts with this prefix (case-insensitive) are dropped.
    pub exclude_prefix: String,
    /// Member logins left out of the activity report.
    pub excluded_members: Vec<String>,
    pub output: PathBuf,
    pub endpoint: String,
}

impl RunConfig {
    pub fn new(credentials: Credentials, report_kind: ReportKind) -> Self {
        Self {
            credentials,
            report_kind,
            batching: BatchingConfig::default(),
            exclude_prefix: DEFAULT_EXCLUDE_PREFIX.to_string(),
            excluded_members: Vec::new(),
            output: report_kind.default_output(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.credentials.auth_token.trim().is_empty() {
            return Err(ConfigError::Missing("token"));
        }
        if self.credentials.organization.trim().is_empty() {
            return Err(ConfigError::Missing("org"));
        }
        if self.credentials.team.trim().is_empty() {
            return Err(ConfigError::Missing("team"));
        }
        self.batching.validate()
    }
}
