//! Per-repository severity histograms.

use crate::model::{Repository, RepositoryVulnerability, SeverityHistogram};
use tracing::{debug, warn};

/// Drops repositories whose name starts with a prefix, ignoring ASCII case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRule {
    prefix: String,
}

impl ExclusionRule {
    pub fn prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_lowercase(),
        }
    }

    /// A rule that excludes nothing.
    pub fn none() -> Self {
        Self {
            prefix: String::new(),
        }
    }

    pub fn excludes(&self, repository_name: &str) -> bool {
        !self.prefix.is_empty() && repository_name.to_lowercase().starts_with(&self.prefix)
    }
}

impl Default for ExclusionRule {
    fn default() -> Self {
        Self::prefix(crate::config::DEFAULT_EXCLUDE_PREFIX)
    }
}

#[derive(Debug, Clone, Default)]
pub struct VulnerabilityAggregator {
    exclusion: ExclusionRule,
}

impl VulnerabilityAggregator {
    pub fn new(exclusion: ExclusionRule) -> Self {
        Self { exclusion }
    }

    /// Groups each retained repository's alerts by severity.
    ///
    /// Output order follows input order. Repositories without alerts are kept
    /// with an empty histogram.
    pub fn aggregate(&self, repositories: &[Repository]) -> Vec<RepositoryVulnerability> {
        repositories
            .iter()
            .filter(|repo| {
                let excluded = self.exclusion.excludes(&repo.name);
                if excluded {
                    debug!(repository = %repo.name, "Excluded by name prefix");
                }
                !excluded
            })
            .map(|repo| {
                if repo.alerts_truncated() {
                    warn!(
                        repository = %repo.name,
                        returned = repo.alerts.len(),
                        reported = repo.total_alerts,
                        "Alert list truncated, severity counts are a lower bound"
                    );
                }
                let mut histogram = SeverityHistogram::new();
                for alert in &repo.alerts {
                    histogram.increment(&alert.severity);
                }
                RepositoryVulnerability {
                    repository_name: repo.name.clone(),
                    vulnerabilities: histogram,
                }
            })
            .collect()
    }
}
