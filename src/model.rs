use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Credentials forwarded to the GraphQL endpoint.
///
/// Supplied once at process start and never mutated afterwards.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub auth_token: String,
    pub organization: String,
    pub team: String,
}

impl Credentials {
    pub fn new(
        auth_token: impl Into<String>,
        organization: impl Into<String>,
        team: impl Into<String>,
    ) -> Self {
        Self {
            auth_token: auth_token.into(),
            organization: organization.into(),
            team: team.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("auth_token", &"<redacted>")
            .field("organization", &self.organization)
            .field("team", &self.team)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilityAlert {
    pub number: u64,
    pub state: String,
    pub severity: String, // "CRITICAL", "HIGH", "MODERATE", "LOW"
    pub package_name: String,
    pub ecosystem: String, // e.g., "NPM", "PIP"
    pub advisory_id: String, // GHSA-xxxx-xxxx-xxxx
    pub advisory_summary: String,
}

/// A repository owned by the team, with the alerts returned for it.
///
/// `alerts` holds at most [`ALERTS_PER_REPOSITORY`](crate::github::ALERTS_PER_REPOSITORY)
/// entries. Repositories with more open alerts than that are under-reported;
/// `total_alerts` carries the count the API claimed so callers can detect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub name_with_owner: String,
    pub url: String,
    pub alerts: Vec<VulnerabilityAlert>,
    pub total_alerts: u64,
}

impl Repository {
    /// True when the API reported more alerts than were returned.
    pub fn alerts_truncated(&self) -> bool {
        self.total_alerts > self.alerts.len() as u64
    }
}

/// One decoded page of the team's repository connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub repositories: Vec<Repository>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
    pub total_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCount {
    pub severity: String,
    pub quantity: u64,
}

/// Severity → count map that remembers first-seen order.
///
/// Entries live in a vector so iteration order is deterministic; the index
/// maps a severity label to its slot in `entries`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeverityHistogram {
    entries: Vec<SeverityCount>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl SeverityHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one occurrence of `severity`.
    pub fn increment(&mut self, severity: &str) {
        self.add(severity, 1);
    }

    pub fn add(&mut self, severity: &str, quantity: u64) {
        match self.index.get(severity) {
            Some(&slot) => self.entries[slot].quantity += quantity,
            None => {
                self.index.insert(severity.to_string(), self.entries.len());
                self.entries.push(SeverityCount {
                    severity: severity.to_string(),
                    quantity,
                });
            }
        }
    }

    pub fn get(&self, severity: &str) -> Option<u64> {
        self.index
            .get(severity)
            .map(|&slot| self.entries[slot].quantity)
    }

    pub fn entries(&self) -> &[SeverityCount] {
        &self.entries
    }

    pub fn severities(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.severity.as_str())
    }

    pub fn quantities(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.quantity as f64).collect()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.quantity).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for SeverityHistogram {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for SeverityHistogram {}

impl FromIterator<(String, u64)> for SeverityHistogram {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut histogram = Self::new();
        for (severity, quantity) in iter {
            histogram.add(&severity, quantity);
        }
        histogram
    }
}

/// Aggregated severity counts for one retained repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryVulnerability {
    pub repository_name: String,
    pub vulnerabilities: SeverityHistogram,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DistributionStats {
    pub mean: f64,
    pub standard_deviation: f64,
    pub gini_coefficient: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub login: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub pull_requests: Vec<PullRequest>,
}

/// Whether a team member opened a pull request on the report day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserActivity {
    pub username: String,
    pub email: Option<String>,
    pub has_activity_today: bool,
}
