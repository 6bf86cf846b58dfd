//! Row-oriented report tables.
//!
//! Supports three report kinds:
//! - `basic` - severity counts, one column per severity seen across all repositories
//! - `enhanced` - per-repository mean, standard deviation, Gini coefficient and own severities
//! - `activity` - whether each team member opened a pull request today

pub mod activity;
pub mod basic;
pub mod csv;
pub mod enhanced;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub use csv::{render, CsvFileWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Basic,
    Enhanced,
    Activity,
}

impl ReportKind {
    pub fn default_output(&self) -> PathBuf {
        match self {
            ReportKind::Basic | ReportKind::Activity => PathBuf::from("report.csv"),
            ReportKind::Enhanced => PathBuf::from("enhanced-report.csv"),
        }
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" | "original" => Ok(ReportKind::Basic),
            "enhanced" => Ok(ReportKind::Enhanced),
            "activity" | "pr" => Ok(ReportKind::Activity),
            _ => Err(format!(
                "Unknown report '{}'. Valid reports: basic (original), enhanced, activity",
                s
            )),
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Basic => write!(f, "basic"),
            ReportKind::Enhanced => write!(f, "enhanced"),
            ReportKind::Activity => write!(f, "activity"),
        }
    }
}

/// Header plus rows of cells. Rows may be shorter or longer than the header.
///
/// A table with no header and no rows renders as an empty file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.rows.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{RepositoryVulnerability, SeverityHistogram};

    pub(crate) fn vulnerability(name: &str, counts: &[(&str, u64)]) -> RepositoryVulnerability {
        RepositoryVulnerability {
            repository_name: name.to_string(),
            vulnerabilities: counts
                .iter()
                .map(|(s, q)| (s.to_string(), *q))
                .collect::<SeverityHistogram>(),
        }
    }

    #[test]
    fn test_report_kind_parsing() {
        assert_eq!("original".parse::<ReportKind>(), Ok(ReportKind::Basic));
        assert_eq!("Enhanced".parse::<ReportKind>(), Ok(ReportKind::Enhanced));
        assert_eq!("activity".parse::<ReportKind>(), Ok(ReportKind::Activity));
        assert!("pdf".parse::<ReportKind>().is_err());
        assert_eq!(ReportKind::Enhanced.to_string(), "enhanced");
    }

    #[test]
    fn test_default_outputs() {
        assert_eq!(ReportKind::Basic.default_output(), PathBuf::from("report.csv"));
        assert_eq!(
            ReportKind::Enhanced.default_output(),
            PathBuf::from("enhanced-report.csv")
        );
    }

    #[test]
    fn test_table_empty() {
        assert!(Table::default().is_empty());
        assert!(!Table::new(vec!["a".into()]).is_empty());
    }
}
