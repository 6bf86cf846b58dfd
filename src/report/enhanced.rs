//! Enhanced report: distribution statistics per repository.
//!
//! The header lists the fixed columns followed by the first repository's
//! severities. Each row fills those columns by severity name: a severity the
//! repository lacks is left blank, and severities outside the header are
//! not written.

use crate::model::{DistributionStats, RepositoryVulnerability};
use crate::report::Table;
use crate::statistics;

pub const FIXED_COLUMNS: [&str; 4] = ["repository", "mean", "std_dev", "gini"];

#[derive(Debug, Clone, PartialEq)]
pub struct EnhancedRow<'a> {
    pub repository: &'a RepositoryVulnerability,
    pub stats: DistributionStats,
}

pub fn compute(repositories: &[RepositoryVulnerability]) -> Vec<EnhancedRow<'_>> {
    repositories
        .iter()
        .map(|repository| EnhancedRow {
            repository,
            stats: statistics::describe(&repository.vulnerabilities.quantities()),
        })
        .collect()
}

/// Builds the statistics table. Empty input yields an empty table.
pub fn build(repositories: &[RepositoryVulnerability]) -> Table {
    let rows = compute(repositories);
    let Some(first) = rows.first() else {
        return Table::default();
    };

    let mut header: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
    header.extend(first.repository.vulnerabilities.severities().map(str::to_string));

    let severity_columns = header[FIXED_COLUMNS.len()..].to_vec();
    let mut table = Table::new(header);
    for row in &rows {
        let mut cells = vec![
            row.repository.repository_name.clone(),
            row.stats.mean.to_string(),
            row.stats.standard_deviation.to_string(),
            row.stats.gini_coefficient.to_string(),
        ];
        cells.extend(severity_columns.iter().map(|severity| {
            row.repository
                .vulnerabilities
                .get(severity)
                .map(|q| q.to_string())
                .unwrap_or_default()
        }));
        table.push_row(cells);
    }
    table
}
