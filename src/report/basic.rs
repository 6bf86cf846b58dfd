//! Basic report: repository name plus one count column per severity.

use crate::model::RepositoryVulnerability;
use crate::report::Table;

pub const REPOSITORY_COLUMN: &str = "repository";

/// Builds the severity table.
///
/// Severity columns are the union over all repositories, in first-seen
/// order; absent severities are zero-filled.
pub fn build(repositories: &[RepositoryVulnerability]) -> Table {
    let mut severities: Vec<&str> = Vec::new();
    for repo in repositories {
        for severity in repo.vulnerabilities.severities() {
            if !severities.contains(&severity) {
                severities.push(severity);
            }
        }
    }

    let mut header = vec![REPOSITORY_COLUMN.to_string()];
    header.extend(severities.iter().map(|s| format!("vulnerabilities {}", s)));

    let mut table = Table::new(header);
    for repo in repositories {
        let mut row = vec![repo.repository_name.clone()];
        row.extend(
            severities
                .iter()
                .map(|s| repo.vulnerabilities.get(s).unwrap_or(0).to_string()),
        );
        table.push_row(row);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::vulnerability;

    #[test]
    fn test_union_columns_zero_filled() {
        let table = build(&[
            vulnerability("core-lib", &[("HIGH", 2), ("LOW", 1)]),
            vulnerability("web", &[("CRITICAL", 4)]),
            vulnerability("docs", &[]),
        ]);

        assert_eq!(
            table.header,
            vec![
                "repository",
                "vulnerabilities HIGH",
                "vulnerabilities LOW",
                "vulnerabilities CRITICAL"
            ]
        );
        assert_eq!(table.rows[0], vec!["core-lib", "2", "1", "0"]);
        assert_eq!(table.rows[1], vec!["web", "0", "0", "4"]);
        assert_eq!(table.rows[2], vec!["docs", "0", "0", "0"]);
    }

    #[test]
    fn test_no_repositories_keeps_header() {
        let table = build(&[]);
        assert_eq!(table.header, vec!["repository"]);
        assert!(table.rows.is_empty());
    }
}
