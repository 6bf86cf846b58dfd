//! GraphQL documents, request variables, and response decoding.
//!
//! Decoding is kept free of I/O so every response shape can be tested from
//! a JSON fixture.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::harvest::traits::FetchError;
use crate::model::{PageResult, PullRequest, Repository, TeamMember, VulnerabilityAlert};

/// Alerts requested per repository. There is no inner pagination, so
/// repositories with more open alerts than this are under-reported.
pub const ALERTS_PER_REPOSITORY: u32 = 30;
pub const MEMBERS_PER_TEAM: u32 = 100;
pub const PULL_REQUESTS_PER_MEMBER: u32 = 10;

pub const TEAM_REPOSITORIES_QUERY: &str = r#"
query GetTeamReposWithVulnerabilities($orgLogin: String!, $teamSlug: String!, $cursor: String, $batchSize: Int!, $alertCount: Int!) {
  organization(login: $orgLogin) {
    team(slug: $teamSlug) {
      name
      repositories(first: $batchSize, after: $cursor) {
        totalCount
        pageInfo {
          hasNextPage
          endCursor
        }
        nodes {
          name
          nameWithOwner
          url
          vulnerabilityAlerts(first: $alertCount) {
            totalCount
            nodes {
              number
              state
              securityVulnerability {
                package {
                  name
                  ecosystem
                }
                severity
              }
              securityAdvisory {
                ghsaId
                summary
                severity
              }
            }
          }
        }
      }
    }
  }
}
"#;

pub const TEAM_MEMBER_ACTIVITY_QUERY: &str = r#"
query GetTeamMemberActivity($orgLogin: String!, $teamSlug: String!, $memberCount: Int!, $pullRequestCount: Int!) {
  organization(login: $orgLogin) {
    team(slug: $teamSlug) {
      members(first: $memberCount) {
        nodes {
          login
          name
          email
          pullRequests(first: $pullRequestCount, orderBy: {field: CREATED_AT, direction: DESC}) {
            nodes {
              title
              url
              createdAt
            }
          }
        }
      }
    }
  }
}
"#;

// ============================================================================
// Request
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a, V: Serialize> {
    pub query: &'a str,
    pub variables: V,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryPageVariables<'a> {
    pub org_login: &'a str,
    pub team_slug: &'a str,
    pub cursor: Option<&'a str>,
    pub batch_size: u32,
    pub alert_count: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MemberActivityVariables<'a> {
    pub org_login: &'a str,
    pub team_slug: &'a str,
    pub member_count: u32,
    pub pull_request_count: u32,
}

// ============================================================================
// Response wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct OrganizationData<T> {
    organization: Option<OrganizationNode<T>>,
}

#[derive(Debug, Deserialize)]
struct OrganizationNode<T> {
    team: Option<T>,
}

#[derive(Debug, Deserialize)]
struct TeamRepositories {
    repositories: Option<RepositoryConnection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryConnection {
    #[serde(default)]
    total_count: u64,
    page_info: Option<PageInfo>,
    nodes: Option<Vec<Option<RepositoryNode>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    #[serde(default)]
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    name: String,
    name_with_owner: String,
    url: String,
    vulnerability_alerts: Option<AlertConnection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlertConnection {
    #[serde(default)]
    total_count: u64,
    nodes: Option<Vec<Option<AlertNode>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlertNode {
    number: u64,
    state: String,
    security_vulnerability: SecurityVulnerability,
    security_advisory: SecurityAdvisory,
}

#[derive(Debug, Deserialize)]
struct SecurityVulnerability {
    package: PackageNode,
    severity: String,
}

#[derive(Debug, Deserialize)]
struct PackageNode {
    name: String,
    ecosystem: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecurityAdvisory {
    ghsa_id: String,
    summary: String,
}

#[derive(Debug, Deserialize)]
struct TeamMembers {
    members: Option<MemberConnection>,
}

#[derive(Debug, Deserialize)]
struct MemberConnection {
    nodes: Option<Vec<Option<MemberNode>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberNode {
    login: String,
    name: Option<String>,
    email: Option<String>,
    pull_requests: Option<PullRequestConnection>,
}

#[derive(Debug, Deserialize)]
struct PullRequestConnection {
    nodes: Option<Vec<Option<PullRequestNode>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestNode {
    title: String,
    url: String,
    created_at: DateTime<Utc>,
}

// ============================================================================
// Decoding
// ============================================================================

/// Parses the envelope and peels `data.organization.team`.
///
/// GraphQL errors win over partial data: the first reported message becomes
/// a [`FetchError::Protocol`].
fn decode_team<T: DeserializeOwned>(body: &str) -> Result<Option<T>, FetchError> {
    let response: GraphQlResponse<OrganizationData<T>> =
        serde_json::from_str(body).map_err(|e| FetchError::Shape {
            reason: format!("response is not a valid GraphQL payload: {}", e),
        })?;

    if let Some(first) = response.errors.as_ref().and_then(|errors| errors.first()) {
        return Err(FetchError::Protocol {
            message: first.message.clone(),
        });
    }

    Ok(response
        .data
        .and_then(|data| data.organization)
        .and_then(|organization| organization.team))
}

/// Decodes one page of the team repository connection.
pub fn decode_repository_page(body: &str) -> Result<PageResult, FetchError> {
    let connection = decode_team::<TeamRepositories>(body)?
        .and_then(|team| team.repositories)
        .ok_or_else(|| FetchError::Shape {
            reason: "No repository data found in response".to_string(),
        })?;

    let (has_next_page, end_cursor) = connection
        .page_info
        .map(|info| (info.has_next_page, info.end_cursor))
        .unwrap_or((false, None));

    let repositories = connection
        .nodes
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .map(Repository::from)
        .collect();

    Ok(PageResult {
        repositories,
        has_next_page,
        end_cursor,
        total_count: connection.total_count,
    })
}

/// Decodes the team's members with their most recent pull requests.
pub fn decode_team_members(body: &str) -> Result<Vec<TeamMember>, FetchError> {
    let connection = decode_team::<TeamMembers>(body)?
        .and_then(|team| team.members)
        .ok_or_else(|| FetchError::Shape {
            reason: "No team member data found in response".to_string(),
        })?;

    Ok(connection
        .nodes
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .map(TeamMember::from)
        .collect())
}

impl From<RepositoryNode> for Repository {
    fn from(node: RepositoryNode) -> Self {
        let (total_alerts, alert_nodes) = match node.vulnerability_alerts {
            Some(connection) => (connection.total_count, connection.nodes.unwrap_or_default()),
            None => (0, Vec::new()),
        };

        let alerts: Vec<VulnerabilityAlert> = alert_nodes
            .into_iter()
            .flatten()
            .map(|alert| VulnerabilityAlert {
                number: alert.number,
                state: alert.state,
                severity: alert.security_vulnerability.severity,
                package_name: alert.security_vulnerability.package.name,
                ecosystem: alert.security_vulnerability.package.ecosystem,
                advisory_id: alert.security_advisory.ghsa_id,
                advisory_summary: alert.security_advisory.summary,
            })
            .collect();

        Repository {
            name: node.name,
            name_with_owner: node.name_with_owner,
            url: node.url,
            total_alerts: total_alerts.max(alerts.len() as u64),
            alerts,
        }
    }
}

impl From<MemberNode> for TeamMember {
    fn from(node: MemberNode) -> Self {
        let pull_requests = node
            .pull_requests
            .and_then(|connection| connection.nodes)
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .map(|pr| PullRequest {
                title: pr.title,
                url: pr.url,
                created_at: pr.created_at,
            })
            .collect();

        TeamMember {
            login: node.login,
            name: node.name,
            email: node.email,
            pull_requests,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
