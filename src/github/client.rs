//! HTTP transport for the GitHub GraphQL endpoint.
//!
//! Each call performs exactly one POST and classifies the outcome into a
//! [`FetchError`]. Retrying happens one level up.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::github::query::{
    decode_repository_page, decode_team_members, GraphQlRequest, MemberActivityVariables,
    RepositoryPageVariables, ALERTS_PER_REPOSITORY, MEMBERS_PER_TEAM, PULL_REQUESTS_PER_MEMBER,
    TEAM_MEMBER_ACTIVITY_QUERY, TEAM_REPOSITORIES_QUERY,
};
use crate::harvest::traits::{FetchError, MemberSource, PageSource};
use crate::model::{Credentials, PageResult, TeamMember};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Maps an HTTP status to a fetch failure. Success statuses map to `None`.
pub fn classify_status(status: StatusCode) -> Option<FetchError> {
    if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
        return Some(FetchError::RateLimited {
            status: status.as_u16(),
        });
    }
    if !status.is_success() {
        return Some(FetchError::RequestFailed {
            status: status.as_u16(),
        });
    }
    None
}

/// GraphQL client bound to one endpoint.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    endpoint: String,
    http: Client,
}

impl GitHubClient {
    /// Creates a client for `endpoint` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the HTTP client cannot be built.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one query and returns the raw body of a successful response.
    async fn post<V: Serialize + Send + Sync>(
        &self,
        credentials: &Credentials,
        request: &GraphQlRequest<'_, V>,
    ) -> Result<String, FetchError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&credentials.auth_token)
            .header(header::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        debug!(status = status.as_u16(), "GraphQL response received");
        if let Some(err) = classify_status(status) {
            return Err(err);
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl PageSource for GitHubClient {
    #[instrument(skip(self, credentials), fields(endpoint = %self.endpoint))]
    async fn fetch_page(
        &self,
        credentials: &Credentials,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<PageResult, FetchError> {
        let request = GraphQlRequest {
            query: TEAM_REPOSITORIES_QUERY,
            variables: RepositoryPageVariables {
                org_login: &credentials.organization,
                team_slug: &credentials.team,
                cursor,
                batch_size: page_size,
                alert_count: ALERTS_PER_REPOSITORY,
            },
        };
        let body = self.post(credentials, &request).await?;
        decode_repository_page(&body)
    }
}

#[async_trait]
impl MemberSource for GitHubClient {
    #[instrument(skip(self, credentials), fields(endpoint = %self.endpoint))]
    async fn fetch_members(&self, credentials: &Credentials) -> Result<Vec<TeamMember>, FetchError> {
        let request = GraphQlRequest {
            query: TEAM_MEMBER_ACTIVITY_QUERY,
            variables: MemberActivityVariables {
                org_login: &credentials.organization,
                team_slug: &credentials.team,
                member_count: MEMBERS_PER_TEAM,
                pull_request_count: PULL_REQUESTS_PER_MEMBER,
            },
        };
        let body = self.post(credentials, &request).await?;
        decode_team_members(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert!(classify_status(StatusCode::OK).is_none());
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN),
            Some(FetchError::RateLimited { status: 403 })
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            Some(FetchError::RateLimited { status: 429 })
        ));
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED),
            Some(FetchError::RequestFailed { status: 401 })
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY),
            Some(FetchError::RequestFailed { status: 502 })
        ));
    }

    #[test]
    fn test_client_keeps_endpoint() {
        let client =
            GitHubClient::new("https://api.github.com/graphql", Duration::from_secs(30)).unwrap();
        assert_eq!(client.endpoint(), "https://api.github.com/graphql");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_transport_error() {
        // A port that was just released has nothing listening on it.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let endpoint = format!("http://127.0.0.1:{}/graphql", port);
        let client = GitHubClient::new(&endpoint, Duration::from_secs(2)).unwrap();
        let err = client
            .fetch_page(&Credentials::new("t", "acme", "core"), None, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
