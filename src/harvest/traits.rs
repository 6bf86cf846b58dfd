//! Core traits and error types for the fetch engine.
//!
//! This module defines the seams the engine is built on:
//! - Single-attempt data access via [`PageSource`] and [`MemberSource`]
//! - Time suspension via [`Delay`], so retry and pacing waits can be replaced in tests
//! - The failure taxonomy shared by every fetch, [`FetchError`]

use crate::model::{Credentials, PageResult, TeamMember};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Source Traits
// ============================================================================

/// One attempt at fetching one page of the team's repositories.
///
/// Implementations perform exactly one request and classify its outcome.
/// Retrying is the caller's job (see [`crate::executor::RetryExecutor`]).
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a source can be shared behind an `Arc`.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches up to `page_size` repositories starting after `cursor`.
    ///
    /// # Arguments
    ///
    /// * `credentials` - Bearer token, organization login and team slug
    /// * `cursor` - Opaque end cursor from the previous page, `None` for the first page
    /// * `page_size` - Number of repositories to request
    ///
    /// # Errors
    ///
    /// Returns a classified [`FetchError`] on transport, HTTP, GraphQL, or
    /// decoding failures.
    async fn fetch_page(
        &self,
        credentials: &Credentials,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<PageResult, FetchError>;
}

/// One attempt at fetching the team's members with their recent pull requests.
#[async_trait]
pub trait MemberSource: Send + Sync {
    async fn fetch_members(&self, credentials: &Credentials) -> Result<Vec<TeamMember>, FetchError>;
}

/// Suspends the current task for a duration.
///
/// Production code uses [`TokioDelay`]; tests inject a recorder so retry
/// and pacing behavior is observable without real waits.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// [`Delay`] backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Classification of a failed fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Network-level failure; no HTTP response was received
    Transport,

    /// HTTP 403 or 429
    RateLimit,

    /// Any other non-success HTTP status
    RequestFailure,

    /// Successful HTTP response carrying a GraphQL `errors` list
    Protocol,

    /// Successful payload missing the expected nested fields
    Shape,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Transport => write!(f, "transport"),
            FailureKind::RateLimit => write!(f, "rate-limit"),
            FailureKind::RequestFailure => write!(f, "request-failure"),
            FailureKind::Protocol => write!(f, "protocol"),
            FailureKind::Shape => write!(f, "shape"),
        }
    }
}

/// Errors that can occur during a single fetch attempt.
///
/// Every variant is retryable under the same budget and the same fixed
/// delay; the classification only feeds logging and the final error report.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request never produced an HTTP response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The endpoint refused the request for rate-limit reasons
    #[error("Rate limit exceeded (HTTP {status})")]
    RateLimited { status: u16 },

    /// Non-success HTTP status other than 403/429
    #[error("GitHub API request failed with status {status}")]
    RequestFailed { status: u16 },

    /// GraphQL-level error; message taken from the first reported error
    #[error("GraphQL error: {message}")]
    Protocol { message: String },

    /// Response decoded but the expected data was absent
    #[error("Unexpected response shape: {reason}")]
    Shape { reason: String },
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Transport(_) => FailureKind::Transport,
            FetchError::RateLimited { .. } => FailureKind::RateLimit,
            FetchError::RequestFailed { .. } => FailureKind::RequestFailure,
            FetchError::Protocol { .. } => FailureKind::Protocol,
            FetchError::Shape { .. } => FailureKind::Shape,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(e.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
