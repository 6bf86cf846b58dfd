//! GitHub GraphQL adapter: implements [`PageSource`](crate::harvest::PageSource)
//! and [`MemberSource`](crate::harvest::MemberSource) over HTTP.

pub mod client;
pub mod query;

pub use client::{classify_status, GitHubClient};
pub use query::{
    decode_repository_page, decode_team_members, ALERTS_PER_REPOSITORY, MEMBERS_PER_TEAM,
    PULL_REQUESTS_PER_MEMBER,
};
