//! Team pull-request activity: who opened a pull request today.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::executor::{Attempted, RetryExecutor, RetryExhausted};
use crate::harvest::traits::MemberSource;
use crate::model::{Credentials, TeamMember, UserActivity};

/// Maps team members to activity rows for `today` (a UTC calendar date).
///
/// Members whose login is in `excluded_logins` are left out.
pub fn summarize_activity(
    members: &[TeamMember],
    excluded_logins: &HashSet<String>,
    today: NaiveDate,
) -> Vec<UserActivity> {
    members
        .iter()
        .filter(|member| !excluded_logins.contains(&member.login))
        .map(|member| UserActivity {
            username: member.login.clone(),
            email: member.email.clone(),
            has_activity_today: member
                .pull_requests
                .iter()
                .any(|pr| pr.created_at.date_naive() == today),
        })
        .collect()
}

/// Fetches the team's members under the retry policy and summarizes them.
pub struct ActivityCollector<M: MemberSource> {
    source: Arc<M>,
    executor: RetryExecutor,
}

impl<M: MemberSource> ActivityCollector<M> {
    pub fn new(source: Arc<M>, executor: RetryExecutor) -> Self {
        Self { source, executor }
    }

    #[instrument(skip(self, credentials, excluded_logins), fields(org = %credentials.organization, team = %credentials.team))]
    pub async fn collect(
        &self,
        credentials: &Credentials,
        excluded_logins: &HashSet<String>,
        today: NaiveDate,
    ) -> Result<Vec<UserActivity>, RetryExhausted> {
        let source = &self.source;
        let Attempted { value: members, attempts } = self
            .executor
            .execute("team member fetch", move || source.fetch_members(credentials))
            .await?;

        let activity = summarize_activity(&members, excluded_logins, today);
        info!(
            members = members.len(),
            reported = activity.len(),
            active = activity.iter().filter(|a| a.has_activity_today).count(),
            attempts,
            "Team activity collected"
        );
        Ok(activity)
    }
}
