//! Matching requested contexts against the statuses on the PR's head commit.

use tracing::{debug, info, warn};

use crate::clients::{GitHubClient, PullRequestInfo};
use crate::commands::OverrideRequest;
use crate::types::{CheckStatus, PrNumber, RepoId, StatusState};

use super::OverrideError;

/// The pull request and the statuses currently on its head commit.
#[derive(Debug, Clone)]
pub struct CommitStatuses {
    pub pr: PullRequestInfo,
    pub statuses: Vec<CheckStatus>,
}

impl CommitStatuses {
    pub fn get(&self, context: &str) -> Option<&CheckStatus> {
        self.statuses.iter().find(|s| s.context == context)
    }

    /// Every context on the commit, sorted.
    pub fn contexts(&self) -> Vec<String> {
        let mut contexts: Vec<String> = self.statuses.iter().map(|s| s.context.clone()).collect();
        contexts.sort_unstable();
        contexts.dedup();
        contexts
    }
}

/// Which read failed. The underlying error is logged, not shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailure {
    PullRequest,
    Statuses,
}

/// Fetches the PR's head commit and every status on it.
pub async fn fetch_commit_statuses<G>(
    github: &G,
    repo: &RepoId,
    number: PrNumber,
) -> Result<CommitStatuses, FetchFailure>
where
    G: GitHubClient + Sync,
{
    let pr = match github.get_pull_request(repo, number).await {
        Ok(pr) => pr,
        Err(e) => {
            warn!(repo = %repo, pr = %number, error = %e, "Cannot get pull request");
            return Err(FetchFailure::PullRequest);
        }
    };

    let statuses = match github.list_statuses(repo, &pr.head_sha).await {
        Ok(statuses) => statuses,
        Err(e) => {
            warn!(repo = %repo, pr = %number, sha = %pr.head_sha, error = %e, "Cannot list commit statuses");
            return Err(FetchFailure::Statuses);
        }
    };

    debug!(repo = %repo, pr = %number, sha = %pr.head_sha, count = statuses.len(), "Fetched commit statuses");
    Ok(CommitStatuses { pr, statuses })
}

/// Requested contexts split by whether the commit has a status for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Sorted.
    pub known: Vec<String>,
    /// Sorted.
    pub unknown: Vec<String>,
}

pub fn classify(request: &OverrideRequest, current: &CommitStatuses) -> Classification {
    let (known, unknown): (Vec<&str>, Vec<&str>) = request
        .sorted()
        .into_iter()
        .partition(|context| current.get(context).is_some());
    Classification {
        known: known.into_iter().map(str::to_string).collect(),
        unknown: unknown.into_iter().map(str::to_string).collect(),
    }
}

/// The status description written for an overridden context.
pub fn override_description(user: &str) -> String {
    format!("Overridden by {}", user)
}

/// Writes a success status for every known context that is not already
/// successful, in sorted order.
///
/// Returns the statuses that were written. Stops at the first failed write;
/// writes that already succeeded stay in place.
pub async fn apply_overrides<G>(
    github: &G,
    repo: &RepoId,
    current: &CommitStatuses,
    known: &[String],
    user: &str,
) -> Result<Vec<CheckStatus>, OverrideError>
where
    G: GitHubClient + Sync,
{
    let sha = &current.pr.head_sha;
    let mut written = Vec::new();

    for context in known {
        let Some(existing) = current.get(context) else {
            continue;
        };
        if existing.is_success() {
            debug!(repo = %repo, context = %context, "Context already passing, leaving it untouched");
            continue;
        }

        let status = CheckStatus {
            context: context.clone(),
            state: StatusState::Success,
            description: override_description(user),
            target_url: existing.target_url.clone(),
        };
        github
            .create_status(repo, sha, &status)
            .await
            .map_err(|e| OverrideError::StatusWrite {
                context: context.clone(),
                source: Box::new(e),
            })?;

        info!(
            repo = %repo,
            pr = %current.pr.number,
            sha = %sha,
            context = %context,
            previous = %existing.state,
            user = %user,
            "Overrode status context"
        );
        written.push(status);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ADMIN_USER, FAKE_PR, FAKE_SHA, FakeGitHub, fake_repo};
    use crate::types::Sha;

    fn current(statuses: Vec<CheckStatus>) -> CommitStatuses {
        CommitStatuses {
            pr: PullRequestInfo {
                number: PrNumber(FAKE_PR),
                head_sha: Sha::new(FAKE_SHA),
                base_ref: "main".to_string(),
                author: "contributor".to_string(),
            },
            statuses,
        }
    }

    #[test]
    fn classify_splits_and_sorts() {
        let current = current(vec![
            CheckStatus::new("hung-test", StatusState::Pending),
            CheckStatus::new("broken-test", StatusState::Failure),
        ]);
        let request: OverrideRequest = ["zzz", "hung-test", "aaa", "broken-test"].into_iter().collect();

        assert_eq!(
            classify(&request, &current),
            Classification {
                known: vec!["broken-test".to_string(), "hung-test".to_string()],
                unknown: vec!["aaa".to_string(), "zzz".to_string()],
            }
        );
        assert_eq!(current.contexts(), vec!["broken-test", "hung-test"]);
    }

    #[tokio::test]
    async fn fetch_reports_which_read_failed() {
        let github = FakeGitHub::with_statuses([CheckStatus::new("ci", StatusState::Failure)]);
        assert_eq!(
            fetch_commit_statuses(&github, &fake_repo(), PrNumber(FAKE_PR * 2))
                .await
                .unwrap_err(),
            FetchFailure::PullRequest
        );

        let github = FakeGitHub::with_statuses([CheckStatus::new("fail-list", StatusState::Failure)]);
        assert_eq!(
            fetch_commit_statuses(&github, &fake_repo(), PrNumber(FAKE_PR))
                .await
                .unwrap_err(),
            FetchFailure::Statuses
        );
    }

    #[tokio::test]
    async fn apply_skips_passing_contexts() {
        let passing =
            CheckStatus::new("passing", StatusState::Success).with_description("preserve description");
        let github = FakeGitHub::with_statuses([
            passing.clone(),
            CheckStatus::new("failing", StatusState::Error),
        ]);
        let current = fetch_commit_statuses(&github, &fake_repo(), PrNumber(FAKE_PR))
            .await
            .unwrap();

        let written = apply_overrides(
            &github,
            &fake_repo(),
            &current,
            &["failing".to_string(), "passing".to_string()],
            ADMIN_USER,
        )
        .await
        .unwrap();

        assert_eq!(written.len(), 1);
        assert_eq!(written[0].context, "failing");
        assert_eq!(github.statuses()["passing"], passing);
        assert_eq!(
            github.statuses()["failing"].description,
            override_description(ADMIN_USER)
        );
    }

    #[tokio::test]
    async fn apply_preserves_target_url() {
        let mut failing = CheckStatus::new("ci", StatusState::Failure);
        failing.target_url = Some("https://ci.example.com/run/1".to_string());
        let github = FakeGitHub::with_statuses([failing]);
        let current = fetch_commit_statuses(&github, &fake_repo(), PrNumber(FAKE_PR))
            .await
            .unwrap();

        apply_overrides(&github, &fake_repo(), &current, &["ci".to_string()], ADMIN_USER)
            .await
            .unwrap();

        assert_eq!(
            github.statuses()["ci"].target_url.as_deref(),
            Some("https://ci.example.com/run/1")
        );
    }
}
