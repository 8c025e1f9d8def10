//! [`GitHubClient`] over the GitHub REST API.
//!
//! Calls are made once; a failure is reported to the caller as-is.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clients::{GitHubClient, PullRequestInfo, Role};
use crate::types::{CheckStatus, PrNumber, RepoId, Sha, StatusState};

use super::client::OctocrabClient;
use super::error::GitHubApiError;

/// Page size for the combined status endpoint (GitHub's maximum).
const STATUS_PAGE_SIZE: usize = 100;

impl GitHubClient for OctocrabClient {
    type Error = GitHubApiError;

    async fn create_comment(
        &self,
        repo: &RepoId,
        pr: PrNumber,
        body: &str,
    ) -> Result<(), GitHubApiError> {
        self.inner()
            .issues(&repo.owner, &repo.repo)
            .create_comment(pr.0, body)
            .await
            .map_err(GitHubApiError::from_octocrab)?;
        Ok(())
    }

    async fn create_status(
        &self,
        repo: &RepoId,
        sha: &Sha,
        status: &CheckStatus,
    ) -> Result<(), GitHubApiError> {
        let url = format!("/repos/{}/{}/statuses/{}", repo.owner, repo.repo, sha);

        #[derive(Serialize)]
        struct CreateStatusRequest<'a> {
            state: &'static str,
            context: &'a str,
            description: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            target_url: Option<&'a str>,
        }

        let request = CreateStatusRequest {
            state: status.state.as_api_str(),
            context: &status.context,
            description: &status.description,
            target_url: status.target_url.as_deref(),
        };

        let _: serde_json::Value = self
            .inner()
            .post(&url, Some(&request))
            .await
            .map_err(GitHubApiError::from_octocrab)?;
        Ok(())
    }

    async fn list_statuses(
        &self,
        repo: &RepoId,
        sha: &Sha,
    ) -> Result<Vec<CheckStatus>, GitHubApiError> {
        let mut statuses = Vec::new();
        let mut page = 1u32;

        loop {
            let url = format!(
                "/repos/{}/{}/commits/{}/status?per_page={}&page={}",
                repo.owner, repo.repo, sha, STATUS_PAGE_SIZE, page
            );
            let response: CombinedStatusResponse = self
                .inner()
                .get(&url, None::<&()>)
                .await
                .map_err(GitHubApiError::from_octocrab)?;

            let fetched = response.statuses.len();
            let total = response.total_count;
            statuses.extend(response.into_check_statuses()?);

            if fetched < STATUS_PAGE_SIZE || statuses.len() >= total {
                break;
            }
            page += 1;
        }

        debug!(repo = %repo, sha = %sha, count = statuses.len(), "Listed commit statuses");
        Ok(statuses)
    }

    async fn get_pull_request(
        &self,
        repo: &RepoId,
        pr: PrNumber,
    ) -> Result<PullRequestInfo, GitHubApiError> {
        let pull = self
            .inner()
            .pulls(&repo.owner, &repo.repo)
            .get(pr.0)
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        Ok(PullRequestInfo {
            number: pr,
            head_sha: Sha::new(pull.head.sha),
            base_ref: pull.base.ref_field,
            author: pull.user.map(|u| u.login).unwrap_or_default(),
        })
    }

    async fn has_permission(
        &self,
        repo: &RepoId,
        user: &str,
        role: Role,
    ) -> Result<bool, GitHubApiError> {
        let url = format!(
            "/repos/{}/{}/collaborators/{}/permission",
            repo.owner,
            repo.repo,
            urlencoding::encode(user)
        );

        let result: Result<PermissionResponse, _> = self.inner().get(&url, None::<&()>).await;
        match result {
            Ok(response) => Ok(response.role() == Some(role)),
            Err(e) => {
                let err = GitHubApiError::from_octocrab(e);
                if err.is_not_found() {
                    // Not a collaborator (or no such user).
                    Ok(false)
                } else {
                    Err(err)
                }
            }
        }
    }

    async fn get_ref(&self, repo: &RepoId, git_ref: &str) -> Result<Sha, GitHubApiError> {
        let url = format!(
            "/repos/{}/{}/git/ref/{}",
            repo.owner,
            repo.repo,
            encode_ref(git_ref)
        );
        let response: RefResponse = self
            .inner()
            .get(&url, None::<&()>)
            .await
            .map_err(GitHubApiError::from_octocrab)?;
        Ok(Sha::new(response.object.sha))
    }
}

/// Percent-encodes each segment of a ref, keeping the `/` separators.
fn encode_ref(git_ref: &str) -> String {
    git_ref
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Debug, Deserialize)]
struct CombinedStatusResponse {
    #[serde(default)]
    total_count: usize,
    #[serde(default)]
    statuses: Vec<StatusResponse>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    context: String,
    state: String,
    description: Option<String>,
    target_url: Option<String>,
}

impl CombinedStatusResponse {
    fn into_check_statuses(self) -> Result<Vec<CheckStatus>, GitHubApiError> {
        self.statuses
            .into_iter()
            .map(|s| {
                let state = StatusState::from_api_str(&s.state).ok_or_else(|| {
                    GitHubApiError::invalid_response(format!(
                        "unknown state {:?} for context {:?}",
                        s.state, s.context
                    ))
                })?;
                Ok(CheckStatus {
                    context: s.context,
                    state,
                    description: s.description.unwrap_or_default(),
                    target_url: s.target_url,
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct PermissionResponse {
    #[serde(default)]
    permission: Option<String>,
    #[serde(default)]
    role_name: Option<String>,
}

impl PermissionResponse {
    /// `role_name` distinguishes maintain/triage; older responses only carry `permission`.
    fn role(&self) -> Option<Role> {
        self.role_name
            .as_deref()
            .or(self.permission.as_deref())
            .and_then(Role::from_api_str)
    }
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    object: RefObject,
}

#[derive(Debug, Deserialize)]
struct RefObject {
    sha: String,
}
