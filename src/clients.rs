//! The services the override handler talks to.
//!
//! Three independent ports, each of which can fail on its own:
//!
//! - [`GitHubClient`]: comments, commit statuses, pull requests, permissions, refs
//! - [`JobClient`]: records of CI job runs
//! - [`PresubmitLookup`]: which contexts are produced by a configured presubmit job
//!
//! Production implementations live in `github`, `jobs` and `presubmits`;
//! in-memory fakes for tests live in `test_utils`.

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::jobs::JobRecord;
use crate::presubmits::PresubmitDefinition;
use crate::types::{CheckStatus, PrNumber, RepoId, Sha};

/// A repository permission level, as reported by GitHub's collaborator API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Maintain,
    Write,
    Triage,
    Read,
}

impl Role {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Maintain => "maintain",
            Role::Write => "write",
            Role::Triage => "triage",
            Role::Read => "read",
        }
    }

    /// Parses a `role_name`. `"none"` and unknown values yield `None`.
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "maintain" => Some(Role::Maintain),
            "write" => Some(Role::Write),
            "triage" => Some(Role::Triage),
            "read" => Some(Role::Read),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

/// The parts of a pull request the override handler needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestInfo {
    pub number: PrNumber,
    /// The commit whose statuses are overridden.
    pub head_sha: Sha,
    /// The branch the PR targets, e.g. `"main"`.
    pub base_ref: String,
    /// Login of the PR author.
    pub author: String,
}

/// GitHub operations used by the override handler.
pub trait GitHubClient {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Posts a comment on an issue or pull request.
    fn create_comment(
        &self,
        repo: &RepoId,
        pr: PrNumber,
        body: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Creates a commit status, replacing any existing status with the same context.
    fn create_status(
        &self,
        repo: &RepoId,
        sha: &Sha,
        status: &CheckStatus,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Lists the current status of every context on a commit.
    fn list_statuses(
        &self,
        repo: &RepoId,
        sha: &Sha,
    ) -> impl Future<Output = Result<Vec<CheckStatus>, Self::Error>> + Send;

    fn get_pull_request(
        &self,
        repo: &RepoId,
        pr: PrNumber,
    ) -> impl Future<Output = Result<PullRequestInfo, Self::Error>> + Send;

    /// Returns whether `user` holds exactly `role` on the repository.
    fn has_permission(
        &self,
        repo: &RepoId,
        user: &str,
        role: Role,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Resolves a ref such as `heads/main` to the commit it points at.
    fn get_ref(
        &self,
        repo: &RepoId,
        git_ref: &str,
    ) -> impl Future<Output = Result<Sha, Self::Error>> + Send;
}

/// Creates job records.
///
/// Implementations only accept records that are already in the success
/// state; the override handler never creates a job that is still running.
pub trait JobClient {
    type Error: std::error::Error + Send + Sync + 'static;

    fn create_job(
        &self,
        record: JobRecord,
    ) -> impl Future<Output = Result<JobRecord, Self::Error>> + Send;
}

/// Looks up the presubmit job that reports a given context.
pub trait PresubmitLookup {
    fn presubmit_for_context(&self, repo: &RepoId, context: &str) -> Option<PresubmitDefinition>;
}
