//! Shared test utilities: in-memory fakes of the three services, fixtures,
//! and generators for property-based testing.
//!
//! The fakes inject failures by name, so a test picks the failure it wants
//! through its inputs:
//!
//! - a comment whose body contains `fail-comment` cannot be posted
//! - a status with context `fail-create` cannot be written
//! - listing statuses fails while a `fail-list` context exists
//! - user `fail` makes the permission lookup error
//! - ref `heads/fail-ref` cannot be resolved
//! - a job for context `fail-job` cannot be created

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use thiserror::Error;

use crate::clients::{GitHubClient, JobClient, PullRequestInfo, Role};
use crate::jobs::{JobRecord, JobState};
use crate::presubmits::{PresubmitConfig, PresubmitDefinition};
use crate::types::{CheckStatus, PrNumber, RepoId, Sha};
use crate::webhooks::{CommentAction, IssueCommentEvent, IssueState};

pub const FAKE_ORG: &str = "fake-org";
pub const FAKE_REPO: &str = "fake-repo";
pub const FAKE_PR: u64 = 33;
pub const FAKE_SHA: &str = "deadbeef";
pub const FAKE_BASE_SHA: &str = "fffffff";
pub const ADMIN_USER: &str = "admin-user";

pub fn fake_repo() -> RepoId {
    RepoId::new(FAKE_ORG, FAKE_REPO)
}

/// A freshly created comment by the admin on the fake open PR.
pub fn comment_event(body: &str) -> IssueCommentEvent {
    IssueCommentEvent {
        repo: fake_repo(),
        action: CommentAction::Created,
        number: PrNumber(FAKE_PR),
        is_pull_request: true,
        issue_state: IssueState::Open,
        comment_id: 1,
        body: body.to_string(),
        author_login: ADMIN_USER.to_string(),
        html_url: None,
    }
}

/// Presubmits for the fake repo, as `(job name, context)` pairs.
pub fn presubmits(definitions: &[(&str, &str)]) -> PresubmitConfig {
    let mut config = PresubmitConfig::empty();
    for (name, context) in definitions {
        config.insert(fake_repo(), PresubmitDefinition::new(*name, *context));
    }
    config
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct FakeError(String);

fn fail<T>(message: impl Into<String>) -> Result<T, FakeError> {
    Err(FakeError(message.into()))
}

/// How many times each GitHub operation was called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calls {
    pub create_comment: usize,
    pub create_status: usize,
    pub list_statuses: usize,
    pub get_pull_request: usize,
    pub has_permission: usize,
    pub get_ref: usize,
}

impl Calls {
    pub fn total(&self) -> usize {
        self.create_comment
            + self.create_status
            + self.list_statuses
            + self.get_pull_request
            + self.has_permission
            + self.get_ref
    }
}

#[derive(Debug)]
struct FakeGitHubState {
    statuses: BTreeMap<String, CheckStatus>,
    comments: Vec<String>,
    base_ref: String,
    fail_pull_request: bool,
    calls: Calls,
}

/// In-memory GitHub for the fake repo and PR. Clones share state.
#[derive(Debug, Clone)]
pub struct FakeGitHub {
    state: Arc<Mutex<FakeGitHubState>>,
}

impl Default for FakeGitHub {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGitHub {
    pub fn new() -> Self {
        FakeGitHub {
            state: Arc::new(Mutex::new(FakeGitHubState {
                statuses: BTreeMap::new(),
                comments: Vec::new(),
                base_ref: "main".to_string(),
                fail_pull_request: false,
                calls: Calls::default(),
            })),
        }
    }

    /// Statuses present on the fake PR's head commit.
    pub fn with_statuses(statuses: impl IntoIterator<Item = CheckStatus>) -> Self {
        let github = Self::new();
        github.state.lock().unwrap().statuses = statuses
            .into_iter()
            .map(|s| (s.context.clone(), s))
            .collect();
        github
    }

    /// The branch the fake PR targets.
    pub fn with_base_ref(self, base_ref: &str) -> Self {
        self.state.lock().unwrap().base_ref = base_ref.to_string();
        self
    }

    /// Makes every pull request lookup fail.
    pub fn fail_pull_request(&self) {
        self.state.lock().unwrap().fail_pull_request = true;
    }

    pub fn statuses(&self) -> BTreeMap<String, CheckStatus> {
        self.state.lock().unwrap().statuses.clone()
    }

    pub fn comments(&self) -> Vec<String> {
        self.state.lock().unwrap().comments.clone()
    }

    pub fn calls(&self) -> Calls {
        self.state.lock().unwrap().calls
    }

    fn check_repo(repo: &RepoId) -> Result<(), FakeError> {
        if *repo != fake_repo() {
            return fail(format!("bad repo: {}", repo));
        }
        Ok(())
    }

    fn check_sha(sha: &Sha) -> Result<(), FakeError> {
        if sha.as_str() != FAKE_SHA {
            return fail(format!("bad ref: {}", sha));
        }
        Ok(())
    }
}

impl GitHubClient for FakeGitHub {
    type Error = FakeError;

    async fn create_comment(&self, repo: &RepoId, pr: PrNumber, body: &str) -> Result<(), FakeError> {
        let mut state = self.state.lock().unwrap();
        state.calls.create_comment += 1;
        Self::check_repo(repo)?;
        if pr != PrNumber(FAKE_PR) {
            return fail(format!("bad number: {}", pr));
        }
        if body.contains("fail-comment") {
            return fail("injected create_comment failure");
        }
        state.comments.push(body.to_string());
        Ok(())
    }

    async fn create_status(&self, repo: &RepoId, sha: &Sha, status: &CheckStatus) -> Result<(), FakeError> {
        let mut state = self.state.lock().unwrap();
        state.calls.create_status += 1;
        if status.context == "fail-create" {
            return fail("injected create_status failure");
        }
        Self::check_repo(repo)?;
        Self::check_sha(sha)?;
        state.statuses.insert(status.context.clone(), status.clone());
        Ok(())
    }

    async fn list_statuses(&self, repo: &RepoId, sha: &Sha) -> Result<Vec<CheckStatus>, FakeError> {
        let mut state = self.state.lock().unwrap();
        state.calls.list_statuses += 1;
        Self::check_repo(repo)?;
        Self::check_sha(sha)?;
        if state.statuses.contains_key("fail-list") {
            return fail("injected list_statuses failure");
        }
        Ok(state.statuses.values().cloned().collect())
    }

    async fn get_pull_request(&self, repo: &RepoId, pr: PrNumber) -> Result<PullRequestInfo, FakeError> {
        let mut state = self.state.lock().unwrap();
        state.calls.get_pull_request += 1;
        if state.fail_pull_request {
            return fail("injected get_pull_request failure");
        }
        Self::check_repo(repo)?;
        if pr != PrNumber(FAKE_PR) {
            return fail(format!("bad number: {}", pr));
        }
        Ok(PullRequestInfo {
            number: pr,
            head_sha: Sha::new(FAKE_SHA),
            base_ref: state.base_ref.clone(),
            author: "contributor".to_string(),
        })
    }

    async fn has_permission(&self, repo: &RepoId, user: &str, role: Role) -> Result<bool, FakeError> {
        let mut state = self.state.lock().unwrap();
        state.calls.has_permission += 1;
        Self::check_repo(repo)?;
        if role != Role::Admin {
            return fail(format!("bad role: {}", role));
        }
        if user == "fail" {
            return fail("injected has_permission failure");
        }
        Ok(user == ADMIN_USER)
    }

    async fn get_ref(&self, repo: &RepoId, git_ref: &str) -> Result<Sha, FakeError> {
        let mut state = self.state.lock().unwrap();
        state.calls.get_ref += 1;
        Self::check_repo(repo)?;
        if git_ref == "heads/fail-ref" {
            return fail("injected get_ref failure");
        }
        Ok(Sha::new(FAKE_BASE_SHA))
    }
}

/// In-memory job store. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakeJobs {
    created: Arc<Mutex<Vec<JobRecord>>>,
}

impl FakeJobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> Vec<JobRecord> {
        self.created.lock().unwrap().clone()
    }
}

impl JobClient for FakeJobs {
    type Error = FakeError;

    async fn create_job(&self, record: JobRecord) -> Result<JobRecord, FakeError> {
        if record.state != JobState::Success {
            return fail(format!("bad job state: {:?}", record.state));
        }
        if record.context == "fail-job" {
            return fail("injected create_job failure");
        }
        self.created.lock().unwrap().push(record.clone());
        Ok(record)
    }
}

/// Context names that never trigger an injected failure.
pub fn arb_context() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_./]{0,15}".prop_map(String::from)
}

pub fn arb_pr_number() -> impl Strategy<Value = PrNumber> {
    any::<u64>().prop_map(PrNumber)
}

pub fn arb_sha() -> impl Strategy<Value = Sha> {
    "[0-9a-f]{40}".prop_map(Sha::new)
}
