//! The `/override` handler.
//!
//! One comment event runs one sequential pipeline:
//!
//! 1. [`eligibility`]: skip anything that is not a new `/override` comment on an open PR
//! 2. a bare `/override` gets a usage reply, whoever typed it
//! 3. [`auth`]: only repository admins may override
//! 4. [`reconcile`]: fetch the PR head statuses, reject unknown contexts, write success statuses
//! 5. [`synthesize`]: record a successful job for contexts backed by a presubmit
//! 6. [`notify`]: post at most one reply comment
//!
//! Problems the commenter can act on (bad usage, missing permission, GitHub
//! read failures) are reported by comment and return `Ok`. Failures after
//! something has been written return [`OverrideError`], and no reply is posted.

pub mod auth;
pub mod eligibility;
pub mod notify;
pub mod reconcile;
pub mod synthesize;


use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::clients::{GitHubClient, JobClient, PresubmitLookup};
use crate::commands::OverrideCommand;
use crate::jobs::JobRecord;
use crate::webhooks::IssueCommentEvent;

pub use eligibility::SkipReason;
pub use reconcile::FetchFailure;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A write to an upstream service failed partway through an override.
///
/// Writes made before the failure are not rolled back.
#[derive(Debug, Error)]
pub enum OverrideError {
    #[error("failed to write status for context {context:?}")]
    StatusWrite {
        context: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to resolve base ref {git_ref:?}")]
    BaseRef {
        git_ref: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to create job for context {context:?}")]
    JobCreate {
        context: String,
        #[source]
        source: BoxError,
    },
}

/// How an invocation ended when no write failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideOutcome {
    /// Not an override request. Nothing was called and nothing is posted.
    Ignored(SkipReason),

    /// The commenter is not a repository admin.
    Unauthorized,

    /// `/override` was given without a context.
    MissingTarget,

    /// Some requested contexts do not exist on the PR head. Nothing was written.
    UnknownContexts {
        /// Requested but absent, sorted.
        unknown: Vec<String>,
        /// Every context present on the head commit, sorted.
        known: Vec<String>,
    },

    PrUnavailable,

    StatusesUnavailable,

    Overridden {
        /// Contexts whose status was rewritten. Already-passing contexts are not included.
        contexts: Vec<String>,
        jobs: Vec<JobRecord>,
    },
}

impl From<FetchFailure> for OverrideOutcome {
    fn from(failure: FetchFailure) -> Self {
        match failure {
            FetchFailure::PullRequest => OverrideOutcome::PrUnavailable,
            FetchFailure::Statuses => OverrideOutcome::StatusesUnavailable,
        }
    }
}

/// Handles one comment event end to end, including the reply comment.
pub async fn handle_override<G, J, P>(
    github: &G,
    jobs: &J,
    presubmits: &P,
    event: &IssueCommentEvent,
) -> Result<OverrideOutcome, OverrideError>
where
    G: GitHubClient + Sync,
    J: JobClient + Sync,
    P: PresubmitLookup + Sync,
{
    let outcome = match evaluate(github, jobs, presubmits, event).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(repo = %event.repo, pr = %event.number, user = %event.author_login, error = %e, "Override failed partway");
            return Err(e);
        }
    };
    notify::notify(github, event, &outcome).await;
    Ok(outcome)
}

async fn evaluate<G, J, P>(
    github: &G,
    jobs: &J,
    presubmits: &P,
    event: &IssueCommentEvent,
) -> Result<OverrideOutcome, OverrideError>
where
    G: GitHubClient + Sync,
    J: JobClient + Sync,
    P: PresubmitLookup + Sync,
{
    let command = match eligibility::eligible_command(event) {
        Ok(command) => command,
        Err(reason) => {
            debug!(repo = %event.repo, pr = %event.number, reason = ?reason, "Skipping comment");
            return Ok(OverrideOutcome::Ignored(reason));
        }
    };

    let repo = &event.repo;
    let user = event.author_login.as_str();

    // A bare `/override` cannot mutate anything, so it is answered before the permission lookup.
    let request = match command {
        OverrideCommand::MissingTarget => return Ok(OverrideOutcome::MissingTarget),
        OverrideCommand::Override(request) => request,
    };

    if !auth::authorized(github, repo, user).await {
        warn!(repo = %repo, pr = %event.number, user = %user, "Rejected override from non-admin");
        return Ok(OverrideOutcome::Unauthorized);
    }

    let current = match reconcile::fetch_commit_statuses(github, repo, event.number).await {
        Ok(current) => current,
        Err(failure) => return Ok(failure.into()),
    };

    let classification = reconcile::classify(&request, &current);
    if !classification.unknown.is_empty() {
        info!(repo = %repo, pr = %event.number, unknown = ?classification.unknown, "Override names unknown contexts");
        return Ok(OverrideOutcome::UnknownContexts {
            unknown: classification.unknown,
            known: current.contexts(),
        });
    }

    let written =
        reconcile::apply_overrides(github, repo, &current, &classification.known, user).await?;
    let created =
        synthesize::synthesize_jobs(github, jobs, presubmits, event, &current, &written).await?;

    Ok(OverrideOutcome::Overridden {
        contexts: written.into_iter().map(|s| s.context).collect(),
        jobs: created,
    })
}

/// The three services an override needs, bundled for the server.
#[derive(Debug, Clone)]
pub struct OverrideHandler<G, J, P> {
    pub github: G,
    pub jobs: J,
    pub presubmits: P,
}

impl<G, J, P> OverrideHandler<G, J, P>
where
    G: GitHubClient + Sync,
    J: JobClient + Sync,
    P: PresubmitLookup + Sync,
{
    pub fn new(github: G, jobs: J, presubmits: P) -> Self {
        OverrideHandler {
            github,
            jobs,
            presubmits,
        }
    }

    pub async fn handle(&self, event: &IssueCommentEvent) -> Result<OverrideOutcome, OverrideError> {
        handle_override(&self.github, &self.jobs, &self.presubmits, event).await
    }
}
