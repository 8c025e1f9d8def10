//! Completed job records for overridden contexts.
//!
//! A context that is produced by a configured presubmit gets a successful job
//! record, so anything reading job history sees the override as a passing run.

use chrono::Utc;
use tracing::{debug, info};

use crate::clients::{GitHubClient, JobClient, PresubmitLookup};
use crate::jobs::{JobRecord, OverrideOrigin};
use crate::types::{CheckStatus, Sha};
use crate::webhooks::IssueCommentEvent;

use super::OverrideError;
use super::reconcile::CommitStatuses;

/// Creates one job record per written status that has a presubmit definition.
///
/// The base branch is resolved at most once, and only if some context needs a job.
/// Each record links back to the comment in `event`.
pub async fn synthesize_jobs<G, J, P>(
    github: &G,
    jobs: &J,
    presubmits: &P,
    event: &IssueCommentEvent,
    current: &CommitStatuses,
    written: &[CheckStatus],
) -> Result<Vec<JobRecord>, OverrideError>
where
    G: GitHubClient + Sync,
    J: JobClient + Sync,
    P: PresubmitLookup + Sync,
{
    let repo = &event.repo;
    let origin = OverrideOrigin {
        comment_id: event.comment_id,
        url: event.html_url.clone(),
    };
    let mut base_sha: Option<Sha> = None;
    let mut created = Vec::new();

    for status in written {
        let Some(presubmit) = presubmits.presubmit_for_context(repo, &status.context) else {
            debug!(repo = %repo, context = %status.context, "No presubmit reports this context, no job created");
            continue;
        };

        let base = match &base_sha {
            Some(sha) => sha.clone(),
            None => {
                let git_ref = format!("heads/{}", current.pr.base_ref);
                let sha = github
                    .get_ref(repo, &git_ref)
                    .await
                    .map_err(|e| OverrideError::BaseRef {
                        git_ref: git_ref.clone(),
                        source: Box::new(e),
                    })?;
                base_sha = Some(sha.clone());
                sha
            }
        };

        let record = JobRecord::overridden(
            &presubmit,
            repo,
            &current.pr,
            base,
            &origin,
            status.description.clone(),
            Utc::now(),
        );
        let record = jobs
            .create_job(record)
            .await
            .map_err(|e| OverrideError::JobCreate {
                context: status.context.clone(),
                source: Box::new(e),
            })?;

        info!(repo = %repo, context = %status.context, job = %record.job, id = %record.id, "Created job for overridden context");
        created.push(record);
    }

    Ok(created)
}
