//! Job record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clients::PullRequestInfo;
use crate::presubmits::PresubmitDefinition;
use crate::types::{PrNumber, RepoId, Sha};

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Triggered,
    Pending,
    Success,
    Failure,
    Aborted,
    Error,
}

/// The code a job ran against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRefs {
    pub repo: RepoId,
    pub base_ref: String,
    pub base_sha: Sha,
    pub pr: PrNumber,
    pub head_sha: Sha,
    pub author: String,
}

/// A single run of a CI job.
///
/// Records are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    /// Presubmit job name.
    pub job: String,
    /// Status context the job reports to.
    pub context: String,
    pub refs: JobRefs,
    pub state: JobState,
    pub description: String,
    /// Where to look for details. For an overridden job, the `/override` comment.
    #[serde(default)]
    pub url: Option<String>,
    pub start_time: DateTime<Utc>,
    pub completion_time: Option<DateTime<Utc>>,
}

/// The comment an override was requested in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideOrigin {
    pub comment_id: u64,
    pub url: Option<String>,
}

impl JobRecord {
    /// Builds an already-completed, successful record for an overridden context.
    ///
    /// Start and completion are both `now`: the job never actually ran.
    pub fn overridden(
        presubmit: &PresubmitDefinition,
        repo: &RepoId,
        pr: &PullRequestInfo,
        base_sha: Sha,
        origin: &OverrideOrigin,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        JobRecord {
            id: job_id(&presubmit.name, &pr.head_sha, origin.comment_id, now),
            job: presubmit.name.clone(),
            context: presubmit.context.clone(),
            refs: JobRefs {
                repo: repo.clone(),
                base_ref: pr.base_ref.clone(),
                base_sha,
                pr: pr.number,
                head_sha: pr.head_sha.clone(),
                author: pr.author.clone(),
            },
            state: JobState::Success,
            description: description.into(),
            url: origin.url.clone(),
            start_time: now,
            completion_time: Some(now),
        }
    }
}

/// `<job>-<short sha>-<comment id>-<millis>`, restricted to characters safe in a file name.
///
/// A comment names each context at most once, so the comment id keeps ids unique
/// even when two overrides land in the same millisecond.
fn job_id(job: &str, head_sha: &Sha, comment_id: u64, now: DateTime<Utc>) -> String {
    let raw = format!(
        "{}-{}-{}-{}",
        job,
        head_sha.short(),
        comment_id,
        now.timestamp_millis()
    );
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect()
}
