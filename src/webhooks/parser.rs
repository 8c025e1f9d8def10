//! GitHub webhook payload parser.
//!
//! # Parsing Strategy
//!
//! 1. The event type comes from the `X-GitHub-Event` header
//! 2. Unknown event types return `Ok(None)` (ignored, not an error)
//! 3. Malformed payloads return `Err` with details

use serde::Deserialize;
use thiserror::Error;

use crate::types::{PrNumber, RepoId};

use super::events::{CommentAction, GitHubEvent, IssueCommentEvent, IssueState};

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Field has an unexpected value.
    #[error("invalid field value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Parses a webhook payload into a typed event.
///
/// # Examples
///
/// ```
/// use override_bot::webhooks::{parse_webhook, GitHubEvent};
///
/// let payload = br#"{
///     "action": "created",
///     "comment": {
///         "id": 123,
///         "body": "/override ci/unit",
///         "user": { "login": "octocat" }
///     },
///     "issue": {
///         "number": 42,
///         "state": "open",
///         "pull_request": { "url": "..." }
///     },
///     "repository": {
///         "owner": { "login": "owner" },
///         "name": "repo"
///     }
/// }"#;
///
/// let Some(GitHubEvent::IssueComment(event)) = parse_webhook("issue_comment", payload).unwrap()
/// else {
///     panic!("expected an issue comment");
/// };
/// assert!(event.is_pull_request);
/// assert_eq!(parse_webhook("push", b"{}").unwrap(), None);
/// ```
pub fn parse_webhook(event_type: &str, payload: &[u8]) -> Result<Option<GitHubEvent>, ParseError> {
    match event_type {
        "issue_comment" => parse_issue_comment(payload).map(|e| Some(GitHubEvent::IssueComment(e))),
        _ => Ok(None),
    }
}

// ============================================================================
// Raw payload structures, matching GitHub's JSON
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawRepository {
    owner: RawUser,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawIssueCommentPayload {
    action: String,
    comment: RawComment,
    issue: RawIssue,
    repository: RawRepository,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    id: u64,
    body: Option<String>,
    user: RawUser,
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    number: u64,
    state: String,
    // Present only when the issue is a pull request.
    pull_request: Option<serde_json::Value>,
}

fn parse_issue_comment(payload: &[u8]) -> Result<IssueCommentEvent, ParseError> {
    let raw: RawIssueCommentPayload = serde_json::from_slice(payload)?;

    let action = match raw.action.as_str() {
        "created" => CommentAction::Created,
        "edited" => CommentAction::Edited,
        "deleted" => CommentAction::Deleted,
        other => {
            return Err(ParseError::InvalidField {
                field: "action",
                value: other.to_string(),
            });
        }
    };

    let issue_state = match raw.issue.state.as_str() {
        "open" => IssueState::Open,
        "closed" => IssueState::Closed,
        other => {
            return Err(ParseError::InvalidField {
                field: "issue.state",
                value: other.to_string(),
            });
        }
    };

    Ok(IssueCommentEvent {
        repo: RepoId::new(raw.repository.owner.login, raw.repository.name),
        action,
        number: PrNumber(raw.issue.number),
        is_pull_request: raw.issue.pull_request.is_some(),
        issue_state,
        comment_id: raw.comment.id,
        body: raw.comment.body.unwrap_or_default(),
        author_login: raw.comment.user.login,
        html_url: raw.comment.html_url,
    })
}
