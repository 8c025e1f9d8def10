//! GitHub webhook event types.
//!
//! Only `issue_comment` matters to the bot: `/override` is typed into the
//! pull request conversation, which GitHub delivers as an issue comment.

use serde::{Deserialize, Serialize};

use crate::types::{PrNumber, RepoId};

/// A parsed GitHub webhook event.
///
/// Event types the bot does not handle are represented by the parser
/// returning `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GitHubEvent {
    IssueComment(IssueCommentEvent),
}

impl GitHubEvent {
    pub fn repo_id(&self) -> &RepoId {
        match self {
            GitHubEvent::IssueComment(e) => &e.repo,
        }
    }
}

/// Action performed on an issue comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentAction {
    Created,
    Edited,
    Deleted,
}

/// Open/closed state of the issue or pull request a comment was made on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Open,
    Closed,
}

/// An issue or pull request comment event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCommentEvent {
    pub repo: RepoId,

    pub action: CommentAction,

    /// The issue number. For pull requests this is the PR number.
    pub number: PrNumber,

    /// Whether the issue is a pull request.
    pub is_pull_request: bool,

    pub issue_state: IssueState,

    pub comment_id: u64,

    /// The comment body text. Empty for `deleted` actions.
    pub body: String,

    /// The comment author's login name.
    pub author_login: String,

    /// Link to the comment, used when quoting it back in replies.
    pub html_url: Option<String>,
}
