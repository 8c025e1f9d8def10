//! Decides whether a comment event is an `/override` the bot should act on.

use crate::commands::{OverrideCommand, parse_override_command};
use crate::webhooks::{CommentAction, IssueCommentEvent, IssueState};

/// Why an event was skipped. Skips are silent: no API calls, no comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Only newly created comments are acted on, so edits never re-run an override.
    NotCreated(CommentAction),
    NotPullRequest,
    NotOpen,
    NoCommand,
}

/// Returns the command to act on, or why the event is skipped.
pub fn eligible_command(event: &IssueCommentEvent) -> Result<OverrideCommand, SkipReason> {
    if event.action != CommentAction::Created {
        return Err(SkipReason::NotCreated(event.action));
    }
    if !event.is_pull_request {
        return Err(SkipReason::NotPullRequest);
    }
    if event.issue_state != IssueState::Open {
        return Err(SkipReason::NotOpen);
    }
    parse_override_command(&event.body).ok_or(SkipReason::NoCommand)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::comment_event;

    #[test]
    fn created_comment_on_open_pr_is_eligible() {
        let event = comment_event("/override broken-test");
        assert!(matches!(
            eligible_command(&event),
            Ok(OverrideCommand::Override(_))
        ));
    }

    #[test]
    fn bare_override_is_eligible_as_missing_target() {
        let event = comment_event("/override");
        assert_eq!(eligible_command(&event), Ok(OverrideCommand::MissingTarget));
    }

    #[test]
    fn edits_and_deletes_are_skipped() {
        for action in [CommentAction::Edited, CommentAction::Deleted] {
            let mut event = comment_event("/override broken-test");
            event.action = action;
            assert_eq!(eligible_command(&event), Err(SkipReason::NotCreated(action)));
        }
    }

    #[test]
    fn plain_issues_are_skipped() {
        let mut event = comment_event("/override broken-test");
        event.is_pull_request = false;
        assert_eq!(eligible_command(&event), Err(SkipReason::NotPullRequest));
    }

    #[test]
    fn closed_prs_are_skipped() {
        let mut event = comment_event("/override broken-test");
        event.issue_state = IssueState::Closed;
        assert_eq!(eligible_command(&event), Err(SkipReason::NotOpen));
    }

    #[test]
    fn unrelated_comments_are_skipped() {
        let event = comment_event("/test broken-test");
        assert_eq!(eligible_command(&event), Err(SkipReason::NoCommand));
    }
}
