//! Rendering and posting the single reply comment for an invocation.

use tracing::{debug, warn};

use crate::clients::GitHubClient;
use crate::webhooks::IssueCommentEvent;

use super::OverrideOutcome;

/// Renders the reply for an outcome, or `None` if the outcome is silent.
pub fn render(outcome: &OverrideOutcome, event: &IssueCommentEvent) -> Option<String> {
    let user = &event.author_login;
    let message = match outcome {
        OverrideOutcome::Ignored(_) => return None,
        OverrideOutcome::Unauthorized => format!(
            "{} unauthorized: /override is restricted to repo administrators",
            user
        ),
        OverrideOutcome::MissingTarget => {
            "/override requires a failed status context to operate on, but none was given"
                .to_string()
        }
        OverrideOutcome::UnknownContexts { unknown, known } => format!(
            "/override requires a failed status context to operate on.\n\
             The following unknown contexts were given:\n{}\n\n\
             Only the following contexts were expected:\n{}",
            bullet_list(unknown),
            bullet_list(known)
        ),
        OverrideOutcome::PrUnavailable => {
            format!("Cannot get PR {} in {}", event.number, event.repo)
        }
        OverrideOutcome::StatusesUnavailable => format!(
            "Cannot get commit statuses for PR {} in {}",
            event.number, event.repo
        ),
        OverrideOutcome::Overridden { contexts, .. } => {
            if contexts.is_empty() {
                return None;
            }
            let mut sorted: Vec<&str> = contexts.iter().map(String::as_str).collect();
            sorted.sort_unstable();
            format!(
                "Overrode contexts on behalf of {}: {}",
                user,
                sorted.join(", ")
            )
        }
    };
    Some(reply(event, &message))
}

/// Posts the reply for an outcome, if it has one.
///
/// A failed post is logged and otherwise ignored.
pub async fn notify<G>(github: &G, event: &IssueCommentEvent, outcome: &OverrideOutcome)
where
    G: GitHubClient + Sync,
{
    let Some(body) = render(outcome, event) else {
        debug!(repo = %event.repo, pr = %event.number, "Nothing to report");
        return;
    };
    if let Err(e) = github.create_comment(&event.repo, event.number, &body).await {
        warn!(repo = %event.repo, pr = %event.number, error = %e, "Failed to post override reply");
    }
}

fn bullet_list(items: &[String]) -> String {
    let mut sorted: Vec<&str> = items.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted
        .iter()
        .map(|item| format!("- `{}`", item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Addresses `message` to the commenter and quotes their comment below it.
fn reply(event: &IssueCommentEvent, message: &str) -> String {
    let source = match &event.html_url {
        Some(url) => format!("In response to [this]({}):", url),
        None => "In response to this:".to_string(),
    };
    let quoted = event
        .body
        .lines()
        .map(|line| format!(">{}", line))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "@{}: {}\n\n<details>\n\n{}\n\n{}\n</details>",
        event.author_login, message, source, quoted
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::SkipReason;
    use crate::test_utils::{ADMIN_USER, FakeGitHub, comment_event};

    #[test]
    fn ignored_outcomes_are_silent() {
        let event = comment_event("/test all");
        assert_eq!(render(&OverrideOutcome::Ignored(SkipReason::NoCommand), &event), None);
    }

    #[test]
    fn nothing_overridden_is_silent() {
        let event = comment_event("/override passing-test");
        let outcome = OverrideOutcome::Overridden {
            contexts: vec![],
            jobs: vec![],
        };
        assert_eq!(render(&outcome, &event), None);
    }

    #[test]
    fn success_lists_contexts_sorted() {
        let event = comment_event("/override hung-test\n/override broken-test");
        let outcome = OverrideOutcome::Overridden {
            contexts: vec!["hung-test".to_string(), "broken-test".to_string()],
            jobs: vec![],
        };
        let body = render(&outcome, &event).unwrap();
        assert!(body.contains(&format!("{}: broken-test, hung-test", ADMIN_USER)));
        assert!(body.contains("on behalf of admin-user"));
    }

    #[test]
    fn unknown_contexts_list_both_sides() {
        let event = comment_event("/override whatever-you-want");
        let outcome = OverrideOutcome::UnknownContexts {
            unknown: vec!["whatever-you-want".to_string()],
            known: vec!["hung-context".to_string(), "broken-context".to_string()],
        };
        let body = render(&outcome, &event).unwrap();
        assert!(body.contains(
            "The following unknown contexts were given:\n- `whatever-you-want`\n"
        ));
        assert!(body.contains(
            "Only the following contexts were expected:\n- `broken-context`\n- `hung-context`"
        ));
    }

    #[test]
    fn reply_addresses_and_quotes_commenter() {
        let mut event = comment_event("/override ci\nflaky again");
        event.html_url = Some("https://github.com/fake-org/fake-repo/pull/33#issuecomment-1".to_string());

        let body = render(&OverrideOutcome::MissingTarget, &event).unwrap();
        assert!(body.starts_with("@admin-user: /override requires"));
        assert!(body.contains("but none was given"));
        assert!(body.contains("In response to [this](https://github.com/fake-org/fake-repo/pull/33#issuecomment-1):"));
        assert!(body.contains(">/override ci\n>flaky again"));
    }

    #[test]
    fn fetch_failures_name_the_pr() {
        let event = comment_event("/override ci");
        let pr = render(&OverrideOutcome::PrUnavailable, &event).unwrap();
        assert!(pr.contains("Cannot get PR #33 in fake-org/fake-repo"));
        let statuses = render(&OverrideOutcome::StatusesUnavailable, &event).unwrap();
        assert!(statuses.contains("Cannot get commit statuses for PR #33 in fake-org/fake-repo"));
    }

    #[tokio::test]
    async fn post_failure_is_swallowed() {
        let github = FakeGitHub::new();
        let event = comment_event("/override fail-comment");

        notify(&github, &event, &OverrideOutcome::MissingTarget).await;

        assert!(github.comments().is_empty());
        assert_eq!(github.calls().create_comment, 1);
    }
}
