//! Parser for `/override` lines in comment text.
//!
//! Pure: takes the raw comment body and returns what was asked for, without
//! looking at the pull request or the caller.

use super::types::{OverrideCommand, OverrideRequest};

/// The command word. Matched ASCII case-insensitively.
const COMMAND: &str = "/override";

/// Parses every `/override` line in a comment.
///
/// # Parsing Rules
///
/// - Lines are split on `\n`; a trailing `\r` is dropped (GitHub sends CRLF)
/// - A command line starts with `/override` followed by whitespace or the end
///   of the line; `/overrides` or `/override-x` are not commands
/// - The first whitespace-separated token after the command word is the
///   context; anything after it on the same line is an explanation and is
///   discarded
/// - Any bare `/override` line makes the whole comment `MissingTarget`
/// - Returns `None` when the comment contains no command line at all
///
/// # Examples
///
/// ```
/// use override_bot::commands::{parse_override_command, OverrideCommand};
///
/// let Some(OverrideCommand::Override(request)) =
///     parse_override_command("/override ci/unit flaked again\r\nthanks")
/// else {
///     panic!("expected an override");
/// };
/// assert_eq!(request.iter().collect::<Vec<_>>(), vec!["ci/unit"]);
///
/// assert_eq!(parse_override_command("/override"), Some(OverrideCommand::MissingTarget));
/// assert_eq!(parse_override_command("/test ci/unit"), None);
/// ```
pub fn parse_override_command(body: &str) -> Option<OverrideCommand> {
    let mut request = OverrideRequest::new();
    let mut saw_command = false;
    let mut missing_target = false;

    for line in body.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        match parse_line(line) {
            None => {}
            Some(None) => {
                saw_command = true;
                missing_target = true;
            }
            Some(Some(context)) => {
                saw_command = true;
                request.insert(context);
            }
        }
    }

    if !saw_command {
        return None;
    }
    if missing_target {
        return Some(OverrideCommand::MissingTarget);
    }
    Some(OverrideCommand::Override(request))
}

/// Parses one line.
///
/// `None` if the line is not a command, `Some(None)` for a bare command,
/// `Some(Some(context))` otherwise.
fn parse_line(line: &str) -> Option<Option<&str>> {
    let head = line.get(..COMMAND.len())?;
    if !head.eq_ignore_ascii_case(COMMAND) {
        return None;
    }

    let rest = &line[COMMAND.len()..];
    if !rest.is_empty() && !rest.starts_with(|c: char| c.is_whitespace()) {
        return None;
    }

    Some(rest.split_whitespace().next())
}
