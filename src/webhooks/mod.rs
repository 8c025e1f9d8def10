//! Webhook handling for GitHub events.
//!
//! - Signature verification for webhook payloads (HMAC-SHA256)
//! - Parsing of `issue_comment` payloads into typed events

mod events;
mod parser;
mod signature;

pub use events::{CommentAction, GitHubEvent, IssueCommentEvent, IssueState};
pub use parser::{ParseError, parse_webhook};
pub use signature::WebhookSecret;
