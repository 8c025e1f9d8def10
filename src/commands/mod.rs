//! Command parsing for `/override`.
//!
//! An admin forces failing status contexts to success by commenting on the
//! pull request:
//!
//! ```text
//! /override ci/e2e infra outage, see #1234
//! /override ci/lint
//! ```
//!
//! # Example
//!
//! ```
//! use override_bot::commands::{parse_override_command, OverrideCommand};
//!
//! match parse_override_command("/override ci/e2e\n/override ci/lint") {
//!     Some(OverrideCommand::Override(request)) => assert_eq!(request.len(), 2),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

mod parser;
mod types;

pub use parser::parse_override_command;
pub use types::{OverrideCommand, OverrideRequest};
