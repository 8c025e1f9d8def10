//! Commit status types (GitHub's legacy Status API).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The state of a commit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusState {
    Pending,
    Success,
    Failure,
    Error,
}

impl StatusState {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            StatusState::Pending => "pending",
            StatusState::Success => "success",
            StatusState::Failure => "failure",
            StatusState::Error => "error",
        }
    }

    /// Parses the API string. Unknown values yield `None`.
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Some(StatusState::Pending),
            "success" => Some(StatusState::Success),
            "failure" => Some(StatusState::Failure),
            "error" => Some(StatusState::Error),
            _ => None,
        }
    }
}

impl fmt::Display for StatusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

/// One status check on a commit.
///
/// The context is the identity key: a commit has at most one status per
/// context, and writing a status for an existing context replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckStatus {
    /// The name of the check, e.g. `"ci/unit-tests"`.
    pub context: String,
    pub state: StatusState,
    /// Free-form description. Empty when GitHub reports none.
    #[serde(default)]
    pub description: String,
    /// Link to the check's details page, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
}

impl CheckStatus {
    pub fn new(context: impl Into<String>, state: StatusState) -> Self {
        CheckStatus {
            context: context.into(),
            state,
            description: String::new(),
            target_url: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_success(&self) -> bool {
        self.state == StatusState::Success
    }
}
