//! GitHub API error type.

use std::fmt;
use thiserror::Error;

/// A failed GitHub API call.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    /// The HTTP status code, if the API answered at all.
    pub status_code: Option<u16>,

    /// A human-readable description of the error.
    pub message: String,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl GitHubApiError {
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status_code = match &err {
            octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
            _ => None,
        };
        Self {
            status_code,
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// An error for a response that arrived but could not be used.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code == Some(404)
    }
}
