//! Newtype wrappers for domain identifiers.
//!
//! These keep PR numbers, commit SHAs and repository names from being mixed up
//! at call sites that take several of them at once.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A pull request number within a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrNumber(pub u64);

impl fmt::Display for PrNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for PrNumber {
    fn from(n: u64) -> Self {
        PrNumber(n)
    }
}

/// A git commit SHA.
///
/// Not validated: GitHub is the source of every SHA the bot handles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sha(pub String);

impl Sha {
    pub fn new(s: impl Into<String>) -> Self {
        Sha(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a short (7-character) version of the SHA for display.
    pub fn short(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }
}

impl fmt::Display for Sha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Sha {
    fn from(s: &str) -> Self {
        Sha(s.to_string())
    }
}

/// A repository identifier (owner/repo format).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        RepoId {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parses `owner/repo`. Returns `None` unless both halves are non-empty.
    pub fn parse(full_name: &str) -> Option<Self> {
        let (owner, repo) = full_name.split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(RepoId::new(owner, repo))
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
