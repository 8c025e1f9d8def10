//! Presubmit job definitions.
//!
//! The bot only needs to know, per repository, which job reports which
//! status context. Definitions come from a JSON file:
//!
//! ```json
//! {
//!   "presubmits": {
//!     "my-org/my-repo": [
//!       { "name": "pull-my-repo-unit", "context": "ci/unit" }
//!     ]
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clients::PresubmitLookup;
use crate::types::RepoId;

/// A configured presubmit job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresubmitDefinition {
    /// Job name.
    pub name: String,
    /// Status context the job reports to.
    pub context: String,
}

impl PresubmitDefinition {
    pub fn new(name: impl Into<String>, context: impl Into<String>) -> Self {
        PresubmitDefinition {
            name: name.into(),
            context: context.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PresubmitConfigError {
    #[error("cannot read presubmit config: {0}")]
    Io(#[from] io::Error),

    #[error("invalid presubmit config: {0}")]
    Json(#[from] serde_json::Error),

    /// A key under `presubmits` is not `owner/repo`.
    #[error("invalid repository key {0:?}, expected owner/repo")]
    InvalidRepo(String),

    /// Two jobs in one repository report the same context.
    #[error("context {context:?} in {repo} is reported by more than one job")]
    DuplicateContext { repo: RepoId, context: String },
}

#[derive(Debug, Deserialize)]
struct RawPresubmitConfig {
    #[serde(default)]
    presubmits: HashMap<String, Vec<PresubmitDefinition>>,
}

/// Presubmit definitions for every configured repository.
#[derive(Debug, Clone, Default)]
pub struct PresubmitConfig {
    by_repo: HashMap<RepoId, Vec<PresubmitDefinition>>,
}

impl PresubmitConfig {
    /// A config with no presubmits: every override is status-only.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, PresubmitConfigError> {
        let bytes = std::fs::read(path)?;
        Self::from_json(&bytes)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, PresubmitConfigError> {
        let raw: RawPresubmitConfig = serde_json::from_slice(bytes)?;
        let mut by_repo = HashMap::new();

        for (key, definitions) in raw.presubmits {
            let repo = RepoId::parse(&key).ok_or(PresubmitConfigError::InvalidRepo(key))?;
            for (i, definition) in definitions.iter().enumerate() {
                if definitions[..i]
                    .iter()
                    .any(|d| d.context == definition.context)
                {
                    return Err(PresubmitConfigError::DuplicateContext {
                        repo,
                        context: definition.context.clone(),
                    });
                }
            }
            by_repo.insert(repo, definitions);
        }

        Ok(PresubmitConfig { by_repo })
    }

    pub fn insert(&mut self, repo: RepoId, definition: PresubmitDefinition) {
        let definitions = self.by_repo.entry(repo).or_default();
        definitions.retain(|d| d.context != definition.context);
        definitions.push(definition);
    }

    /// Number of configured definitions across all repositories.
    pub fn len(&self) -> usize {
        self.by_repo.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PresubmitLookup for PresubmitConfig {
    fn presubmit_for_context(&self, repo: &RepoId, context: &str) -> Option<PresubmitDefinition> {
        self.by_repo
            .get(repo)?
            .iter()
            .find(|d| d.context == context)
            .cloned()
    }
}
