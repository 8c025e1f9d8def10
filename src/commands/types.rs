//! Command types for `/override`.

use serde::{Deserialize, Serialize};

/// The contexts named by one comment's `/override` lines.
///
/// Behaves as an ordered set: names keep the order they were first given,
/// and repeating a name has no further effect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRequest {
    contexts: Vec<String>,
}

impl OverrideRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a context. Returns false if it was already present.
    pub fn insert(&mut self, context: impl Into<String>) -> bool {
        let context = context.into();
        if self.contains(&context) {
            return false;
        }
        self.contexts.push(context);
        true
    }

    pub fn contains(&self, context: &str) -> bool {
        self.contexts.iter().any(|c| c == context)
    }

    /// Contexts in the order they were requested.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.contexts.iter().map(String::as_str)
    }

    /// Contexts sorted ascending, for display.
    pub fn sorted(&self) -> Vec<&str> {
        let mut sorted: Vec<&str> = self.iter().collect();
        sorted.sort_unstable();
        sorted
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for OverrideRequest {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut request = OverrideRequest::new();
        for context in iter {
            request.insert(context);
        }
        request
    }
}

/// A parsed `/override` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverrideCommand {
    /// `/override` appeared without a context name.
    MissingTarget,

    /// One or more contexts to force to success.
    Override(OverrideRequest),
}
