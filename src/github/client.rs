//! Octocrab client wrapper.
//!
//! Unlike a repository-scoped client, every operation takes the repository
//! explicitly: one bot instance serves every repository its webhook is
//! installed on.

use octocrab::Octocrab;

/// A GitHub API client.
#[derive(Clone)]
pub struct OctocrabClient {
    client: Octocrab,
}

impl OctocrabClient {
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Creates a client authenticated with a personal access or app token.
    pub fn from_token(token: impl Into<String>) -> Result<Self, octocrab::Error> {
        let client = Octocrab::builder().personal_token(token.into()).build()?;
        Ok(Self::new(client))
    }

    /// Returns a reference to the underlying octocrab client.
    pub fn inner(&self) -> &Octocrab {
        &self.client
    }
}

impl std::fmt::Debug for OctocrabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabClient").finish_non_exhaustive()
    }
}
