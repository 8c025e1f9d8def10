//! Who may override.

use tracing::warn;

use crate::clients::{GitHubClient, Role};
use crate::types::RepoId;

/// Returns true only if GitHub positively confirms `user` is a repository admin.
///
/// Fails closed: a permission lookup error counts as "not authorized".
pub async fn authorized<G>(github: &G, repo: &RepoId, user: &str) -> bool
where
    G: GitHubClient + Sync,
{
    match github.has_permission(repo, user, Role::Admin).await {
        Ok(is_admin) => is_admin,
        Err(e) => {
            warn!(repo = %repo, user = %user, error = %e, "Cannot determine permissions, denying override");
            false
        }
    }
}
