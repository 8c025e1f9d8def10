//! GitHub API client.
//!
//! `OctocrabClient` implements [`GitHubClient`](crate::clients::GitHubClient)
//! against the GitHub REST API via octocrab.

mod api;
mod client;
mod error;

pub use client::OctocrabClient;
pub use error::GitHubApiError;
