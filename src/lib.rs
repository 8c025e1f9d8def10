//! Override Bot - a GitHub bot that lets repository admins force failing
//! commit statuses to pass with a `/override <context>` pull request comment.
//!
//! The core handler lives in [`overrides`] and talks to the outside world only
//! through the three ports in [`clients`]. The remaining modules are the
//! adapters and the HTTP server that make it runnable.

pub mod clients;
pub mod commands;
pub mod config;
pub mod github;
pub mod jobs;
pub mod overrides;
pub mod presubmits;
pub mod server;
pub mod types;
pub mod webhooks;

#[cfg(test)]
mod test_utils;
