//! Core domain types shared by the override handler and its adapters.

pub mod ids;
pub mod status;

pub use ids::{PrNumber, RepoId, Sha};
pub use status::{CheckStatus, StatusState};
