//! CI job records and where they are kept.
//!
//! When an overridden context belongs to a configured presubmit, the bot
//! records a finished, successful run of that job so that tooling reading job
//! history sees a real job rather than a bare status flip.

mod record;
mod store;

pub use record::{JobRecord, JobRefs, JobState, OverrideOrigin};
pub use store::{FileJobStore, JobError};
