//! File-backed job store.
//!
//! Each record is one pretty-printed JSON file at
//! `<root>/<owner>/<repo>/<id>.json`. Writes go through a temp file, fsync,
//! rename and a directory fsync, so a record is either fully present or absent.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::clients::JobClient;

use super::record::{JobRecord, JobState};

/// Errors from creating or reading job records.
#[derive(Debug, Error)]
pub enum JobError {
    /// Only completed, successful records may be created.
    #[error("job {id} has state {state:?}; only success records may be created")]
    NotSuccessful { id: String, state: JobState },

    #[error("job {0} already exists")]
    Duplicate(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Stores job records under a root directory.
#[derive(Debug, Clone)]
pub struct FileJobStore {
    root: PathBuf,
}

impl FileJobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileJobStore { root: root.into() }
    }

    fn path_for(&self, record: &JobRecord) -> PathBuf {
        self.root
            .join(&record.refs.repo.owner)
            .join(&record.refs.repo.repo)
            .join(format!("{}.json", record.id))
    }

    /// Writes a record. Fails if the record is not successful or already exists.
    pub fn save(&self, record: &JobRecord) -> Result<PathBuf, JobError> {
        if record.state != JobState::Success {
            return Err(JobError::NotSuccessful {
                id: record.id.clone(),
                state: record.state,
            });
        }

        let path = self.path_for(record);
        if path.exists() {
            return Err(JobError::Duplicate(record.id.clone()));
        }
        write_atomic(&path, &serde_json::to_vec_pretty(record)?)?;
        Ok(path)
    }

    /// Loads a record previously written by [`save`](Self::save).
    pub fn load(path: &Path) -> Result<JobRecord, JobError> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl JobClient for FileJobStore {
    type Error = JobError;

    async fn create_job(&self, record: JobRecord) -> Result<JobRecord, JobError> {
        let store = self.clone();
        let to_save = record.clone();
        let path = tokio::task::spawn_blocking(move || store.save(&to_save))
            .await
            .map_err(io::Error::other)??;
        info!(
            job = %record.job,
            context = %record.context,
            path = %path.display(),
            "Created job record"
        );
        Ok(record)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }

    std::fs::rename(&tmp_path, path)?;

    // The rename is only durable once the directory entry is synced.
    if let Some(parent) = path.parent() {
        File::open(parent)?.sync_all()?;
    }
    Ok(())
}
