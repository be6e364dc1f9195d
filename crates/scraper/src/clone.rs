use git2::{build::RepoBuilder, FetchOptions};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::error::ScrapeError;
use crate::record::RepoRecord;

pub const DEFAULT_PAUSE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneStatus {
    Cloned,
    /// The target directory already existed.
    Skipped,
    Failed(String),
}

#[derive(Debug, Default)]
pub struct CloneSummary {
    pub cloned: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(String, String)>,
}

impl CloneSummary {
    pub fn attempted(&self) -> usize {
        self.cloned.len() + self.failed.len()
    }
}

/// Shallow clone (depth=1) of the default branch.
pub fn shallow_clone(name: &str, url: &str, dest: &Path) -> Result<(), ScrapeError> {
    let mut fo = FetchOptions::new();
    fo.depth(1);

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fo);

    builder
        .clone(url, dest)
        .map(|_| ())
        .map_err(|source| ScrapeError::Clone {
            name: name.to_string(),
            source,
        })
}

/// Clone every record into `base_dir/<name>`, one at a time.
///
/// Existing directories are skipped without a pause. A failed clone is
/// reported and the loop moves on; `pause` is slept after each attempt.
pub fn clone_all(
    records: &[RepoRecord],
    base_dir: &Path,
    pause: Duration,
    mut on_status: impl FnMut(&RepoRecord, &CloneStatus),
) -> Result<CloneSummary, ScrapeError> {
    fs::create_dir_all(base_dir).map_err(|source| ScrapeError::Io {
        path: base_dir.to_path_buf(),
        source,
    })?;

    let mut summary = CloneSummary::default();

    for record in records {
        let local_path = base_dir.join(&record.name);

        if local_path.exists() {
            tracing::debug!(path = %local_path.display(), "already cloned");
            on_status(record, &CloneStatus::Skipped);
            summary.skipped.push(local_path);
            continue;
        }

        let status = match shallow_clone(&record.name, &record.clone_url, &local_path) {
            Ok(()) => {
                summary.cloned.push(local_path);
                CloneStatus::Cloned
            }
            Err(e) => {
                tracing::warn!(repo = %record.full_name, error = %e, "clone failed");
                summary.failed.push((record.name.clone(), e.to_string()));
                CloneStatus::Failed(e.to_string())
            }
        };
        on_status(record, &status);

        if !pause.is_zero() {
            thread::sleep(pause);
        }
    }

    Ok(summary)
}
