use std::fmt;
use std::path::PathBuf;

use repo_tidy_core::{Destination, JunkRule};

/// A tolerated failure: the path was left as it was and the run continued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub path: PathBuf,
    pub reason: String,
}

impl Failure {
    pub fn new(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        Self {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PruneReport {
    pub dirs_removed: Vec<PathBuf>,
    pub files_removed: Vec<(PathBuf, JunkRule)>,
    pub failures: Vec<Failure>,
}

impl PruneReport {
    pub fn removed_count(&self) -> usize {
        self.dirs_removed.len() + self.files_removed.len()
    }

    pub fn merge(mut self, other: PruneReport) -> Self {
        self.dirs_removed.extend(other.dirs_removed);
        self.files_removed.extend(other.files_removed);
        self.failures.extend(other.failures);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovedFile {
    pub from: PathBuf,
    pub to: PathBuf,
    pub destination: Destination,
}

#[derive(Debug, Clone, Default)]
pub struct ClassifyReport {
    pub moved: Vec<MovedFile>,
    /// Files removed by the late junk check instead of being moved.
    pub deleted: Vec<(PathBuf, JunkRule)>,
    /// Sources dropped because an identical file was already at the target.
    pub duplicates: Vec<PathBuf>,
    pub failures: Vec<Failure>,
}

impl ClassifyReport {
    pub fn moved_to(&self, destination: Destination) -> usize {
        self.moved
            .iter()
            .filter(|m| m.destination == destination)
            .count()
    }

    /// Every destination path written by this run.
    pub fn moved_paths(&self) -> Vec<&PathBuf> {
        self.moved.iter().map(|m| &m.to).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompactReport {
    pub removed: Vec<PathBuf>,
}

/// Everything that happened to one repository.
#[derive(Debug, Clone)]
pub struct CleanReport {
    pub root: PathBuf,
    pub prune: PruneReport,
    pub classify: ClassifyReport,
    pub compact: CompactReport,
}

impl CleanReport {
    pub fn failures(&self) -> impl Iterator<Item = &Failure> {
        self.prune.failures.iter().chain(&self.classify.failures)
    }

    pub fn summary(&self) -> String {
        format!(
            "pruned {} dirs, {} files; code {}, text {}; {} empty dirs removed",
            self.prune.dirs_removed.len(),
            self.prune.files_removed.len() + self.classify.deleted.len(),
            self.classify.moved_to(Destination::Code),
            self.classify.moved_to(Destination::Text),
            self.compact.removed.len()
        )
    }
}
