use std::path::{Path, PathBuf};

use crate::classifier::Classifier;
use crate::compact::compact;
use crate::config::Config;
use crate::prune::Pruner;
use crate::snapshot::{snapshot_all, Snapshot};
use crate::types::{CleanReport, Failure};

/// Progress callbacks for a whole run. Every method has a no-op default.
pub trait RunObserver {
    fn copied(&mut self, _snapshot: &Snapshot) {}
    fn cleaning(&mut self, _root: &Path) {}
    fn cleaned(&mut self, _report: &CleanReport) {}
    fn failed(&mut self, _root: &Path, _error: &anyhow::Error) {}
}

impl RunObserver for () {}

#[derive(Debug)]
pub struct RunSummary {
    pub output_root: PathBuf,
    pub snapshots: Vec<Snapshot>,
    pub reports: Vec<CleanReport>,
    /// Working copies whose cleaning stopped early.
    pub errors: Vec<Failure>,
}

impl RunSummary {
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.errors.len() + self.reports.iter().map(|r| r.failures().count()).sum::<usize>()
    }
}

/// Snapshot, prune, classify, compact: one repository at a time.
pub struct Cleaner {
    config: Config,
}

impl Cleaner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Copy every repository under `parent` into the output root and clean
    /// each copy. When no repository is found nothing else runs. A copy that
    /// fails to clean is recorded and the run moves on to the next.
    pub fn run(&self, parent: &Path, observer: &mut impl RunObserver) -> anyhow::Result<RunSummary> {
        let output_root = self.config.output_root(parent);
        let snapshots = snapshot_all(parent, &output_root, |s| observer.copied(s))?;

        let mut reports = Vec::new();
        let mut errors = Vec::new();
        for snapshot in &snapshots {
            let root = &snapshot.destination;
            observer.cleaning(root);
            // fresh copy: code/ and text/ are still ordinary directories
            match self.clean(root, false) {
                Ok(report) => {
                    observer.cleaned(&report);
                    reports.push(report);
                }
                Err(e) => {
                    tracing::warn!(root = %root.display(), error = %e, "cleaning stopped");
                    observer.failed(root, &e);
                    errors.push(Failure::new(root, format!("{:#}", e)));
                }
            }
        }

        Ok(RunSummary {
            output_root,
            snapshots,
            reports,
            errors,
        })
    }

    /// Run the in-place stages on a working copy that may have been cleaned
    /// before. `code/` and `text/` are taken as already classified, so
    /// repeating this is a no-op.
    pub fn clean_repository(&self, root: &Path) -> anyhow::Result<CleanReport> {
        self.clean(root, true)
    }

    fn clean(&self, root: &Path, skip_classified: bool) -> anyhow::Result<CleanReport> {
        if !root.is_dir() {
            anyhow::bail!("not a directory: {}", root.display());
        }

        let policy = &self.config.policy;
        let (pruner, classifier) = match skip_classified {
            true => (
                Pruner::new(policy).skip_classified(),
                Classifier::new(policy).skip_classified(),
            ),
            false => (Pruner::new(policy), Classifier::new(policy)),
        };

        let prune = pruner.prune(root);
        let classify = classifier.classify(root)?;
        let compact = compact(root);

        tracing::info!(
            root = %root.display(),
            moved = classify.moved.len(),
            pruned = prune.removed_count(),
            "cleaned repository"
        );

        Ok(CleanReport {
            root: root.to_path_buf(),
            prune,
            classify,
            compact,
        })
    }
}
