pub mod classifier;
pub mod compact;
pub mod config;
pub mod pipeline;
pub mod prune;
pub mod snapshot;
pub mod types;

pub use classifier::{Action, ClassifyPlan, Classifier};
pub use compact::compact;
pub use config::{Config, DEFAULT_OUTPUT_DIR};
pub use pipeline::{Cleaner, RunObserver, RunSummary};
pub use prune::Pruner;
pub use snapshot::{copy_tree, find_repositories, snapshot_all, snapshot_one, Snapshot};
pub use types::{
    ClassifyReport, CleanReport, CompactReport, Failure, MovedFile, PruneReport,
};
