pub mod clone;
pub mod error;
pub mod record;
pub mod search;

pub use clone::{clone_all, shallow_clone, CloneStatus, CloneSummary, DEFAULT_PAUSE};
pub use error::ScrapeError;
pub use record::{load_records, save_records, RepoRecord, DESCRIPTION_MAX_CHARS};
pub use search::{SearchClient, GITHUB_API, MAX_PER_PAGE};
