pub mod archive;

pub use archive::{plan_compress, plan_extract, ArchiveError, Archiver, Job, Mode, DEFAULT_TOOL};
