pub mod destination;
pub mod fingerprint;
pub mod junk;
pub mod policy;
#[cfg(any(test, feature = "testutils"))]
pub mod testutils;
pub mod transfer;
pub mod utils;

pub use destination::{top_level_dir, Destination, Route, RouteRule, CODE_DIR, TEXT_DIR};
pub use fingerprint::{hash_content, hash_file, Fingerprint};
pub use junk::{extension_of, is_readme, FileVerdict, JunkRule, KeepReason};
pub use policy::{Policy, PolicyError, DEFAULT_NOTEBOOK_MAX_BYTES};
pub use transfer::{move_file, MoveOutcome, TransferError};
pub use utils::{
    collect_files, compare_dir_entries, file_name_str, format_size, is_hidden_name,
    is_within_any, list_children, Children,
};
