use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::types::CompactReport;

/// Remove directories left empty after classification. The repository root
/// and the two destination roots are kept even when empty.
///
/// Best effort: a directory that cannot be removed is skipped.
pub fn compact(root: &Path) -> CompactReport {
    let keep = Config::destination_roots(root);

    // Children come before their parents, so emptying a child can make the
    // parent eligible later in the same pass.
    let dirs: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_dir())
        .map(walkdir::DirEntry::into_path)
        .filter(|p| !keep.contains(p))
        .collect();

    let removed = dirs
        .into_iter()
        .filter(|dir| is_empty_dir(dir))
        .filter(|dir| match fs::remove_dir(dir) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(path = %dir.display(), error = %e, "left directory in place");
                false
            }
        })
        .collect();

    CompactReport { removed }
}

fn is_empty_dir(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}
