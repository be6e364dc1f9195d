use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use repo_tidy_core::{file_name_str, is_hidden_name};

/// One repository copied into the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub name: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    /// A stale copy existed and was removed first.
    pub replaced: bool,
}

/// Immediate subdirectories of `parent` that look like repositories: not
/// hidden and not the output root itself. Sorted by name.
pub fn find_repositories(parent: &Path, output_root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let output_name = file_name_str(output_root);

    let mut repos: Vec<PathBuf> = fs::read_dir(parent)
        .with_context(|| format!("failed to read {}", parent.display()))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        // is_dir follows symlinks, like the copy
        .filter(|path| path.is_dir())
        .filter(|path| {
            let name = file_name_str(path);
            !name.is_empty() && !is_hidden_name(name) && name != output_name
        })
        .collect();

    repos.sort();
    Ok(repos)
}

/// Copy every repository under `parent` into `output_root`, replacing stale
/// copies. Returns an empty list when there is nothing to copy.
pub fn snapshot_all(
    parent: &Path,
    output_root: &Path,
    mut on_copied: impl FnMut(&Snapshot),
) -> anyhow::Result<Vec<Snapshot>> {
    fs::create_dir_all(output_root)
        .with_context(|| format!("failed to create {}", output_root.display()))?;

    find_repositories(parent, output_root)?
        .into_iter()
        .map(|source| {
            let snapshot = snapshot_one(&source, output_root)?;
            on_copied(&snapshot);
            Ok(snapshot)
        })
        .collect()
}

pub fn snapshot_one(source: &Path, output_root: &Path) -> anyhow::Result<Snapshot> {
    let name = file_name_str(source).to_string();
    let destination = output_root.join(&name);

    let replaced = destination.exists();
    if replaced {
        fs::remove_dir_all(&destination)
            .with_context(|| format!("failed to remove stale copy {}", destination.display()))?;
        tracing::debug!(path = %destination.display(), "removed stale copy");
    }

    copy_tree(source, &destination)
        .with_context(|| format!("failed to copy {} -> {}", source.display(), destination.display()))?;

    Ok(Snapshot {
        name,
        source: source.to_path_buf(),
        destination,
        replaced,
    })
}

/// Recursive copy. Symlinks are followed so the copy holds plain files.
pub fn copy_tree(source: &Path, destination: &Path) -> anyhow::Result<u64> {
    let mut copied = 0u64;

    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(source)?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)
                .with_context(|| format!("failed to copy {}", entry.path().display()))?;
            copied += 1;
        }
    }

    Ok(copied)
}
