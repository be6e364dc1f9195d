use std::cmp::Ordering;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Snapshot of a directory's immediate children, taken before any of them
/// is touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Children {
    pub dirs: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

impl Children {
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty() && self.files.is_empty()
    }
}

/// Compare two DirEntry items: directories first, then alphabetically.
pub fn compare_dir_entries(a: &std::fs::DirEntry, b: &std::fs::DirEntry) -> Ordering {
    let a_is_dir = a.file_type().map(|t| t.is_dir()).unwrap_or(false);
    let b_is_dir = b.file_type().map(|t| t.is_dir()).unwrap_or(false);
    match (a_is_dir, b_is_dir) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.file_name().cmp(&b.file_name()),
    }
}

/// List a directory's children into an owned, sorted snapshot. Symlinks are
/// reported as files so they are never followed.
pub fn list_children(dir: &Path) -> io::Result<Children> {
    let mut entries: Vec<std::fs::DirEntry> =
        std::fs::read_dir(dir)?.collect::<io::Result<_>>()?;
    entries.sort_by(compare_dir_entries);

    Ok(entries
        .into_iter()
        .fold(Children::default(), |mut acc, entry| {
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            match is_dir {
                true => acc.dirs.push(entry.path()),
                false => acc.files.push(entry.path()),
            }
            acc
        }))
}

/// Basename of a path as UTF-8, or "" when it has none.
pub fn file_name_str(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

/// Returns true if `path` is one of `roots` or lies beneath one.
pub fn is_within_any(path: &Path, roots: &[PathBuf]) -> bool {
    roots.iter().any(|root| path.starts_with(root))
}

/// Collect every non-directory entry under `root`, never descending into
/// `skip`. The full list is built before the caller acts on any entry.
pub fn collect_files(root: &Path, skip: &[PathBuf]) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_within_any(e.path(), skip))
        .filter_map(|e| e.ok())
        .filter(is_file_like)
        .map(DirEntry::into_path)
        .collect()
}

fn is_file_like(entry: &DirEntry) -> bool {
    !entry.file_type().is_dir()
}

pub fn format_size(bytes: u64) -> String {
    const UNITS: &[(u64, &str)] = &[
        (1024 * 1024 * 1024, "GB"),
        (1024 * 1024, "MB"),
        (1024, "KB"),
    ];

    UNITS
        .iter()
        .find(|(threshold, _)| bytes >= *threshold)
        .map(|(threshold, unit)| format!("{:.2} {}", bytes as f64 / *threshold as f64, unit))
        .unwrap_or_else(|| format!("{} B", bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn list_children_splits_and_sorts() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir(dir.path().join("zeta")).unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();

        let children = list_children(dir.path()).unwrap();

        assert_eq!(
            children.dirs,
            vec![dir.path().join("alpha"), dir.path().join("zeta")]
        );
        assert_eq!(
            children.files,
            vec![dir.path().join("a.txt"), dir.path().join("b.txt")]
        );
    }

    #[test]
    fn empty_directory_has_no_children() {
        let dir = TempDir::new().unwrap();
        assert!(list_children(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn collect_files_skips_subtrees() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("code/src")).unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("code/src/a.py"), "").unwrap();
        fs::write(dir.path().join("src/b.py"), "").unwrap();
        fs::write(dir.path().join("README.md"), "").unwrap();

        let files = collect_files(dir.path(), &[dir.path().join("code")]);

        assert_eq!(
            files,
            vec![dir.path().join("README.md"), dir.path().join("src/b.py")]
        );
    }

    #[test]
    fn within_any_matches_components_not_prefixes() {
        let roots = vec![PathBuf::from("/repo/code")];
        assert!(is_within_any(Path::new("/repo/code"), &roots));
        assert!(is_within_any(Path::new("/repo/code/a.py"), &roots));
        assert!(!is_within_any(Path::new("/repo/codebase/a.py"), &roots));
    }

    #[test]
    fn hidden_names() {
        assert!(is_hidden_name(".cache"));
        assert!(!is_hidden_name("src"));
    }

    #[test]
    fn format_size_display() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1024 * 1024), "1.00 MB");
        assert_eq!(format_size(1024 * 1024 * 1024), "1.00 GB");
    }
}
