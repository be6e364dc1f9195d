use std::fs;
use std::path::{Path, PathBuf};

use repo_tidy_core::{collect_files, file_name_str, is_within_any, list_children, FileVerdict, Policy};

use crate::config::Config;
use crate::types::{Failure, PruneReport};

/// Deletes junk directories and files from a working copy in place.
pub struct Pruner<'a> {
    policy: &'a Policy,
    skip_classified: bool,
}

impl<'a> Pruner<'a> {
    pub fn new(policy: &'a Policy) -> Self {
        Self {
            policy,
            skip_classified: false,
        }
    }

    /// Never enter `code/` or `text/`: the tree was cleaned before and the
    /// files there already passed the junk predicate.
    pub fn skip_classified(mut self) -> Self {
        self.skip_classified = true;
        self
    }

    fn protected(&self, root: &Path) -> Vec<PathBuf> {
        match self.skip_classified {
            true => Config::destination_roots(root),
            false => Vec::new(),
        }
    }

    /// Directory phase, then file phase.
    pub fn prune(&self, root: &Path) -> PruneReport {
        let dirs = self.prune_dirs(root);
        let files = self.prune_files(root);
        dirs.merge(files)
    }

    /// Top-down: each level is listed once, junk children are deleted
    /// wholesale and only the survivors are descended into.
    pub fn prune_dirs(&self, root: &Path) -> PruneReport {
        let protected = self.protected(root);
        let mut report = PruneReport::default();
        let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let children = match list_children(&dir) {
                Ok(children) => children,
                Err(e) => {
                    tracing::warn!(path = %dir.display(), error = %e, "cannot list directory");
                    report.failures.push(Failure::new(&dir, e));
                    continue;
                }
            };

            let (junk, keep): (Vec<PathBuf>, Vec<PathBuf>) = children
                .dirs
                .into_iter()
                .filter(|d| !is_within_any(d, &protected))
                .partition(|d| self.policy.is_junk_dir(file_name_str(d)));

            for junk_dir in junk {
                match fs::remove_dir_all(&junk_dir) {
                    Ok(()) => {
                        tracing::debug!(path = %junk_dir.display(), "removed junk directory");
                        report.dirs_removed.push(junk_dir);
                    }
                    Err(e) => {
                        tracing::warn!(path = %junk_dir.display(), error = %e, "failed to remove junk directory");
                        report.failures.push(Failure::new(&junk_dir, e));
                    }
                }
            }

            // Reverse so the stack pops in name order.
            pending.extend(keep.into_iter().rev());
        }

        report
    }

    /// Evaluate the junk predicate against every remaining file.
    pub fn prune_files(&self, root: &Path) -> PruneReport {
        let protected = self.protected(root);
        let mut report = PruneReport::default();

        for path in collect_files(root, &protected) {
            let FileVerdict::Delete(rule) = self.policy.judge_file(&path) else {
                continue;
            };

            match fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), %rule, "removed junk file");
                    report.files_removed.push((path, rule));
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove junk file");
                    report.failures.push(Failure::new(&path, e));
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repo_tidy_core::testutils::{create_test_repo, write_file};
    use tempfile::TempDir;
    use walkdir::WalkDir;

    fn tree(root: &Path) -> Vec<PathBuf> {
        WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
            .collect()
    }

    #[test]
    fn removes_junk_dirs_and_files() {
        let dir = create_test_repo();
        let repo = dir.path().join("repo");
        let policy = Policy::default();

        let report = Pruner::new(&policy).prune(&repo);

        assert!(!repo.join(".git").exists());
        assert!(!repo.join("image.png").exists());
        assert!(!repo.join("package-lock.json").exists());
        assert!(repo.join("README.md").exists());
        assert!(repo.join("src/main.py").exists());
        assert!(repo.join("docs/guide.md").exists());
        assert_eq!(report.dirs_removed, vec![repo.join(".git")]);
        assert_eq!(report.files_removed.len(), 2);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn junk_extensions_removed_at_any_depth() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a/b/c/logo.JPG", "x");
        write_file(dir.path(), "a/b/c/keep.py", "x");
        write_file(dir.path(), "assets/archive.zip", "x");
        let policy = Policy::default();

        Pruner::new(&policy).prune(dir.path());

        assert!(!dir.path().join("a/b/c/logo.JPG").exists());
        assert!(!dir.path().join("assets/archive.zip").exists());
        assert!(dir.path().join("a/b/c/keep.py").exists());
    }

    #[test]
    fn nested_junk_dirs_take_innocent_files_with_them() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "web/node_modules/pkg/index.js", "x");
        write_file(dir.path(), "web/node_modules/pkg/README.md", "x");
        write_file(dir.path(), "web/app.js", "x");
        let policy = Policy::default();

        let report = Pruner::new(&policy).prune(dir.path());

        assert!(!dir.path().join("web/node_modules").exists());
        assert!(dir.path().join("web/app.js").exists());
        assert_eq!(report.dirs_removed, vec![dir.path().join("web/node_modules")]);
        assert!(report.files_removed.is_empty());
    }

    #[test]
    fn keep_list_survives_conflicting_rules() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "package.json", "{}");
        write_file(dir.path(), "other.json", "{}");
        let mut policy = Policy::default();
        policy.junk_extensions.insert("json".into());

        Pruner::new(&policy).prune(dir.path());

        assert!(dir.path().join("package.json").exists());
        assert!(!dir.path().join("other.json").exists());
    }

    #[test]
    fn oversized_notebook_removed_small_kept() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "big.ipynb", "0123456789");
        write_file(dir.path(), "small.ipynb", "{}");
        let mut policy = Policy::default();
        policy.notebook_max_bytes = 4;

        Pruner::new(&policy).prune(dir.path());

        assert!(!dir.path().join("big.ipynb").exists());
        assert!(dir.path().join("small.ipynb").exists());
    }

    #[test]
    fn second_prune_is_a_no_op() {
        let dir = create_test_repo();
        let repo = dir.path().join("repo");
        let policy = Policy::default();
        let pruner = Pruner::new(&policy);

        pruner.prune(&repo);
        let after_first = tree(&repo);
        let second = pruner.prune(&repo);

        assert_eq!(tree(&repo), after_first);
        assert_eq!(second.removed_count(), 0);
    }

    #[test]
    fn destination_subtrees_are_not_entered() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "text/notes/diagram.png", "x");
        write_file(dir.path(), "code/build/out.js", "x");
        write_file(dir.path(), "src/build/out.js", "x");
        let policy = Policy::default();

        Pruner::new(&policy).skip_classified().prune(dir.path());

        assert!(dir.path().join("text/notes/diagram.png").exists());
        assert!(dir.path().join("code/build/out.js").exists());
        assert!(!dir.path().join("src/build").exists());
    }

    #[test]
    fn fresh_tree_code_and_text_dirs_are_pruned_like_any_other() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "text/logo.png", "x");
        write_file(dir.path(), "text/node_modules/pkg/index.js", "x");
        write_file(dir.path(), "code/package-lock.json", "{}");
        write_file(dir.path(), "code/NOTES.md", "n");
        let policy = Policy::default();

        let report = Pruner::new(&policy).prune(dir.path());

        assert!(!dir.path().join("text/logo.png").exists());
        assert!(!dir.path().join("text/node_modules").exists());
        assert!(!dir.path().join("code/package-lock.json").exists());
        assert!(dir.path().join("code/NOTES.md").exists());
        assert_eq!(report.removed_count(), 3);
    }
}
