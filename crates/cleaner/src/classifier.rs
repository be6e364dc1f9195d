use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

use repo_tidy_core::{collect_files, move_file, FileVerdict, JunkRule, MoveOutcome, Policy, Route};

use crate::config::Config;
use crate::types::{ClassifyReport, Failure, MovedFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Junk that survived pruning (or appeared since).
    Delete { path: PathBuf, rule: JunkRule },
    Move { from: PathBuf, to: PathBuf, route: Route },
}

/// What classification will do to a repository, decided before any file is
/// touched.
#[derive(Debug, Clone)]
pub struct ClassifyPlan {
    pub root: PathBuf,
    pub actions: Vec<Action>,
}

impl ClassifyPlan {
    pub fn moves(&self) -> impl Iterator<Item = (&PathBuf, &PathBuf, &Route)> {
        self.actions.iter().filter_map(|a| match a {
            Action::Move { from, to, route } => Some((from, to, route)),
            Action::Delete { .. } => None,
        })
    }
}

/// Routes every file of a pruned repository into `code/` or `text/`.
pub struct Classifier<'a> {
    policy: &'a Policy,
    skip_classified: bool,
}

impl<'a> Classifier<'a> {
    pub fn new(policy: &'a Policy) -> Self {
        Self {
            policy,
            skip_classified: false,
        }
    }

    /// Leave files already under `code/` or `text/` where they are.
    pub fn skip_classified(mut self) -> Self {
        self.skip_classified = true;
        self
    }

    pub fn classify(&self, root: &Path) -> anyhow::Result<ClassifyReport> {
        Config::destination_roots(root)
            .iter()
            .try_for_each(|dest| {
                fs::create_dir_all(dest)
                    .with_context(|| format!("failed to create {}", dest.display()))
            })?;

        let plan = self.plan(root)?;
        Ok(self.execute(&plan))
    }

    /// Decide per file without side effects. The file list is complete
    /// before any destination path is computed.
    pub fn plan(&self, root: &Path) -> anyhow::Result<ClassifyPlan> {
        let protected = match self.skip_classified {
            true => Config::destination_roots(root),
            false => Vec::new(),
        };

        let actions = collect_files(root, &protected)
            .into_iter()
            .map(|path| self.plan_file(root, path))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(ClassifyPlan {
            root: root.to_path_buf(),
            actions,
        })
    }

    fn plan_file(&self, root: &Path, path: PathBuf) -> anyhow::Result<Action> {
        if let FileVerdict::Delete(rule) = self.policy.judge_file(&path) {
            return Ok(Action::Delete { path, rule });
        }

        let relative = path
            .strip_prefix(root)
            .with_context(|| format!("{} is outside {}", path.display(), root.display()))?;
        let route = self.policy.route(relative);
        let to = route.destination.root_in(root).join(relative);

        Ok(Action::Move {
            from: path,
            to,
            route,
        })
    }

    /// Apply a plan in order. Per-file failures are recorded and skipped.
    pub fn execute(&self, plan: &ClassifyPlan) -> ClassifyReport {
        plan.actions
            .iter()
            .fold(ClassifyReport::default(), |mut report, action| {
                match action {
                    Action::Delete { path, rule } => match fs::remove_file(path) {
                        Ok(()) => {
                            tracing::debug!(path = %path.display(), %rule, "removed late junk");
                            report.deleted.push((path.clone(), rule.clone()));
                        }
                        Err(e) => {
                            tracing::warn!(path = %path.display(), error = %e, "failed to remove junk file");
                            report.failures.push(Failure::new(path, e));
                        }
                    },
                    Action::Move { from, to, route } => match move_file(from, to) {
                        Ok(MoveOutcome::Duplicate) => {
                            tracing::debug!(path = %from.display(), "identical file already classified");
                            report.duplicates.push(from.clone());
                        }
                        Ok(outcome) => {
                            tracing::debug!(
                                from = %from.display(),
                                to = %to.display(),
                                rule = %route.rule,
                                ?outcome,
                                "classified"
                            );
                            report.moved.push(MovedFile {
                                from: from.clone(),
                                to: to.clone(),
                                destination: route.destination,
                            });
                        }
                        Err(e) => {
                            tracing::warn!(path = %from.display(), error = %e, "failed to classify");
                            report.failures.push(Failure::new(from, e));
                        }
                    },
                }
                report
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repo_tidy_core::testutils::write_file;
    use repo_tidy_core::{Destination, RouteRule};
    use tempfile::TempDir;

    fn sample_repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "README.md", "# r");
        write_file(dir.path(), "src/main.py", "print(1)");
        write_file(dir.path(), "src/Makefile", "all:");
        write_file(dir.path(), "docs/guide.md", "# g");
        write_file(dir.path(), "notes.txt", "n");
        write_file(dir.path(), "LICENSE", "MIT");
        dir
    }

    #[test]
    fn plan_has_no_side_effects() {
        let dir = sample_repo();
        let policy = Policy::default();

        let plan = Classifier::new(&policy).plan(dir.path()).unwrap();

        assert_eq!(plan.actions.len(), 6);
        assert!(dir.path().join("src/main.py").exists());
        assert!(!dir.path().join("code").exists());
    }

    #[test]
    fn plan_routes_by_precedence() {
        let dir = sample_repo();
        let policy = Policy::default();
        let plan = Classifier::new(&policy).plan(dir.path()).unwrap();

        let route_of = |rel: &str| {
            plan.moves()
                .find(|(from, _, _)| from.ends_with(rel))
                .map(|(_, to, route)| (to.strip_prefix(dir.path()).unwrap().to_path_buf(), *route))
                .unwrap()
        };

        let (to, route) = route_of("src/Makefile");
        assert_eq!(to, PathBuf::from("code/src/Makefile"));
        assert_eq!(route.rule, RouteRule::SourceDir);

        let (to, route) = route_of("LICENSE");
        assert_eq!(to, PathBuf::from("text/LICENSE"));
        assert_eq!(route.rule, RouteRule::Fallback);
    }

    #[test]
    fn classify_moves_every_file_exactly_once() {
        let dir = sample_repo();
        let policy = Policy::default();

        let report = Classifier::new(&policy).classify(dir.path()).unwrap();

        assert!(report.failures.is_empty());
        for (rel, bucket) in [
            ("README.md", "text"),
            ("src/main.py", "code"),
            ("src/Makefile", "code"),
            ("docs/guide.md", "text"),
            ("notes.txt", "text"),
            ("LICENSE", "text"),
        ] {
            let other = if bucket == "code" { "text" } else { "code" };
            assert!(dir.path().join(bucket).join(rel).exists(), "{rel} missing");
            assert!(!dir.path().join(other).join(rel).exists(), "{rel} duplicated");
            assert!(!dir.path().join(rel).exists(), "{rel} left behind");
        }
        assert_eq!(report.moved_to(Destination::Code), 2);
        assert_eq!(report.moved_to(Destination::Text), 4);
    }

    #[test]
    fn late_junk_is_deleted_not_moved() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "src/app.js", "x");
        write_file(dir.path(), "src/app.min.js", "x");
        let policy = Policy::default();

        let report = Classifier::new(&policy).classify(dir.path()).unwrap();

        assert_eq!(report.deleted.len(), 1);
        assert!(!dir.path().join("src/app.min.js").exists());
        assert!(!dir.path().join("code/src/app.min.js").exists());
        assert!(dir.path().join("code/src/app.js").exists());
    }

    #[test]
    fn already_classified_files_are_not_touched() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "code/src/main.py", "print(1)");
        write_file(dir.path(), "text/README.md", "# r");
        let policy = Policy::default();

        let report = Classifier::new(&policy)
            .skip_classified()
            .classify(dir.path()).unwrap();

        assert!(report.moved.is_empty());
        assert!(dir.path().join("code/src/main.py").exists());
        assert!(!dir.path().join("code/code").exists());
        assert!(!dir.path().join("text/text").exists());
    }

    #[test]
    fn stray_file_with_conflicting_copy_stays_put() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "code/src/main.py", "old");
        write_file(dir.path(), "src/main.py", "new");
        write_file(dir.path(), "src/util.py", "u");
        let policy = Policy::default();

        let report = Classifier::new(&policy)
            .skip_classified()
            .classify(dir.path()).unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, dir.path().join("src/main.py"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("code/src/main.py")).unwrap(),
            "old"
        );
        assert!(dir.path().join("src/main.py").exists());
        assert!(dir.path().join("code/src/util.py").exists());
    }

    #[test]
    fn stray_duplicate_is_dropped() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "text/notes.txt", "same");
        write_file(dir.path(), "notes.txt", "same");
        let policy = Policy::default();

        let report = Classifier::new(&policy)
            .skip_classified()
            .classify(dir.path()).unwrap();

        assert_eq!(report.duplicates, vec![dir.path().join("notes.txt")]);
        assert!(!dir.path().join("notes.txt").exists());
        assert!(dir.path().join("text/notes.txt").exists());
    }

    #[test]
    fn fresh_code_and_text_dirs_are_routed_like_any_other() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "code/NOTES.md", "n");
        write_file(dir.path(), "code/main.py", "print(1)");
        write_file(dir.path(), "text/setup.cfg", "[x]");
        let policy = Policy::default();

        let report = Classifier::new(&policy).classify(dir.path()).unwrap();

        assert!(report.failures.is_empty());
        assert!(dir.path().join("text/code/NOTES.md").exists());
        assert!(dir.path().join("code/code/main.py").exists());
        assert!(!dir.path().join("code/NOTES.md").exists());
        assert!(!dir.path().join("code/main.py").exists());
        assert_eq!(report.moved.len(), 3);
    }
}
