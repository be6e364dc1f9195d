use std::fmt;
use std::path::Path;

use crate::policy::Policy;
use crate::utils::format_size;

/// Outcome of the junk-file predicate, with the rule that decided it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileVerdict {
    Keep(KeepReason),
    Delete(JunkRule),
}

impl FileVerdict {
    pub fn is_junk(&self) -> bool {
        matches!(self, Self::Delete(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeepReason {
    KeepList,
    Readme,
    NoRuleMatched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JunkRule {
    Filename(String),
    Extension(String),
    Suffix(String),
    OversizedNotebook { size: u64, limit: u64 },
}

impl fmt::Display for JunkRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filename(name) => write!(f, "filename {}", name),
            Self::Extension(ext) => write!(f, "extension .{}", ext),
            Self::Suffix(suffix) => write!(f, "suffix {}", suffix),
            Self::OversizedNotebook { size, limit } => {
                write!(f, "notebook of {} exceeds {}", format_size(*size), format_size(*limit))
            }
        }
    }
}

/// README variants: case-insensitive `readme*.md`.
pub fn is_readme(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.starts_with("readme") && lower.ends_with(".md")
}

/// Lower-cased extension without the dot. Dotfiles such as `.gitignore`
/// have no extension.
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

impl Policy {
    /// Judge a file on disk. The size is only read for notebook files.
    pub fn judge_file(&self, path: &Path) -> FileVerdict {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        self.judge(name, || std::fs::metadata(path).map(|m| m.len()).ok())
    }

    /// Evaluate the predicate in fixed precedence: keep-exceptions first,
    /// then delete rules. `size` is consulted lazily.
    pub fn judge(&self, name: &str, size: impl FnOnce() -> Option<u64>) -> FileVerdict {
        if self.keep_filenames.contains(name) {
            return FileVerdict::Keep(KeepReason::KeepList);
        }
        if is_readme(name) {
            return FileVerdict::Keep(KeepReason::Readme);
        }

        if self.delete_filenames.contains(name) {
            return FileVerdict::Delete(JunkRule::Filename(name.to_string()));
        }

        let ext = extension_of(name);
        if let Some(ext) = ext.as_ref().filter(|e| self.junk_extensions.contains(*e)) {
            return FileVerdict::Delete(JunkRule::Extension(ext.clone()));
        }

        let lower = name.to_lowercase();
        if let Some(suffix) = self.junk_suffixes.iter().find(|s| lower.ends_with(s.as_str())) {
            return FileVerdict::Delete(JunkRule::Suffix(suffix.clone()));
        }

        if ext.as_deref() == Some(self.notebook_extension.as_str()) {
            if let Some(size) = size().filter(|&s| s > self.notebook_max_bytes) {
                return FileVerdict::Delete(JunkRule::OversizedNotebook {
                    size,
                    limit: self.notebook_max_bytes,
                });
            }
        }

        FileVerdict::Keep(KeepReason::NoRuleMatched)
    }

    pub fn is_junk_file(&self, path: &Path) -> bool {
        self.judge_file(path).is_junk()
    }
}
