use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

/// Notebooks above this size are treated as junk (5 MiB).
pub const DEFAULT_NOTEBOOK_MAX_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read policy file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to write policy file {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to serialize policy: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid policy file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Immutable cleaning policy shared by the pruner and the classifier.
///
/// Extensions are stored lower-case without the leading dot. Suffixes keep
/// their leading punctuation and are matched against the lower-cased file
/// name, longest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub junk_dirs: BTreeSet<String>,
    pub junk_extensions: BTreeSet<String>,
    pub junk_suffixes: Vec<String>,
    pub keep_filenames: BTreeSet<String>,
    pub delete_filenames: BTreeSet<String>,
    pub code_extensions: BTreeSet<String>,
    pub text_extensions: BTreeSet<String>,
    pub doc_dirs: BTreeSet<String>,
    pub source_dirs: BTreeSet<String>,
    pub notebook_extension: String,
    pub notebook_max_bytes: u64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            junk_dirs: string_set(&[
                ".git",
                "node_modules",
                "venv",
                "dist",
                "build",
                "coverage",
                ".idea",
                ".vscode",
            ]),
            junk_extensions: string_set(&["png", "jpg", "jpeg", "gif", "pdf", "zip"]),
            junk_suffixes: ordered_suffixes(&["-lock.json", "-lock.yaml", ".min.js", ".lock"]),
            keep_filenames: string_set(&["requirements.txt", "package.json", "pyproject.toml"]),
            delete_filenames: string_set(&[".gitignore"]),
            code_extensions: string_set(&[
                "py", "js", "jsx", "ts", "tsx", "php", "vue", "html", "css", "scss", "sass",
                "less", "sql", "c", "cpp", "h", "hpp", "java", "rb", "go", "rs", "swift", "kt",
                "cs", "sh", "bat", "xml", "yaml", "yml", "ini", "cfg", "toml",
            ]),
            text_extensions: string_set(&["md", "txt", "rst"]),
            doc_dirs: string_set(&["docs"]),
            source_dirs: string_set(&["src", "app", "lib"]),
            notebook_extension: "ipynb".to_string(),
            notebook_max_bytes: DEFAULT_NOTEBOOK_MAX_BYTES,
        }
    }
}

impl Policy {
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path).map_err(|source| PolicyError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let policy: Self =
            serde_json::from_str(&content).map_err(|source| PolicyError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        Ok(policy.normalized())
    }

    pub fn save(&self, path: &Path) -> Result<(), PolicyError> {
        let content = self.to_json()?;
        std::fs::write(path, content).map_err(|source| PolicyError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn to_json(&self) -> Result<String, PolicyError> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Lower-cases extensions, strips leading dots and re-sorts suffixes so a
    /// hand-edited policy file behaves like the built-in one.
    pub fn normalized(self) -> Self {
        let ext_set = |set: BTreeSet<String>| -> BTreeSet<String> {
            set.into_iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect()
        };

        let suffixes: Vec<String> = self
            .junk_suffixes
            .iter()
            .map(|s| s.to_lowercase())
            .collect();
        let suffix_refs: Vec<&str> = suffixes.iter().map(String::as_str).collect();

        Self {
            junk_extensions: ext_set(self.junk_extensions),
            code_extensions: ext_set(self.code_extensions),
            text_extensions: ext_set(self.text_extensions),
            junk_suffixes: ordered_suffixes(&suffix_refs),
            notebook_extension: self
                .notebook_extension
                .trim_start_matches('.')
                .to_lowercase(),
            ..self
        }
    }

    pub fn is_junk_dir(&self, name: &str) -> bool {
        self.junk_dirs.contains(name)
    }
}

fn string_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Longest suffix first so the most specific rule reports the match.
fn ordered_suffixes(items: &[&str]) -> Vec<String> {
    let mut suffixes: Vec<String> = items.iter().map(|s| s.to_string()).collect();
    suffixes.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    suffixes.dedup();
    suffixes
}
