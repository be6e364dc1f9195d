use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path};

use crate::junk::{extension_of, is_readme};
use crate::policy::Policy;

pub const CODE_DIR: &str = "code";
pub const TEXT_DIR: &str = "text";

/// One of the two buckets every surviving file ends up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Code,
    Text,
}

impl Destination {
    pub const ALL: [Destination; 2] = [Destination::Code, Destination::Text];

    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Code => CODE_DIR,
            Self::Text => TEXT_DIR,
        }
    }

    pub fn root_in(&self, repo_root: &Path) -> std::path::PathBuf {
        repo_root.join(self.dir_name())
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Which rule routed the file, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRule {
    Readme,
    DocsMarkdown,
    TextExtension,
    CodeExtension,
    SourceDir,
    Fallback,
}

impl fmt::Display for RouteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Readme => "readme",
            Self::DocsMarkdown => "markdown in docs directory",
            Self::TextExtension => "text extension",
            Self::CodeExtension => "code extension",
            Self::SourceDir => "source directory",
            Self::Fallback => "no rule matched",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub destination: Destination,
    pub rule: RouteRule,
}

impl Route {
    fn new(destination: Destination, rule: RouteRule) -> Self {
        Self { destination, rule }
    }
}

/// First segment of a repository-relative path, only when the file sits
/// inside a directory. `README.md` has no top-level directory; `src/a.py`
/// has `src`.
pub fn top_level_dir(relative: &Path) -> Option<&str> {
    let mut components = relative.components().filter(|c| matches!(c, Component::Normal(_)));
    let first = components.next()?;
    components.next()?;
    first.as_os_str().to_str()
}

impl Policy {
    /// Route a file by its path relative to the repository root.
    pub fn route(&self, relative: &Path) -> Route {
        let name = relative
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let ext = extension_of(name);
        let is_markdown = ext.as_deref() == Some("md");
        let top = top_level_dir(relative);

        if is_markdown && is_readme(name) {
            return Route::new(Destination::Text, RouteRule::Readme);
        }
        if is_markdown && top.is_some_and(|t| self.doc_dirs.contains(t)) {
            return Route::new(Destination::Text, RouteRule::DocsMarkdown);
        }
        if ext.as_ref().is_some_and(|e| self.text_extensions.contains(e)) {
            return Route::new(Destination::Text, RouteRule::TextExtension);
        }
        if ext.as_ref().is_some_and(|e| self.code_extensions.contains(e)) {
            return Route::new(Destination::Code, RouteRule::CodeExtension);
        }
        if top.is_some_and(|t| self.source_dirs.contains(t)) {
            return Route::new(Destination::Code, RouteRule::SourceDir);
        }

        Route::new(Destination::Text, RouteRule::Fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(path: &str) -> Route {
        Policy::default().route(Path::new(path))
    }

    #[test]
    fn readme_goes_to_text() {
        assert_eq!(route("README.md"), Route::new(Destination::Text, RouteRule::Readme));
        assert_eq!(
            route("src/readme.md"),
            Route::new(Destination::Text, RouteRule::Readme)
        );
    }

    #[test]
    fn docs_markdown_goes_to_text() {
        assert_eq!(
            route("docs/guide.md"),
            Route::new(Destination::Text, RouteRule::DocsMarkdown)
        );
        assert_eq!(
            route("docs/api/index.md"),
            Route::new(Destination::Text, RouteRule::DocsMarkdown)
        );
    }

    #[test]
    fn text_extension_beats_source_dir() {
        assert_eq!(
            route("src/NOTES.txt"),
            Route::new(Destination::Text, RouteRule::TextExtension)
        );
    }

    #[test]
    fn code_extensions_and_source_dirs() {
        assert_eq!(
            route("src/main.py"),
            Route::new(Destination::Code, RouteRule::CodeExtension)
        );
        assert_eq!(
            route("setup.cfg"),
            Route::new(Destination::Code, RouteRule::CodeExtension)
        );
        assert_eq!(
            route("lib/Makefile"),
            Route::new(Destination::Code, RouteRule::SourceDir)
        );
    }

    #[test]
    fn unknown_files_fall_back_to_text() {
        assert_eq!(route("LICENSE"), Route::new(Destination::Text, RouteRule::Fallback));
        assert_eq!(
            route("notebooks/demo.ipynb"),
            Route::new(Destination::Text, RouteRule::Fallback)
        );
    }

    #[test]
    fn root_file_named_like_source_dir_is_not_a_source_dir() {
        assert_eq!(route("src"), Route::new(Destination::Text, RouteRule::Fallback));
    }

    #[test]
    fn top_level_dir_requires_nesting() {
        assert_eq!(top_level_dir(Path::new("README.md")), None);
        assert_eq!(top_level_dir(Path::new("src/a.py")), Some("src"));
        assert_eq!(top_level_dir(Path::new("docs/a/b.md")), Some("docs"));
    }

    #[test]
    fn destination_paths() {
        let root = Path::new("/work/repo");
        assert_eq!(Destination::Code.root_in(root), Path::new("/work/repo/code"));
        assert_eq!(Destination::Text.to_string(), "text");
    }
}
