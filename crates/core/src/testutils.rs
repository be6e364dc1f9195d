use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Create a repository holding one of each kind of file the cleaner cares
/// about, under `<tmp>/repo`.
pub fn create_test_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let repo = dir.path().join("repo");

    write_file(&repo, "README.md", "# Demo\n");
    write_file(&repo, "src/main.py", "print('hello')\n");
    write_file(&repo, "docs/guide.md", "# Guide\n");
    write_file(&repo, "image.png", "\u{89}PNG");
    write_file(&repo, "package-lock.json", "{}");
    write_file(&repo, ".git/HEAD", "ref: refs/heads/main\n");
    write_file(&repo, ".git/objects/ab/cdef", "blob");

    dir
}

pub fn write_file(root: impl AsRef<Path>, relative: &str, content: &str) {
    let path = root.as_ref().join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}
