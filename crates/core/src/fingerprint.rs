use blake3::Hasher;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// Size plus BLAKE3 digest, used to confirm a copied file before its source
/// is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub size: u64,
    pub hash: String,
}

impl Fingerprint {
    pub fn of_file(path: &Path) -> io::Result<Self> {
        let size = std::fs::metadata(path)?.len();
        let hash = hash_file(path)?;
        Ok(Self { size, hash })
    }
}

pub fn hash_content(content: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(content);
    hasher.finalize().to_hex().to_string()
}

/// Streams the file through the hasher instead of reading it whole.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Hasher::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_hash_matches_content_hash() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.py");
        std::fs::write(&path, b"print('hi')\n").unwrap();

        assert_eq!(hash_file(&path).unwrap(), hash_content(b"print('hi')\n"));
    }

    #[test]
    fn fingerprint_detects_different_content_same_size() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, b"aaaa").unwrap();
        std::fs::write(&b, b"bbbb").unwrap();

        let fa = Fingerprint::of_file(&a).unwrap();
        let fb = Fingerprint::of_file(&b).unwrap();

        assert_eq!(fa.size, fb.size);
        assert_ne!(fa, fb);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(Fingerprint::of_file(&dir.path().join("gone")).is_err());
    }

    #[test]
    fn hash_is_64_chars() {
        assert_eq!(hash_content(b"test").len(), 64);
    }
}
