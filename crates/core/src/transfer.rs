use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::fingerprint::Fingerprint;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("{0} already exists with different content")]
    Conflict(PathBuf),
    #[error("copy of {src} failed verification (expected {expected} bytes, found {actual})")]
    Unverified {
        src: PathBuf,
        expected: u64,
        actual: u64,
    },
    #[error("{path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

impl TransferError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Same-filesystem rename.
    Renamed,
    /// Copied, verified, then the source was removed.
    Copied,
    /// An identical file was already at the destination; the source was
    /// dropped.
    Duplicate,
}

/// Move `src` to `dst`, creating parent directories as needed.
///
/// The file ends up either at `dst` or untouched at `src`: never at both,
/// never at neither. An existing `dst` is never overwritten.
pub fn move_file(src: &Path, dst: &Path) -> Result<MoveOutcome, TransferError> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| TransferError::io(parent, e))?;
    }

    if dst.symlink_metadata().is_ok() {
        return drop_if_duplicate(src, dst);
    }

    // rename fails across filesystems; fall back to copy and verify
    if fs::rename(src, dst).is_ok() {
        return Ok(MoveOutcome::Renamed);
    }

    copy_verified(src, dst)?;
    remove_source_or_undo(src, dst)?;
    Ok(MoveOutcome::Copied)
}

fn drop_if_duplicate(src: &Path, dst: &Path) -> Result<MoveOutcome, TransferError> {
    let source = Fingerprint::of_file(src).map_err(|e| TransferError::io(src, e))?;
    let existing = Fingerprint::of_file(dst).map_err(|e| TransferError::io(dst, e))?;

    if source != existing {
        return Err(TransferError::Conflict(dst.to_path_buf()));
    }

    fs::remove_file(src).map_err(|e| TransferError::io(src, e))?;
    Ok(MoveOutcome::Duplicate)
}

/// Copy to a hidden sibling of `dst`, check size and digest, then rename
/// into place. The partial file is removed on any failure.
fn copy_verified(src: &Path, dst: &Path) -> Result<(), TransferError> {
    let partial = partial_path(dst);

    let result = fs::copy(src, &partial)
        .map_err(|e| TransferError::io(&partial, e))
        .and_then(|_| verify(src, &partial))
        .and_then(|_| fs::rename(&partial, dst).map_err(|e| TransferError::io(dst, e)));

    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}

fn verify(src: &Path, copy: &Path) -> Result<(), TransferError> {
    let expected = Fingerprint::of_file(src).map_err(|e| TransferError::io(src, e))?;
    let actual = Fingerprint::of_file(copy).map_err(|e| TransferError::io(copy, e))?;

    match expected == actual {
        true => Ok(()),
        false => Err(TransferError::Unverified {
            src: src.to_path_buf(),
            expected: expected.size,
            actual: actual.size,
        }),
    }
}

fn remove_source_or_undo(src: &Path, dst: &Path) -> Result<(), TransferError> {
    fs::remove_file(src).map_err(|e| {
        let _ = fs::remove_file(dst);
        TransferError::io(src, e)
    })
}

fn partial_path(dst: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(dst.file_name().unwrap_or_default());
    name.push(".partial");
    dst.with_file_name(name)
}
