//! Filesystem path helpers.

use crate::{UtilsError, UtilsErrorExt};
use std::path::{Path, PathBuf};

/// Whether `path` exists.
#[must_use]
pub fn exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}

/// Directory containing the running binary, with symlinks resolved.
pub fn executable_dir() -> Result<PathBuf, UtilsError> {
    let exe = std::env::current_exe().context("locating executable")?;
    let resolved = exe.canonicalize().context("resolving executable path")?;
    resolved
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| UtilsError::from("executable has no parent directory"))
}
