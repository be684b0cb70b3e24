//! The local binary cache: one directory per installed runner version plus
//! the state file, under a root that `SPECDECK_CACHE_FOLDER` can override.

use std::fmt;
use std::path::{Path, PathBuf};

pub const CACHE_FOLDER_VAR: &str = "SPECDECK_CACHE_FOLDER";

/// File name of the runner binary inside a versioned cache slot.
#[cfg(unix)]
pub const BINARY_NAME: &str = "specdeck-app";
#[cfg(windows)]
pub const BINARY_NAME: &str = "specdeck-app.exe";

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    /// Could not determine the platform cache directory.
    NoCacheDir,
    /// I/O error reading or removing cache contents.
    Io(std::io::Error),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCacheDir => write!(f, "could not determine the cache directory"),
            Self::Io(e) => write!(f, "cache error: {e}"),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::NoCacheDir => None,
        }
    }
}

impl From<std::io::Error> for CacheError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Resolve the cache root: `SPECDECK_CACHE_FOLDER` when set, otherwise
/// `<platform cache dir>/specdeck`.
///
/// # Errors
///
/// Returns `CacheError::NoCacheDir` when no override is set and the platform
/// cache directory cannot be determined.
pub fn cache_root() -> Result<PathBuf, CacheError> {
    cache_root_with(std::env::var(CACHE_FOLDER_VAR).ok(), dirs::cache_dir())
}

/// Testable variant of [`cache_root`] that accepts explicit inputs.
///
/// # Errors
///
/// Returns `CacheError::NoCacheDir` when both inputs are absent.
pub fn cache_root_with(
    override_dir: Option<String>,
    platform_dir: Option<PathBuf>,
) -> Result<PathBuf, CacheError> {
    if let Some(dir) = override_dir.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    platform_dir
        .map(|d| d.join("specdeck"))
        .ok_or(CacheError::NoCacheDir)
}

/// Directory of one installed runner version.
#[must_use]
pub fn versioned_dir(root: &Path, version: &str) -> PathBuf {
    root.join(version)
}

/// Path of the runner binary for one installed version.
#[must_use]
pub fn binary_path(root: &Path, version: &str) -> PathBuf {
    versioned_dir(root, version).join(BINARY_NAME)
}

/// List installed versions: the names of the version directories under the
/// cache root, sorted. A missing root lists as empty.
///
/// # Errors
///
/// Returns `CacheError::Io` when the root exists but cannot be read.
pub fn list_versions(root: &Path) -> Result<Vec<String>, CacheError> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut versions = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            versions.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    versions.sort();
    Ok(versions)
}

/// Remove the whole cache root. Removing an absent root is not an error.
///
/// # Errors
///
/// Returns `CacheError::Io` on removal failure.
pub fn clear(root: &Path) -> Result<(), CacheError> {
    match std::fs::remove_dir_all(root) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
