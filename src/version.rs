//! Version lookup: the package version compiled into this CLI and the
//! version of the runner binary recorded in the cache state.

use std::fmt;

use serde::Serialize;

use crate::cache::{self, CacheError};
use crate::state::{self, BinaryState, StateError};

/// Shown for the binary when no install has been recorded.
const NOT_INSTALLED: &str = "not installed";

#[derive(Debug, Clone, Serialize)]
pub struct Versions {
    pub package: String,
    pub binary: String,
}

/// Errors that can occur while resolving versions.
#[derive(Debug)]
pub enum VersionError {
    Cache(CacheError),
    State(StateError),
}

impl fmt::Display for VersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache(e) => write!(f, "{e}"),
            Self::State(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for VersionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Cache(e) => Some(e),
            Self::State(e) => Some(e),
        }
    }
}

impl From<CacheError> for VersionError {
    fn from(e: CacheError) -> Self {
        Self::Cache(e)
    }
}

impl From<StateError> for VersionError {
    fn from(e: StateError) -> Self {
        Self::State(e)
    }
}

/// Resolve both version strings. The binary version comes from the cache
/// state file; an absent state reads as "not installed".
///
/// # Errors
///
/// Returns `VersionError` when the cache root cannot be determined or the
/// state file is unreadable.
pub async fn get_versions() -> Result<Versions, VersionError> {
    let root = cache::cache_root()?;
    let state = state::read_state(&state::state_file_path(&root))?;
    Ok(from_state(state.as_ref()))
}

/// Build the version pair from an optional binary state.
#[must_use]
pub fn from_state(state: Option<&BinaryState>) -> Versions {
    Versions {
        package: env!("CARGO_PKG_VERSION").to_owned(),
        binary: state.map_or_else(|| NOT_INSTALLED.to_owned(), |s| s.version.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_version_matches_the_crate() {
        let versions = from_state(None);
        assert_eq!(versions.package, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn absent_state_reads_as_not_installed() {
        assert_eq!(from_state(None).binary, "not installed");
    }

    #[test]
    fn recorded_state_supplies_the_binary_version() {
        let state = BinaryState {
            version: "0.4.1".into(),
            verified: true,
        };
        assert_eq!(from_state(Some(&state)).binary, "0.4.1");
    }
}
