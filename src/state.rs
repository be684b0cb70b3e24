use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Binary state persisted between CLI invocations: which runner version is
/// installed in the cache and whether it passed verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryState {
    pub version: String,
    pub verified: bool,
}

/// Errors that can occur during state file operations.
#[derive(Debug)]
pub enum StateError {
    /// I/O error reading/writing the state file.
    Io(std::io::Error),
    /// State file contains invalid JSON.
    InvalidFormat(String),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "state file error: {e}"),
            Self::InvalidFormat(e) => write!(f, "invalid state file: {e}"),
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::InvalidFormat(_) => None,
        }
    }
}

impl From<std::io::Error> for StateError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Path of the state file inside a cache root.
#[must_use]
pub fn state_file_path(cache_root: &Path) -> PathBuf {
    cache_root.join("state.json")
}

/// Read the binary state, returning `None` when no state file exists yet.
///
/// # Errors
///
/// Returns `StateError::Io` on read failure or `StateError::InvalidFormat`
/// when the file is not valid JSON.
pub fn read_state(path: &Path) -> Result<Option<BinaryState>, StateError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let state =
        serde_json::from_str(&contents).map_err(|e| StateError::InvalidFormat(e.to_string()))?;
    Ok(Some(state))
}

/// Write the binary state. Creates the parent directory if needed.
///
/// Uses atomic write (write to temp file then rename) and sets file
/// permissions to `0o600` on Unix.
///
/// # Errors
///
/// Returns `StateError::Io` on I/O failure.
pub fn write_state(path: &Path, state: &BinaryState) -> Result<(), StateError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = serde_json::to_string_pretty(state)
        .map_err(|e| StateError::InvalidFormat(e.to_string()))?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_state_file_reads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = state_file_path(dir.path());
        assert!(read_state(&path).expect("read").is_none());
    }

    #[test]
    fn state_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = state_file_path(dir.path());
        let state = BinaryState {
            version: "0.4.2".into(),
            verified: true,
        };
        write_state(&path, &state).expect("write");

        let read = read_state(&path).expect("read").expect("present");
        assert_eq!(read.version, "0.4.2");
        assert!(read.verified);
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("state.json");
        let state = BinaryState {
            version: "0.4.2".into(),
            verified: false,
        };
        write_state(&path, &state).expect("write");
        assert!(path.exists());
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = state_file_path(dir.path());
        std::fs::write(&path, "not json").expect("write");
        assert!(matches!(
            read_state(&path),
            Err(StateError::InvalidFormat(_))
        ));
    }

    #[test]
    fn no_temp_file_is_left_behind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = state_file_path(dir.path());
        let state = BinaryState {
            version: "0.4.2".into(),
            verified: false,
        };
        write_state(&path, &state).expect("write");

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read_dir")
            .map(|e| e.expect("entry").file_name())
            .collect();
        assert_eq!(entries, ["state.json"]);
    }
}
