//! The `verify` handler: checks that the installed runner binary is present
//! and runnable, then records the verification in the state file so later
//! runs can skip the check.

use std::path::{Path, PathBuf};

use super::HandlerError;
use crate::cache;
use crate::cli::VerifyOptions;
use crate::state::{self, BinaryState};

/// Verify the installed binary and resolve to exit code 0.
///
/// # Errors
///
/// Returns `HandlerError` when nothing is installed or the binary fails the
/// checks.
pub async fn start(options: &VerifyOptions) -> Result<i32, HandlerError> {
    if options.dev.unwrap_or(false) {
        println!("Dev mode: skipping binary verification.");
        return Ok(0);
    }

    let root = cache::cache_root()?;
    let path = verify_installed(&root)?;
    println!("Verified the runner binary at {}.", path.display());
    Ok(0)
}

/// Testable core of [`start`]: check the binary under `root` and persist the
/// verification flag.
///
/// # Errors
///
/// Returns `HandlerError` when no install is recorded, the binary is missing,
/// or it is not executable.
pub fn verify_installed(root: &Path) -> Result<PathBuf, HandlerError> {
    let state_path = state::state_file_path(root);
    let Some(recorded) = state::read_state(&state_path)? else {
        return Err(HandlerError::new(
            "No runner binary is installed. Run `specdeck install` first.",
        ));
    };

    let path = cache::binary_path(root, &recorded.version);
    if !path.exists() {
        return Err(HandlerError::new(format!(
            "The runner binary for version {} is missing from the cache. \
             Run `specdeck install --force` to reinstall it.",
            recorded.version
        )));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&path)?.permissions().mode();
        if mode & 0o111 == 0 {
            return Err(HandlerError::new(format!(
                "The runner binary at {} is not executable.",
                path.display()
            )));
        }
    }

    let verified = BinaryState {
        version: recorded.version,
        verified: true,
    };
    state::write_state(&state_path, &verified)?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn install_fixture(root: &Path, executable: bool) -> PathBuf {
        let recorded = BinaryState {
            version: "0.4.2".into(),
            verified: false,
        };
        state::write_state(&state::state_file_path(root), &recorded).expect("write state");

        let binary = cache::binary_path(root, "0.4.2");
        std::fs::create_dir_all(binary.parent().expect("parent")).expect("mkdir");
        std::fs::write(&binary, b"#!/bin/sh\nexit 0\n").expect("write binary");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = if executable { 0o755 } else { 0o644 };
            std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(mode))
                .expect("chmod");
        }
        #[cfg(not(unix))]
        let _ = executable;

        binary
    }

    #[test]
    fn verifies_and_records_the_flag() {
        let dir = tempfile::tempdir().expect("tempdir");
        let binary = install_fixture(dir.path(), true);

        let path = verify_installed(dir.path()).expect("verify");
        assert_eq!(path, binary);

        let recorded = state::read_state(&state::state_file_path(dir.path()))
            .expect("read")
            .expect("state");
        assert!(recorded.verified);
    }

    #[test]
    fn nothing_installed_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = verify_installed(dir.path()).expect_err("no install");
        assert!(err.to_string().contains("specdeck install"));
    }

    #[test]
    fn missing_binary_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let recorded = BinaryState {
            version: "0.4.2".into(),
            verified: false,
        };
        state::write_state(&state::state_file_path(dir.path()), &recorded).expect("write");

        let err = verify_installed(dir.path()).expect_err("binary missing");
        assert!(err.to_string().contains("0.4.2"));
    }

    #[cfg(unix)]
    #[test]
    fn non_executable_binary_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        install_fixture(dir.path(), false);

        let err = verify_installed(dir.path()).expect_err("not executable");
        assert!(err.to_string().contains("not executable"));
    }
}
