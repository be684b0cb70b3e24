//! The `install` handler: places a runner binary into the versioned cache
//! slot for this package version and records it in the state file. The
//! binary comes from a locally supplied source (`SPECDECK_INSTALL_BINARY`);
//! there is no network involved.

use std::path::{Path, PathBuf};

use super::HandlerError;
use crate::cache;
use crate::cli::InstallOptions;
use crate::state::{self, BinaryState};

/// Names a local runner binary to install into the cache.
pub const INSTALL_BINARY_VAR: &str = "SPECDECK_INSTALL_BINARY";

/// Skips installation entirely (CI images that pre-seed the cache).
pub const SKIP_INSTALL_VAR: &str = "SPECDECK_SKIP_BINARY_INSTALL";

/// What an install attempt did.
#[derive(Debug, PartialEq, Eq)]
pub enum InstallOutcome {
    Skipped,
    AlreadyInstalled(PathBuf),
    Installed(PathBuf),
}

/// Install the runner binary and resolve to exit code 0.
///
/// # Errors
///
/// Returns `HandlerError` when no installation source is configured or the
/// copy fails.
pub async fn start(options: &InstallOptions) -> Result<i32, HandlerError> {
    let skip = std::env::var(SKIP_INSTALL_VAR).is_ok_and(|v| !v.is_empty() && v != "0");
    let source = std::env::var(INSTALL_BINARY_VAR).ok();
    let root = cache::cache_root()?;

    match install_with(options, skip, source.as_deref(), &root)? {
        InstallOutcome::Skipped => {
            println!("Skipping binary installation ({SKIP_INSTALL_VAR} is set).");
        }
        InstallOutcome::AlreadyInstalled(path) => {
            println!(
                "The runner binary is already installed at {}. \
                 Pass --force to reinstall.",
                path.display()
            );
        }
        InstallOutcome::Installed(path) => {
            println!("Installed the runner binary to {}.", path.display());
        }
    }
    Ok(0)
}

/// Testable core of [`start`] with all inputs explicit.
///
/// # Errors
///
/// Returns `HandlerError` when `source` is absent or unreadable.
pub fn install_with(
    options: &InstallOptions,
    skip: bool,
    source: Option<&str>,
    root: &Path,
) -> Result<InstallOutcome, HandlerError> {
    if skip {
        return Ok(InstallOutcome::Skipped);
    }

    let version = env!("CARGO_PKG_VERSION");
    let target = cache::binary_path(root, version);

    if target.exists() && !options.force {
        return Ok(InstallOutcome::AlreadyInstalled(target));
    }

    let Some(source) = source.filter(|s| !s.is_empty()) else {
        return Err(HandlerError::new(format!(
            "No installation source is configured. \
             Set {INSTALL_BINARY_VAR} to the path of a runner binary."
        )));
    };
    let source = Path::new(source);
    if !source.exists() {
        return Err(HandlerError::new(format!(
            "The installation source {} does not exist.",
            source.display()
        )));
    }

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(source, &target)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o755))?;
    }

    let recorded = BinaryState {
        version: version.to_owned(),
        verified: false,
    };
    state::write_state(&state::state_file_path(root), &recorded)?;

    Ok(InstallOutcome::Installed(target))
}
