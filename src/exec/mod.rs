//! External collaborators the dispatcher hands off to. Each action command
//! exposes `start(options)` returning a deferred exit code; `cache` exposes
//! three synchronous operations; `versions` is an async lookup. The `Host`
//! trait is the seam that lets tests inject a fake set of collaborators.

pub mod install;
pub mod open;
pub mod run;
pub mod verify;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::cache::{self, CacheError};
use crate::cli::{InstallOptions, OpenOptions, RunOptions, VerifyOptions};
use crate::state::{self, StateError};
use crate::version::{self, Versions};

/// Overrides the runner binary location, bypassing the cache lookup.
pub const RUN_BINARY_VAR: &str = "SPECDECK_RUN_BINARY";

/// A handler failure: logged verbatim by the dispatcher, exit 1.
#[derive(Debug)]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for HandlerError {}

impl From<std::io::Error> for HandlerError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<CacheError> for HandlerError {
    fn from(e: CacheError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<StateError> for HandlerError {
    fn from(e: StateError) -> Self {
        Self::new(e.to_string())
    }
}

/// The collaborator boundary the dispatcher talks through.
// The dispatcher awaits these futures on the current task only, so no Send
// bound is needed on them.
#[allow(async_fn_in_trait)]
pub trait Host {
    async fn start_run(&self, options: &RunOptions) -> Result<i32, HandlerError>;
    async fn start_open(&self, options: &OpenOptions) -> Result<i32, HandlerError>;
    async fn start_install(&self, options: &InstallOptions) -> Result<i32, HandlerError>;
    async fn start_verify(&self, options: &VerifyOptions) -> Result<i32, HandlerError>;
    async fn versions(&self) -> Result<Versions, HandlerError>;
    fn cache_list(&self) -> Result<(), HandlerError>;
    fn cache_path(&self) -> Result<(), HandlerError>;
    fn cache_clear(&self) -> Result<(), HandlerError>;
}

/// The real collaborator set used by the binary.
pub struct ProductionHost;

impl Host for ProductionHost {
    async fn start_run(&self, options: &RunOptions) -> Result<i32, HandlerError> {
        run::start(options).await
    }

    async fn start_open(&self, options: &OpenOptions) -> Result<i32, HandlerError> {
        open::start(options).await
    }

    async fn start_install(&self, options: &InstallOptions) -> Result<i32, HandlerError> {
        install::start(options).await
    }

    async fn start_verify(&self, options: &VerifyOptions) -> Result<i32, HandlerError> {
        verify::start(options).await
    }

    async fn versions(&self) -> Result<Versions, HandlerError> {
        version::get_versions()
            .await
            .map_err(|e| HandlerError::new(e.to_string()))
    }

    fn cache_list(&self) -> Result<(), HandlerError> {
        let root = cache::cache_root()?;
        let versions = cache::list_versions(&root)?;
        if versions.is_empty() {
            println!("No binary versions are cached.");
        } else {
            for version in versions {
                println!("{version}");
            }
        }
        Ok(())
    }

    fn cache_path(&self) -> Result<(), HandlerError> {
        let root = cache::cache_root()?;
        println!("{}", root.display());
        Ok(())
    }

    fn cache_clear(&self) -> Result<(), HandlerError> {
        let root = cache::cache_root()?;
        cache::clear(&root)?;
        println!("Cleared binary cache at {}", root.display());
        Ok(())
    }
}

/// Resolve the runner binary: env override first, then the installed cache
/// slot. Dev mode never falls back to the cache.
pub(crate) fn resolve_binary(dev: bool) -> Result<PathBuf, HandlerError> {
    resolve_binary_with(std::env::var(RUN_BINARY_VAR).ok(), dev)
}

pub(crate) fn resolve_binary_with(
    override_path: Option<String>,
    dev: bool,
) -> Result<PathBuf, HandlerError> {
    if let Some(path) = override_path.filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    if dev {
        return Err(HandlerError::new(format!(
            "Dev mode bypasses the installed binary; set {RUN_BINARY_VAR} to the binary to use."
        )));
    }
    let root = cache::cache_root()?;
    resolve_installed(&root)
}

/// Locate the installed binary under a cache root.
pub(crate) fn resolve_installed(root: &Path) -> Result<PathBuf, HandlerError> {
    let Some(recorded) = state::read_state(&state::state_file_path(root))? else {
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
    Ok(path)
}
