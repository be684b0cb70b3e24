//! The `open` handler: launches the runner binary in interactive mode.
//! Detached mode spawns the process and returns immediately, leaving the
//! runner attached to the desktop session rather than this terminal.

use tokio::process::Command;

use super::{HandlerError, resolve_binary};
use crate::cli::OpenOptions;

/// Open the interactive runner and resolve to its exit code (0 immediately
/// in detached mode).
///
/// # Errors
///
/// Returns `HandlerError` when no binary can be resolved or the process
/// cannot be spawned.
pub async fn start(options: &OpenOptions) -> Result<i32, HandlerError> {
    let binary = resolve_binary(options.dev.unwrap_or(false))?;
    let mut command = Command::new(&binary);
    command.args(child_args(options));

    if options.detached.unwrap_or(false) {
        // The child must outlive this process; tokio leaves spawned children
        // running on drop unless kill_on_drop is set.
        command
            .spawn()
            .map_err(|e| spawn_error(&binary, &e))?;
        return Ok(0);
    }

    let status = command
        .status()
        .await
        .map_err(|e| spawn_error(&binary, &e))?;
    Ok(status.code().unwrap_or(1))
}

fn spawn_error(binary: &std::path::Path, e: &std::io::Error) -> HandlerError {
    HandlerError::new(format!("could not launch {}: {e}", binary.display()))
}

#[must_use]
pub fn child_args(options: &OpenOptions) -> Vec<String> {
    let mut args = vec!["--mode".to_owned(), "open".to_owned()];

    let mut push_value = |flag: &str, value: &Option<String>| {
        if let Some(value) = value {
            args.push(flag.to_owned());
            args.push(value.clone());
        }
    };

    push_value("--browser", &options.browser);
    push_value("--config", &options.config);
    push_value("--config-file", &options.config_file);
    push_value("--env", &options.env);
    push_value("--port", &options.port);
    push_value("--project", &options.project);

    if options.global {
        args.push("--global".to_owned());
    }

    args
}
