//! The `run` handler: launches the runner binary in headless run mode with
//! the normalized options serialized onto its command line, and reports the
//! runner's own exit code (the failing-test count) back to the dispatcher.

use tokio::process::Command;

use super::{HandlerError, resolve_binary};
use crate::cli::RunOptions;

/// Start a run and resolve to the runner's suggested exit code.
///
/// # Errors
///
/// Returns `HandlerError` when no binary can be resolved or the process
/// cannot be spawned.
pub async fn start(options: &RunOptions) -> Result<i32, HandlerError> {
    let binary = resolve_binary(options.dev.unwrap_or(false))?;
    let status = Command::new(&binary)
        .args(child_args(options))
        .status()
        .await
        .map_err(|e| HandlerError::new(format!("could not launch {}: {e}", binary.display())))?;
    Ok(status.code().unwrap_or(1))
}

/// Serialize the typed record back into the argument vector the runner
/// understands. Only options the user actually passed are forwarded.
#[must_use]
pub fn child_args(options: &RunOptions) -> Vec<String> {
    let mut args = vec!["--mode".to_owned(), "run".to_owned()];

    let mut push_value = |flag: &str, value: &Option<String>| {
        if let Some(value) = value {
            args.push(flag.to_owned());
            args.push(value.clone());
        }
    };

    push_value("--browser", &options.browser);
    push_value("--ci-build-id", &options.ci_build_id);
    push_value("--config", &options.config);
    push_value("--config-file", &options.config_file);
    push_value("--env", &options.env);
    push_value("--group", &options.group);
    push_value("--key", &options.key);
    push_value("--port", &options.port);
    push_value("--project", &options.project);
    push_value("--reporter", &options.reporter);
    push_value("--reporter-options", &options.reporter_options);
    push_value("--spec", &options.spec);
    push_value("--tag", &options.tag);

    if options.headed {
        args.push("--headed".to_owned());
    }
    if options.headless {
        args.push("--headless".to_owned());
    }
    if options.parallel {
        args.push("--parallel".to_owned());
    }
    if options.quiet {
        args.push("--quiet".to_owned());
    }
    if let Some(record) = options.record {
        args.push("--record".to_owned());
        args.push(record.to_string());
    }

    args
}
