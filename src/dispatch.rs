//! The dispatcher: orchestrates environment validation, command resolution,
//! schema-driven parsing, reconciliation, and the handoff to the external
//! handlers. Owns the process exit-code policy; `main` only exits with what
//! this module returns.

use crate::cli::resolver::{self, Resolution};
use crate::cli::schema::Registry;
use crate::cli::{self, CacheAction, CliCommand, CommandName};
use crate::environment;
use crate::error::CliError;
use crate::exec::{HandlerError, Host};

/// Dispatch a raw argument vector against the process environment.
pub async fn dispatch<H: Host>(raw: &[String], registry: &Registry, host: &H) -> i32 {
    let internal_env = std::env::var(environment::INTERNAL_ENV_VAR).ok();
    dispatch_with(raw, registry, host, internal_env.as_deref()).await
}

/// Testable variant of [`dispatch`] with the environment discriminator
/// passed explicitly.
///
/// Ordering is fixed: the misuse guard, then environment validation, then
/// resolution, then schema parsing and reconciliation, then the handoff.
pub async fn dispatch_with<H: Host>(
    raw: &[String],
    registry: &Registry,
    host: &H,
    internal_env: Option<&str>,
) -> i32 {
    // Startup guard: a conventional host always supplies argv[0].
    if raw.is_empty() {
        return fail(registry, None, &CliError::misuse());
    }

    if let Err(err) = environment::validate_with(internal_env) {
        return fail(registry, None, &err);
    }

    match resolver::resolve(raw) {
        Resolution::ShowHelp => {
            registry.print_help();
            0
        }
        Resolution::ShowVersion => print_versions(host).await,
        Resolution::Unknown(token) => fail(registry, None, &CliError::unknown_command(&token)),
        Resolution::Dispatch(CommandName::Help) => {
            registry.print_help();
            0
        }
        Resolution::Dispatch(CommandName::Version) => print_versions(host).await,
        Resolution::Dispatch(name) => run_command(raw, registry, host, name).await,
    }
}

async fn run_command<H: Host>(
    raw: &[String],
    registry: &Registry,
    host: &H,
    name: CommandName,
) -> i32 {
    let matches = match registry.try_match(raw) {
        Ok(matches) => matches,
        Err(err)
            if matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp
                    | clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            let _ = err.print();
            return 0;
        }
        Err(err) => {
            return fail(
                registry,
                Some(name),
                &registry.unknown_option_error(name, &err),
            );
        }
    };

    let Some((_, sub_matches)) = matches.subcommand() else {
        // The resolver found a command token, so the base parser must have
        // matched a subcommand; reaching this means the two disagree.
        return fail(
            registry,
            None,
            &CliError::unknown_command(&raw[cli::COMMAND_POSITION]),
        );
    };

    let parsed = match cli::from_matches(registry, name, sub_matches, raw) {
        Ok(parsed) => parsed,
        Err(err) => return fail(registry, Some(name), &err),
    };

    for warning in &parsed.warnings {
        eprintln!("{warning}");
    }

    match parsed.command {
        CliCommand::Run(options) => finish(host.start_run(&options).await),
        CliCommand::Open(options) => finish(host.start_open(&options).await),
        CliCommand::Install(options) => finish(host.start_install(&options).await),
        CliCommand::Verify(options) => finish(host.start_verify(&options).await),
        CliCommand::Cache(action) => {
            let result = match action {
                CacheAction::List => host.cache_list(),
                CacheAction::Path => host.cache_path(),
                CacheAction::Clear => host.cache_clear(),
            };
            match result {
                Ok(()) => 0,
                Err(err) => {
                    eprintln!("{err}");
                    1
                }
            }
        }
        CliCommand::Version => print_versions(host).await,
        CliCommand::Help => {
            registry.print_help();
            0
        }
    }
}

fn finish(result: Result<i32, HandlerError>) -> i32 {
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

async fn print_versions<H: Host>(host: &H) -> i32 {
    match host.versions().await {
        Ok(versions) => {
            println!("specdeck package version: {}", versions.package);
            println!("specdeck binary version: {}", versions.binary);
            0
        }
        Err(err) => {
            CliError::version_lookup(&err.to_string()).print_stderr();
            1
        }
    }
}

/// Print the error, optionally followed by the relevant help text, and map
/// it to the exit code.
fn fail(registry: &Registry, command: Option<CommandName>, err: &CliError) -> i32 {
    err.print_stderr();
    if err.show_help {
        let help = match command {
            Some(name) => registry.render_command_help(name),
            None => registry.render_help(),
        };
        eprintln!("\n{help}");
    }
    err.code as i32
}
