//! Command Resolver: classifies the raw token stream before any
//! schema-driven parsing happens.

use super::{COMMAND_POSITION, CommandName};

/// What the raw token stream asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No command supplied; print help and stop.
    ShowHelp,
    /// A version request, short-circuiting command parsing.
    ShowVersion,
    /// A known command to parse and dispatch.
    Dispatch(CommandName),
    /// The command-position token is not a known command.
    Unknown(String),
}

/// Tokens that trigger the version short-circuit. `version` itself is in the
/// set because the legacy top-level flag affordance accepted it anywhere in
/// the stream, not just at the command position.
const VERSION_TOKENS: [&str; 3] = ["-v", "--version", "version"];

/// Classify a raw argument vector (program name at index 0).
#[must_use]
pub fn resolve(raw: &[String]) -> Resolution {
    if raw.len() <= COMMAND_POSITION {
        return Resolution::ShowHelp;
    }

    if raw[COMMAND_POSITION..]
        .iter()
        .any(|token| VERSION_TOKENS.contains(&token.as_str()))
    {
        return Resolution::ShowVersion;
    }

    let token = &raw[COMMAND_POSITION];
    if token == "--help" || token == "-h" {
        return Resolution::ShowHelp;
    }
    match CommandName::parse(token) {
        Some(command) => Resolution::Dispatch(command),
        None => Resolution::Unknown(token.clone()),
    }
}
