use std::fmt;

/// Process exit codes used by the dispatcher.
///
/// `Misuse` is negative on purpose: it marks the startup guard that fires
/// when the entry point is exec'd outside its intended host, before any
/// command logic has run.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    Misuse = -1,
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::GeneralError => write!(f, "general error"),
            Self::Misuse => write!(f, "misuse"),
        }
    }
}

/// Top-level CLI error carrying the message to print and the exit code to
/// terminate with.
#[derive(Debug)]
pub struct CliError {
    pub message: String,
    pub code: ExitCode,
    /// When set, the dispatcher reprints help after the error message.
    pub show_help: bool,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl CliError {
    #[must_use]
    pub fn unknown_command(token: &str) -> Self {
        Self {
            message: format!("Unknown command: \"{token}\""),
            code: ExitCode::GeneralError,
            show_help: true,
        }
    }

    #[must_use]
    pub fn unknown_sub_command(command: &str, token: &str) -> Self {
        Self {
            message: format!("Unknown sub-command: \"{command} {token}\""),
            code: ExitCode::GeneralError,
            show_help: true,
        }
    }

    #[must_use]
    pub fn missing_sub_command(command: &str) -> Self {
        Self {
            message: format!(
                "The \"{command}\" command requires a sub-command: list, path, or clear."
            ),
            code: ExitCode::GeneralError,
            show_help: true,
        }
    }

    #[must_use]
    pub fn unknown_option(command: &str, detail: &str) -> Self {
        Self {
            message: format!("Unknown option passed to \"{command}\": {detail}"),
            code: ExitCode::GeneralError,
            show_help: true,
        }
    }

    #[must_use]
    pub fn invalid_environment(value: &str) -> Self {
        Self {
            message: format!(
                "SPECDECK_INTERNAL_ENV is set to the invalid value \"{value}\". \
                 Accepted values are: production, development, staging, test."
            ),
            code: ExitCode::GeneralError,
            show_help: false,
        }
    }

    #[must_use]
    pub fn handler_failure(message: &str) -> Self {
        Self {
            message: message.to_owned(),
            code: ExitCode::GeneralError,
            show_help: false,
        }
    }

    #[must_use]
    pub fn version_lookup(detail: &str) -> Self {
        Self {
            message: format!("Could not resolve version information: {detail}"),
            code: ExitCode::GeneralError,
            show_help: false,
        }
    }

    #[must_use]
    pub fn misuse() -> Self {
        Self {
            message: "The specdeck CLI must be invoked through its host binary.".into(),
            code: ExitCode::Misuse,
            show_help: false,
        }
    }

    pub fn print_stderr(&self) {
        eprintln!("{self}");
    }
}
