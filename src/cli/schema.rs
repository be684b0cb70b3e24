//! Command Schema Registry: per-command option specifications and the
//! `clap` command tree built from them.
//!
//! The registry is constructed once at startup and passed into the
//! dispatcher; there is no module-level mutable state. Construction fails if
//! any declared option lacks an entry in the descriptor table, so a schema
//! mistake surfaces before any user input is parsed.

use std::fmt;

use clap::{Arg, ArgAction, ArgMatches, Command};

use super::descriptors;
use super::{CommandName, OptionValue};
use crate::error::CliError;

/// Hidden catch-all positional that absorbs stray operands for the
/// reconciler instead of aborting the parse.
pub const STRAY_KEY: &str = "stray";

/// Key of the single positional sub-action of `cache`.
pub const CACHE_ACTION_KEY: &str = "cache-action";

// ---------------------------------------------------------------------------
// Option specifications
// ---------------------------------------------------------------------------

/// Declared arity of an option. `Multi` flags are the only ones eligible for
/// space-separated-token reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Single,
    Multi,
}

/// How the option consumes value tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueMode {
    /// Boolean switch; no value token.
    Switch,
    /// Exactly one value token.
    Required,
    /// Zero or one value token; `default_missing` is substituted for a bare
    /// flag before coercion runs.
    Optional { default_missing: &'static str },
}

/// Coercion from the raw value token to a typed option value.
pub type Coerce = fn(&str) -> OptionValue;

/// One flag: key (doubles as the long alias), optional short alias, arity,
/// value mode, and coercion. Help text is resolved from the descriptor table
/// at registry construction.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    pub key: &'static str,
    pub short: Option<char>,
    pub arity: Arity,
    pub mode: ValueMode,
    pub coerce: Option<Coerce>,
}

/// The documented boolean convention: the literal string `"false"` is false,
/// anything else is true.
#[must_use]
pub fn coerce_false(raw: &str) -> OptionValue {
    OptionValue::Bool(raw != "false")
}

const fn switch(key: &'static str, short: Option<char>) -> OptionSpec {
    OptionSpec {
        key,
        short,
        arity: Arity::Single,
        mode: ValueMode::Switch,
        coerce: None,
    }
}

const fn value(key: &'static str, short: Option<char>) -> OptionSpec {
    OptionSpec {
        key,
        short,
        arity: Arity::Single,
        mode: ValueMode::Required,
        coerce: None,
    }
}

const fn optional_bool(key: &'static str, short: Option<char>) -> OptionSpec {
    OptionSpec {
        key,
        short,
        arity: Arity::Single,
        mode: ValueMode::Optional {
            default_missing: "true",
        },
        coerce: Some(coerce_false),
    }
}

const fn multi(key: &'static str, short: Option<char>) -> OptionSpec {
    OptionSpec {
        key,
        short,
        arity: Arity::Multi,
        mode: ValueMode::Required,
        coerce: None,
    }
}

// ---------------------------------------------------------------------------
// Command schemas
// ---------------------------------------------------------------------------

/// Schema for one command: its options, an optional positional, and whether
/// stray operands are captured for the reconciler.
#[derive(Debug)]
pub struct CommandSchema {
    pub name: CommandName,
    pub about: &'static str,
    pub options: &'static [OptionSpec],
    pub positional: Option<&'static str>,
    pub captures_strays: bool,
}

const RUN_OPTIONS: &[OptionSpec] = &[
    value("browser", Some('b')),
    value("ci-build-id", None),
    value("config", Some('c')),
    value("config-file", Some('C')),
    optional_bool("dev", None),
    value("env", Some('e')),
    value("group", None),
    switch("headed", None),
    switch("headless", None),
    value("key", Some('k')),
    switch("parallel", None),
    value("port", Some('p')),
    value("project", Some('P')),
    switch("quiet", Some('q')),
    optional_bool("record", None),
    value("reporter", Some('r')),
    value("reporter-options", None),
    multi("spec", Some('s')),
    multi("tag", Some('t')),
];

const OPEN_OPTIONS: &[OptionSpec] = &[
    value("browser", Some('b')),
    value("config", Some('c')),
    value("config-file", Some('C')),
    optional_bool("detached", Some('d')),
    optional_bool("dev", None),
    value("env", Some('e')),
    switch("global", None),
    value("port", Some('p')),
    value("project", Some('P')),
];

const INSTALL_OPTIONS: &[OptionSpec] = &[switch("force", Some('f'))];

const VERIFY_OPTIONS: &[OptionSpec] = &[optional_bool("dev", None)];

/// All command schemas, indexed by `CommandName` discriminant.
pub const SCHEMAS: &[CommandSchema] = &[
    CommandSchema {
        name: CommandName::Run,
        about: "Run specs headlessly or in CI",
        options: RUN_OPTIONS,
        positional: None,
        captures_strays: true,
    },
    CommandSchema {
        name: CommandName::Open,
        about: "Open the interactive test runner",
        options: OPEN_OPTIONS,
        positional: None,
        captures_strays: true,
    },
    CommandSchema {
        name: CommandName::Install,
        about: "Install the versioned runner binary into the local cache",
        options: INSTALL_OPTIONS,
        positional: None,
        captures_strays: true,
    },
    CommandSchema {
        name: CommandName::Verify,
        about: "Check that the installed runner binary is runnable",
        options: VERIFY_OPTIONS,
        positional: None,
        captures_strays: true,
    },
    CommandSchema {
        name: CommandName::Cache,
        about: "Manage the local binary cache",
        options: &[],
        positional: Some(CACHE_ACTION_KEY),
        captures_strays: false,
    },
    CommandSchema {
        name: CommandName::Version,
        about: "Print the package and binary versions",
        options: &[],
        positional: None,
        captures_strays: false,
    },
    CommandSchema {
        name: CommandName::Help,
        about: "Print help for specdeck commands",
        options: &[],
        positional: None,
        captures_strays: false,
    },
];

impl CommandSchema {
    /// The subset of this schema's options declared `Multi`, in declaration
    /// order.
    pub fn multi_options(&self) -> impl Iterator<Item = &'static OptionSpec> {
        self.options.iter().filter(|s| s.arity == Arity::Multi)
    }
}

// ---------------------------------------------------------------------------
// Configuration error
// ---------------------------------------------------------------------------

/// A declared option has no help text in the descriptor table. Surfaces at
/// registry construction, never to end users.
#[derive(Debug)]
pub struct ConfigurationError {
    pub key: &'static str,
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "option \"{}\" is declared in a command schema but has no descriptor help text",
            self.key
        )
    }
}

impl std::error::Error for ConfigurationError {}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The process-scoped schema registry: owns the built `clap` command tree
/// and the unknown-option error hook the dispatcher invokes on parse errors.
pub struct Registry {
    command: Command,
}

impl Registry {
    /// Build the registry, validating that every declared option and
    /// positional has descriptor help text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` naming the first option key without a
    /// descriptor entry.
    pub fn new() -> Result<Self, ConfigurationError> {
        Ok(Self {
            command: build_command()?,
        })
    }

    #[must_use]
    pub fn schema_for(&self, name: CommandName) -> &'static CommandSchema {
        &SCHEMAS[name as usize]
    }

    /// Run the base parser over the raw token stream.
    ///
    /// # Errors
    ///
    /// Propagates the `clap` error; the dispatcher routes it through
    /// [`Registry::unknown_option_error`] or the help path.
    pub fn try_match(&self, raw: &[String]) -> Result<ArgMatches, clap::Error> {
        self.command.clone().try_get_matches_from(raw)
    }

    #[must_use]
    pub fn render_help(&self) -> String {
        self.command.clone().render_long_help().to_string()
    }

    pub fn print_help(&self) {
        println!("{}", self.render_help());
    }

    /// Render help for a single command, falling back to the full help when
    /// the command is not part of the tree.
    #[must_use]
    pub fn render_command_help(&self, name: CommandName) -> String {
        let mut command = self.command.clone();
        match command.find_subcommand_mut(name.as_str()) {
            Some(sub) => sub.render_long_help().to_string(),
            None => self.render_help(),
        }
    }

    /// The registry-owned unknown-option hook: converts a `clap` parse error
    /// into the CLI error the dispatcher prints before the command's help.
    #[must_use]
    pub fn unknown_option_error(&self, name: CommandName, err: &clap::Error) -> CliError {
        let rendered = err.to_string();
        let detail = rendered
            .lines()
            .next()
            .unwrap_or("invalid arguments")
            .trim_start_matches("error: ")
            .to_owned();
        CliError::unknown_option(name.as_str(), &detail)
    }
}

fn build_arg(spec: &OptionSpec) -> Result<Arg, ConfigurationError> {
    let help = descriptors::describe(spec.key).ok_or(ConfigurationError { key: spec.key })?;
    let mut arg = Arg::new(spec.key).long(spec.key).help(help);
    if let Some(short) = spec.short {
        arg = arg.short(short);
    }
    arg = match spec.mode {
        ValueMode::Switch => arg.action(ArgAction::SetTrue),
        ValueMode::Required => arg.action(ArgAction::Set).num_args(1),
        ValueMode::Optional { default_missing } => arg
            .action(ArgAction::Set)
            .num_args(0..=1)
            .default_missing_value(default_missing),
    };
    Ok(arg)
}

fn build_command() -> Result<Command, ConfigurationError> {
    let mut root = Command::new("specdeck")
        .bin_name("specdeck")
        .about("The command-line front door for the specdeck browser test runner")
        .disable_help_subcommand(true);

    for schema in SCHEMAS {
        let mut command = Command::new(schema.name.as_str()).about(schema.about);
        for spec in schema.options {
            command = command.arg(build_arg(spec)?);
        }
        if let Some(key) = schema.positional {
            let help = descriptors::describe(key).ok_or(ConfigurationError { key })?;
            command = command.arg(Arg::new(key).help(help).num_args(0..=1));
        }
        if schema.captures_strays {
            command = command.arg(Arg::new(STRAY_KEY).num_args(0..).hide(true));
        }
        root = root.subcommand(command);
    }

    Ok(root)
}
