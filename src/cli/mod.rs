//! Command-line surface: command names, per-command option records, and the
//! conversion from a schema-driven parse into the typed `CliCommand` handed
//! to the dispatcher.
//!
//! Parsing happens in three steps. The resolver classifies the raw token
//! stream; the schema registry drives a `clap` parse into a `ParsedOptions`
//! map; the reconciler may rewrite multi-value entries in that map; the map
//! is then frozen into one of the strongly-typed option records below and is
//! never mutated again.

pub mod descriptors;
pub mod reconcile;
pub mod resolver;
pub mod schema;

use std::collections::BTreeMap;

use clap::ArgMatches;

use crate::error::CliError;
use schema::{CommandSchema, Registry};

/// Index of the command token in the raw argument vector. Index 0 is the
/// program name; the same convention is used by the resolver and the
/// reconciler.
pub const COMMAND_POSITION: usize = 1;

// ---------------------------------------------------------------------------
// Command names
// ---------------------------------------------------------------------------

/// The fixed set of top-level commands. Anything else is rejected, never
/// coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum CommandName {
    Run = 0,
    Open = 1,
    Install = 2,
    Verify = 3,
    Cache = 4,
    Version = 5,
    Help = 6,
}

impl CommandName {
    pub const ALL: [Self; 7] = [
        Self::Run,
        Self::Open,
        Self::Install,
        Self::Verify,
        Self::Cache,
        Self::Version,
        Self::Help,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Open => "open",
            Self::Install => "install",
            Self::Verify => "verify",
            Self::Cache => "cache",
            Self::Version => "version",
            Self::Help => "help",
        }
    }

    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == token)
    }
}

// ---------------------------------------------------------------------------
// Parsed options (pre-freeze)
// ---------------------------------------------------------------------------

/// A single parsed option value. Comma-joined `Text` stands in for a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Bool(bool),
    Text(String),
}

/// The mutable intermediate between the base parse and the typed freeze.
/// Only options actually present on the command line appear in the map.
/// The reconciler is the only code that rewrites entries.
#[derive(Debug, Default)]
pub struct ParsedOptions {
    values: BTreeMap<&'static str, OptionValue>,
    strays: Vec<String>,
}

impl ParsedOptions {
    /// Build the map from a completed `clap` match, applying each spec's
    /// coercion function as values are pulled out.
    #[must_use]
    pub fn from_matches(schema: &CommandSchema, matches: &ArgMatches) -> Self {
        let mut values = BTreeMap::new();
        for spec in schema.options {
            match spec.mode {
                schema::ValueMode::Switch => {
                    if matches.get_flag(spec.key) {
                        values.insert(spec.key, OptionValue::Bool(true));
                    }
                }
                schema::ValueMode::Required | schema::ValueMode::Optional { .. } => {
                    if let Some(raw) = matches.get_one::<String>(spec.key) {
                        let value = match spec.coerce {
                            Some(coerce) => coerce(raw),
                            None => OptionValue::Text(raw.clone()),
                        };
                        values.insert(spec.key, value);
                    }
                }
            }
        }

        // Querying an arg id the command never defined would panic inside
        // clap, so only schemas that declare the catch-all are asked for it.
        let strays = if schema.captures_strays {
            matches
                .get_many::<String>(schema::STRAY_KEY)
                .map(|v| v.cloned().collect())
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        Self { values, strays }
    }

    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(OptionValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Presence of a plain switch.
    #[must_use]
    pub fn switch(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(OptionValue::Bool(true)))
    }

    /// Value of a coerced boolean flag; `None` when the flag was not passed.
    #[must_use]
    pub fn tristate(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(OptionValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn set_text(&mut self, key: &'static str, value: String) {
        self.values.insert(key, OptionValue::Text(value));
    }

    #[must_use]
    pub fn strays(&self) -> &[String] {
        &self.strays
    }

    /// Remove one occurrence of `token` from the stray-positional list.
    /// Returns whether anything was removed. Consuming the list is what
    /// makes reconciliation idempotent: once no strays remain there is
    /// nothing left to absorb.
    pub fn consume_stray(&mut self, token: &str) -> bool {
        match self.strays.iter().position(|t| t == token) {
            Some(index) => {
                self.strays.remove(index);
                true
            }
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Typed option records (post-freeze)
// ---------------------------------------------------------------------------

/// Options accepted by `specdeck run`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub browser: Option<String>,
    pub ci_build_id: Option<String>,
    pub config: Option<String>,
    pub config_file: Option<String>,
    pub dev: Option<bool>,
    pub env: Option<String>,
    pub group: Option<String>,
    pub headed: bool,
    pub headless: bool,
    pub key: Option<String>,
    pub parallel: bool,
    pub port: Option<String>,
    pub project: Option<String>,
    pub quiet: bool,
    pub record: Option<bool>,
    pub reporter: Option<String>,
    pub reporter_options: Option<String>,
    pub spec: Option<String>,
    pub tag: Option<String>,
}

/// Options accepted by `specdeck open`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenOptions {
    pub browser: Option<String>,
    pub config: Option<String>,
    pub config_file: Option<String>,
    pub detached: Option<bool>,
    pub dev: Option<bool>,
    pub env: Option<String>,
    pub global: bool,
    pub port: Option<String>,
    pub project: Option<String>,
}

/// Options accepted by `specdeck install`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallOptions {
    pub force: bool,
}

/// Options accepted by `specdeck verify`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyOptions {
    pub dev: Option<bool>,
}

/// The single positional sub-action of `specdeck cache`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAction {
    List,
    Path,
    Clear,
}

impl CacheAction {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "list" => Some(Self::List),
            "path" => Some(Self::Path),
            "clear" => Some(Self::Clear),
            _ => None,
        }
    }
}

/// A fully parsed invocation: one variant per command, each carrying its own
/// typed option record. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Run(RunOptions),
    Open(OpenOptions),
    Install(InstallOptions),
    Verify(VerifyOptions),
    Cache(CacheAction),
    Version,
    Help,
}

// ---------------------------------------------------------------------------
// Parse + freeze
// ---------------------------------------------------------------------------

/// Outcome of a schema-driven parse: the frozen command plus any warnings the
/// reconciler produced. The caller decides where warnings are printed.
#[derive(Debug)]
pub struct Parsed {
    pub command: CliCommand,
    pub warnings: Vec<String>,
}

/// Convert a completed `clap` match for `name` into a typed command,
/// running the multi-value reconciler in between.
///
/// # Errors
///
/// Returns `CliError` for an unknown or missing `cache` sub-action.
pub fn from_matches(
    registry: &Registry,
    name: CommandName,
    matches: &ArgMatches,
    raw: &[String],
) -> Result<Parsed, CliError> {
    let schema = registry.schema_for(name);
    let mut parsed = ParsedOptions::from_matches(schema, matches);
    let warnings = reconcile::reconcile(schema, raw, &mut parsed);

    let command = match name {
        CommandName::Run => CliCommand::Run(freeze_run(&parsed)),
        CommandName::Open => CliCommand::Open(freeze_open(&parsed)),
        CommandName::Install => CliCommand::Install(InstallOptions {
            force: parsed.switch("force"),
        }),
        CommandName::Verify => CliCommand::Verify(VerifyOptions {
            dev: parsed.tristate("dev"),
        }),
        CommandName::Cache => CliCommand::Cache(cache_action(name, matches)?),
        CommandName::Version => CliCommand::Version,
        CommandName::Help => CliCommand::Help,
    };

    Ok(Parsed { command, warnings })
}

fn cache_action(name: CommandName, matches: &ArgMatches) -> Result<CacheAction, CliError> {
    let Some(token) = matches.get_one::<String>(schema::CACHE_ACTION_KEY) else {
        return Err(CliError::missing_sub_command(name.as_str()));
    };
    CacheAction::parse(token).ok_or_else(|| CliError::unknown_sub_command(name.as_str(), token))
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(ToOwned::to_owned)
}

fn freeze_run(parsed: &ParsedOptions) -> RunOptions {
    RunOptions {
        browser: owned(parsed.text("browser")),
        ci_build_id: owned(parsed.text("ci-build-id")),
        config: owned(parsed.text("config")),
        config_file: owned(parsed.text("config-file")),
        dev: parsed.tristate("dev"),
        env: owned(parsed.text("env")),
        group: owned(parsed.text("group")),
        headed: parsed.switch("headed"),
        headless: parsed.switch("headless"),
        key: owned(parsed.text("key")),
        parallel: parsed.switch("parallel"),
        port: owned(parsed.text("port")),
        project: owned(parsed.text("project")),
        quiet: parsed.switch("quiet"),
        record: parsed.tristate("record"),
        reporter: owned(parsed.text("reporter")),
        reporter_options: owned(parsed.text("reporter-options")),
        spec: owned(parsed.text("spec")),
        tag: owned(parsed.text("tag")),
    }
}

fn freeze_open(parsed: &ParsedOptions) -> OpenOptions {
    OpenOptions {
        browser: owned(parsed.text("browser")),
        config: owned(parsed.text("config")),
        config_file: owned(parsed.text("config-file")),
        detached: parsed.tristate("detached"),
        dev: parsed.tristate("dev"),
        env: owned(parsed.text("env")),
        global: parsed.switch("global"),
        port: owned(parsed.text("port")),
        project: owned(parsed.text("project")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| (*t).to_string()).collect()
    }

    fn parse(raw: &[&str]) -> Parsed {
        let registry = Registry::new().expect("registry");
        let raw = argv(raw);
        let matches = registry.try_match(&raw).expect("clap parse");
        let (sub, sub_matches) = matches.subcommand().expect("subcommand");
        let name = CommandName::parse(sub).expect("known command");
        from_matches(&registry, name, sub_matches, &raw).expect("freeze")
    }

    #[test]
    fn command_names_round_trip() {
        for name in CommandName::ALL {
            assert_eq!(CommandName::parse(name.as_str()), Some(name));
        }
        assert_eq!(CommandName::parse("frobnicate"), None);
    }

    #[test]
    fn run_options_freeze_into_typed_record() {
        let parsed = parse(&[
            "specdeck",
            "run",
            "--browser",
            "chromium",
            "--spec",
            "a.js,b.js",
            "--parallel",
            "--record",
            "false",
            "--port",
            "8080",
        ]);
        let CliCommand::Run(opts) = parsed.command else {
            panic!("expected run");
        };
        assert_eq!(opts.browser.as_deref(), Some("chromium"));
        assert_eq!(opts.spec.as_deref(), Some("a.js,b.js"));
        assert!(opts.parallel);
        assert_eq!(opts.record, Some(false));
        assert_eq!(opts.port.as_deref(), Some("8080"));
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn coerce_false_defaults_to_true_for_bare_flag() {
        let parsed = parse(&["specdeck", "run", "--record"]);
        let CliCommand::Run(opts) = parsed.command else {
            panic!("expected run");
        };
        assert_eq!(opts.record, Some(true));
    }

    #[test]
    fn coerce_false_treats_non_false_values_as_true() {
        let parsed = parse(&["specdeck", "open", "--detached", "yes"]);
        let CliCommand::Open(opts) = parsed.command else {
            panic!("expected open");
        };
        assert_eq!(opts.detached, Some(true));
    }

    #[test]
    fn absent_coerced_flag_is_none() {
        let parsed = parse(&["specdeck", "run"]);
        let CliCommand::Run(opts) = parsed.command else {
            panic!("expected run");
        };
        assert_eq!(opts.record, None);
        assert_eq!(opts.dev, None);
    }

    #[test]
    fn cache_actions_parse() {
        for (token, action) in [
            ("list", CacheAction::List),
            ("path", CacheAction::Path),
            ("clear", CacheAction::Clear),
        ] {
            let parsed = parse(&["specdeck", "cache", token]);
            assert_eq!(parsed.command, CliCommand::Cache(action));
        }
    }

    #[test]
    fn cache_rejects_unknown_sub_action() {
        let registry = Registry::new().expect("registry");
        let raw = argv(&["specdeck", "cache", "prune"]);
        let matches = registry.try_match(&raw).expect("clap parse");
        let (_, sub_matches) = matches.subcommand().expect("subcommand");
        let err = from_matches(&registry, CommandName::Cache, sub_matches, &raw)
            .expect_err("unknown sub-action");
        assert!(err.message.contains("cache prune"));
        assert!(err.show_help);
    }

    #[test]
    fn cache_requires_a_sub_action() {
        let registry = Registry::new().expect("registry");
        let raw = argv(&["specdeck", "cache"]);
        let matches = registry.try_match(&raw).expect("clap parse");
        let (_, sub_matches) = matches.subcommand().expect("subcommand");
        let err = from_matches(&registry, CommandName::Cache, sub_matches, &raw)
            .expect_err("missing sub-action");
        assert!(err.message.contains("list"));
        assert!(err.message.contains("clear"));
    }

    #[test]
    fn space_separated_spec_values_are_reconciled() {
        let parsed = parse(&["specdeck", "run", "--spec", "a.js", "b.js", "c.js"]);
        let CliCommand::Run(opts) = parsed.command else {
            panic!("expected run");
        };
        assert_eq!(opts.spec.as_deref(), Some("a.js,b.js,c.js"));
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn comma_separated_spec_emits_no_warning() {
        let parsed = parse(&["specdeck", "run", "--spec", "a.js,b.js"]);
        let CliCommand::Run(opts) = parsed.command else {
            panic!("expected run");
        };
        assert_eq!(opts.spec.as_deref(), Some("a.js,b.js"));
        assert!(parsed.warnings.is_empty());
    }
}
