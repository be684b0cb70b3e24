//! Multi-Value Reconciler.
//!
//! `specdeck run --spec a.js b.js` assigns only `a.js` to `--spec`; the base
//! parser files `b.js` away as a stray positional that would otherwise be
//! silently discarded. This pass recovers the user's intent: for each flag
//! the schema declares `Multi`, tokens that follow its value and were
//! captured as strays are folded back into one comma-joined value, with a
//! warning recommending the documented comma syntax.
//!
//! Stray tokens are consumed from a shared pool, at most once each, and
//! flags are processed left-to-right by their first occurrence in the token
//! stream. That makes assignment deterministic when two multi flags have
//! overlapping windows, and makes the whole pass idempotent: once no strays
//! remain, re-running it changes nothing.

use super::schema::{CommandSchema, OptionSpec};
use super::{COMMAND_POSITION, ParsedOptions};

/// Rewrite multi-value entries of `parsed` in place. Returns the warnings to
/// surface to the user, one per rewritten flag.
pub fn reconcile(schema: &CommandSchema, raw: &[String], parsed: &mut ParsedOptions) -> Vec<String> {
    if parsed.strays().is_empty() {
        return Vec::new();
    }

    // Multi flags ordered by first occurrence of either alias.
    let mut present: Vec<(usize, &OptionSpec)> = schema
        .multi_options()
        .filter(|spec| parsed.text(spec.key).is_some())
        .filter_map(|spec| first_occurrence(spec, raw).map(|index| (index, spec)))
        .collect();
    present.sort_by_key(|(index, _)| *index);

    let mut warnings = Vec::new();
    for (index, spec) in present {
        let recovered = recover(raw, index, parsed);
        if recovered.is_empty() {
            continue;
        }

        let Some(current) = parsed.text(spec.key) else {
            continue;
        };
        let joined = format!("{current},{}", recovered.join(","));
        warnings.push(format!(
            "warning: it looks like you passed --{key} a space-separated list of values. \
             Separate multiple values with commas instead: --{key} {joined}",
            key = spec.key,
        ));
        parsed.set_text(spec.key, joined);
    }

    warnings
}

fn first_occurrence(spec: &OptionSpec, raw: &[String]) -> Option<usize> {
    let long = format!("--{}", spec.key);
    let short = spec.short.map(|c| format!("-{c}"));
    raw.iter()
        .enumerate()
        .skip(COMMAND_POSITION)
        .find(|(_, token)| *token == &long || short.as_deref() == Some(token.as_str()))
        .map(|(index, _)| index)
}

/// Walk the window starting two positions past the flag token (past its
/// captured value) up to the next `--`-prefixed token or the end of the
/// stream, taking each token that is still available in the stray pool.
fn recover(raw: &[String], flag_index: usize, parsed: &mut ParsedOptions) -> Vec<String> {
    let mut recovered = Vec::new();
    for token in raw.iter().skip(flag_index + 2) {
        if token.starts_with("--") {
            break;
        }
        if parsed.consume_stray(token) {
            recovered.push(token.clone());
        }
    }
    recovered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::schema::{Registry, SCHEMAS};
    use crate::cli::CommandName;

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| (*t).to_string()).collect()
    }

    fn run_schema() -> &'static CommandSchema {
        &SCHEMAS[CommandName::Run as usize]
    }

    fn parse_run(raw: &[String]) -> ParsedOptions {
        let registry = Registry::new().expect("registry");
        let matches = registry.try_match(raw).expect("clap parse");
        let (_, sub) = matches.subcommand().expect("subcommand");
        ParsedOptions::from_matches(run_schema(), sub)
    }

    #[test]
    fn splits_across_spaces_are_rejoined_with_one_warning() {
        let raw = argv(&["specdeck", "run", "--spec", "a.js", "b.js", "c.js"]);
        let mut parsed = parse_run(&raw);
        let warnings = reconcile(run_schema(), &raw, &mut parsed);
        assert_eq!(parsed.text("spec"), Some("a.js,b.js,c.js"));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("--spec"));
        assert!(warnings[0].contains("commas"));
    }

    #[test]
    fn comma_joined_value_is_left_untouched() {
        let raw = argv(&["specdeck", "run", "--spec", "a.js,b.js"]);
        let mut parsed = parse_run(&raw);
        let warnings = reconcile(run_schema(), &raw, &mut parsed);
        assert_eq!(parsed.text("spec"), Some("a.js,b.js"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn reconciliation_is_idempotent() {
        let raw = argv(&["specdeck", "run", "--spec", "a.js", "b.js"]);
        let mut parsed = parse_run(&raw);
        reconcile(run_schema(), &raw, &mut parsed);
        assert_eq!(parsed.text("spec"), Some("a.js,b.js"));

        // A second pass over the rewritten options sees no strays to absorb.
        let warnings = reconcile(run_schema(), &raw, &mut parsed);
        assert_eq!(parsed.text("spec"), Some("a.js,b.js"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn window_stops_at_the_next_long_flag() {
        let raw = argv(&[
            "specdeck", "run", "--spec", "a.js", "b.js", "--reporter", "dot",
        ]);
        let mut parsed = parse_run(&raw);
        let warnings = reconcile(run_schema(), &raw, &mut parsed);
        assert_eq!(parsed.text("spec"), Some("a.js,b.js"));
        assert_eq!(parsed.text("reporter"), Some("dot"));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn tokens_owned_by_a_later_flag_are_not_recaptured() {
        // "smoke" belongs to --tag; the spec window must not absorb it even
        // though it sits inside the forward scan range.
        let raw = argv(&[
            "specdeck", "run", "--spec", "a.js", "b.js", "--tag", "smoke",
        ]);
        let mut parsed = parse_run(&raw);
        let warnings = reconcile(run_schema(), &raw, &mut parsed);
        assert_eq!(parsed.text("spec"), Some("a.js,b.js"));
        assert_eq!(parsed.text("tag"), Some("smoke"));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn overlapping_windows_assign_left_to_right() {
        let raw = argv(&[
            "specdeck", "run", "--spec", "a.js", "b.js", "--tag", "smoke", "nightly",
        ]);
        let mut parsed = parse_run(&raw);
        let warnings = reconcile(run_schema(), &raw, &mut parsed);
        assert_eq!(parsed.text("spec"), Some("a.js,b.js"));
        assert_eq!(parsed.text("tag"), Some("smoke,nightly"));
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn short_alias_occurrence_is_found() {
        let raw = argv(&["specdeck", "run", "-s", "a.js", "b.js"]);
        let mut parsed = parse_run(&raw);
        let warnings = reconcile(run_schema(), &raw, &mut parsed);
        assert_eq!(parsed.text("spec"), Some("a.js,b.js"));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn flags_without_strays_do_nothing() {
        let raw = argv(&["specdeck", "run", "--spec", "a.js"]);
        let mut parsed = parse_run(&raw);
        let warnings = reconcile(run_schema(), &raw, &mut parsed);
        assert_eq!(parsed.text("spec"), Some("a.js"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn duplicate_stray_values_are_consumed_once_each() {
        let raw = argv(&["specdeck", "run", "--spec", "a.js", "b.js", "b.js"]);
        let mut parsed = parse_run(&raw);
        let warnings = reconcile(run_schema(), &raw, &mut parsed);
        assert_eq!(parsed.text("spec"), Some("a.js,b.js,b.js"));
        assert_eq!(warnings.len(), 1);
    }
}
