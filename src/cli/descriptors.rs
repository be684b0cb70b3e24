//! Option Descriptor Table: the single source of help text for every flag
//! the schema registry declares. Registry construction fails if a declared
//! option has no entry here.

/// Help text per option key, sorted by key.
const DESCRIPTORS: &[(&str, &str)] = &[
    (
        "browser",
        "run with a specific browser, by name or filesystem path",
    ),
    (
        "cache-action",
        "cache operation to perform: list, path, or clear",
    ),
    (
        "ci-build-id",
        "the unique identifier of a CI run, used to group machines for parallelization",
    ),
    (
        "config",
        "set configuration values; separate multiple values with commas",
    ),
    ("config-file", "path to a configuration file"),
    (
        "detached",
        "open in detached mode; pass false to keep the terminal attached",
    ),
    (
        "dev",
        "run in development mode, bypassing the installed binary check",
    ),
    (
        "env",
        "set environment variables; separate multiple values with commas",
    ),
    ("force", "reinstall the binary even when one is already installed"),
    (
        "global",
        "open in global mode, ignoring any project in the working directory",
    ),
    ("group", "a named group for recorded runs"),
    ("headed", "display the browser instead of running headlessly"),
    ("headless", "hide the browser instead of running headed"),
    ("key", "the record key for recorded runs"),
    (
        "parallel",
        "distribute spec files across multiple machines running in parallel",
    ),
    (
        "port",
        "override the port used to serve the application under test",
    ),
    ("project", "path to the project folder"),
    (
        "quiet",
        "suppress per-test output; only the run summary is printed",
    ),
    ("record", "record the run; pass false to force recording off"),
    ("reporter", "the reporter used to print test results"),
    (
        "reporter-options",
        "options passed through to the reporter; separate multiple values with commas",
    ),
    (
        "spec",
        "the spec files to run; separate multiple values with commas",
    ),
    (
        "tag",
        "tags to attach to the recorded run; separate multiple values with commas",
    ),
];

/// Look up the help text for an option key.
#[must_use]
pub fn describe(key: &str) -> Option<&'static str> {
    DESCRIPTORS
        .binary_search_by(|(k, _)| k.cmp(&key))
        .ok()
        .map(|i| DESCRIPTORS[i].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_keys_resolve() {
        assert!(describe("spec").is_some());
        assert!(describe("tag").is_some());
        assert!(describe("parallel").is_some());
    }

    #[test]
    fn unknown_key_is_none() {
        assert!(describe("no-such-option").is_none());
    }

    #[test]
    fn table_is_sorted_and_unique() {
        for pair in DESCRIPTORS.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} >= {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn help_text_is_never_empty() {
        for (key, text) in DESCRIPTORS {
            assert!(!text.is_empty(), "empty help text for {key}");
        }
    }
}
