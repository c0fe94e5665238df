//! Input parser: splits an argument vector into command, options, and
//! arguments.
//!
//! Input shape: `{command words} {option[:value]}... {--argument[:value]}...`
//!
//! The command may span several words (`list packages`), so the parser needs
//! the set of available command names to know where the command ends.

use std::collections::HashSet;

use conapp_types::error::{ConappError, InputSection, Result};

/// Prefix that marks an argument token.
pub const ARGUMENT_PREFIX: &str = "--";
/// Separates a key from its value.
pub const KEY_VALUE_DELIMITER: char = ':';
const QUOTE: char = '"';
/// Stands in for a delimiter inside quotes while the token is split.
/// Tokens that already contain it are rejected.
const ESCAPED_DELIMITER: char = '\u{E03A}';

/// Insertion-ordered string map with ASCII case-insensitive keys.
///
/// The first value inserted for a key is kept; later inserts of the same key
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValues {
    entries: Vec<(String, String)>,
}

impl KeyValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the key is already present. Returns whether the value
    /// was stored.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.contains_key(&key) {
            return false;
        }
        self.entries.push((key, value.into()));
        true
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entry(key).map(|(_, v)| v)
    }

    /// The stored key (as supplied) and its value.
    pub fn entry(&self, key: &str) -> Option<(&str, &str)> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// A tokenized request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedInput {
    pub command: String,
    pub options: KeyValues,
    pub arguments: KeyValues,
}

impl ParsedInput {
    pub fn option_keys(&self) -> Vec<&str> {
        self.options.keys().collect()
    }

    pub fn argument_keys(&self) -> Vec<&str> {
        self.arguments.keys().collect()
    }
}

/// Parse an argument vector (program name excluded).
///
/// Tokens are joined with single spaces until the joined text equals one of
/// `available_commands`; the first such match is the command. Remaining
/// tokens are options until the first `--` token, and arguments after it.
pub fn parse<S: AsRef<str>>(
    args: &[S],
    available_commands: &HashSet<String>,
) -> Result<ParsedInput> {
    let mut tokens = args.iter().map(AsRef::<str>::as_ref);

    let mut candidate = String::new();
    let command = loop {
        let Some(token) = tokens.next() else {
            return Err(ConappError::CommandNotFound(candidate));
        };
        if !candidate.trim().is_empty() {
            candidate.push(' ');
        }
        candidate.push_str(token);
        if available_commands.contains(&candidate) {
            break candidate;
        }
    };
    log::trace!("input command resolved to `{command}`");

    let mut parsed = ParsedInput {
        command,
        ..ParsedInput::default()
    };
    let mut first_argument_reached = false;

    for token in tokens {
        let (key, value) = split_token(token)?;

        if let Some(key) = key.strip_prefix(ARGUMENT_PREFIX) {
            first_argument_reached = true;
            insert(&mut parsed.arguments, InputSection::Argument, unescape(key), value);
            continue;
        }

        if first_argument_reached {
            return Err(ConappError::MalformedToken {
                token: token.to_string(),
                reason: "options must come before the first `--` argument".to_string(),
            });
        }
        insert(&mut parsed.options, InputSection::Option, unescape(&key), value);
    }

    Ok(parsed)
}

/// Split a token into its still-escaped key and its unescaped value.
fn split_token(token: &str) -> Result<(String, String)> {
    if token.contains(ESCAPED_DELIMITER) {
        return Err(ConappError::MalformedToken {
            token: token.to_string(),
            reason: format!("contains the reserved character U+{:04X}", ESCAPED_DELIMITER as u32),
        });
    }
    let escaped = escape_quoted_delimiters(token);
    match escaped.split_once(KEY_VALUE_DELIMITER) {
        Some((_, value)) if value.contains(KEY_VALUE_DELIMITER) => Err(ConappError::MalformedToken {
            token: token.to_string(),
            reason: "more than one `:` outside double quotes".to_string(),
        }),
        Some((key, value)) => Ok((key.to_string(), unescape(value))),
        None => Ok((escaped, String::new())),
    }
}

/// Replace delimiters inside double quotes with [`ESCAPED_DELIMITER`].
///
/// Scans from the end of the token, so with unbalanced quotes the quote
/// closest to the end opens the quoted region.
fn escape_quoted_delimiters(token: &str) -> String {
    let mut in_quotes = false;
    let mut escaped: Vec<char> = token
        .chars()
        .rev()
        .map(|ch| {
            if ch == QUOTE {
                in_quotes = !in_quotes;
                ch
            } else if in_quotes && ch == KEY_VALUE_DELIMITER {
                ESCAPED_DELIMITER
            } else {
                ch
            }
        })
        .collect();
    escaped.reverse();
    escaped.into_iter().collect()
}

/// Restore escaped delimiters and drop quote characters.
fn unescape(raw: &str) -> String {
    raw.chars()
        .filter(|&ch| ch != QUOTE)
        .map(|ch| {
            if ch == ESCAPED_DELIMITER {
                KEY_VALUE_DELIMITER
            } else {
                ch
            }
        })
        .collect()
}

fn insert(map: &mut KeyValues, section: InputSection, key: String, value: String) {
    if map.contains_key(&key) {
        log::warn!("{section} `{key}` given more than once; keeping the first value");
        return;
    }
    map.insert(key, value);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn available() -> HashSet<String> {
        ["version", "install", "update", "list packages"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn parse_ok(args: &[&str]) -> ParsedInput {
        parse(args, &available()).unwrap()
    }

    #[test]
    fn bare_command() {
        let parsed = parse_ok(&["version"]);
        assert_eq!(
            parsed,
            ParsedInput {
                command: "version".into(),
                options: KeyValues::new(),
                arguments: KeyValues::new(),
            }
        );
    }

    #[test]
    fn install_with_option_and_argument() {
        let parsed = parse_ok(&["install", "name:timer", "--version:1.0.0"]);
        assert_eq!(parsed.command, "install");
        assert_eq!(parsed.options, KeyValues::from_iter([("name", "timer")]));
        assert_eq!(parsed.arguments, KeyValues::from_iter([("version", "1.0.0")]));
    }

    #[test]
    fn multi_word_command_from_separate_tokens() {
        let parsed = parse_ok(&["list", "packages", "--filter:time"]);
        assert_eq!(parsed.command, "list packages");
        assert!(parsed.options.is_empty());
        assert_eq!(parsed.arguments.len(), 1);
        assert_eq!(parsed.arguments.get("filter"), Some("time"));
    }

    #[test]
    fn multi_word_command_from_single_token() {
        let parsed = parse_ok(&["list packages", "option1", "option2"]);
        assert_eq!(parsed.command, "list packages");
        assert_eq!(parsed.option_keys(), ["option1", "option2"]);
    }

    #[test]
    fn command_not_found() {
        let args = ["typocommand", "name:timer", "--version:1.0.0"];
        let err = parse(&args, &available()).unwrap_err();
        match err {
            ConappError::CommandNotFound(tried) => {
                assert_eq!(tried, "typocommand name:timer --version:1.0.0");
            },
            other => panic!("expected CommandNotFound, got {other:?}"),
        }
    }

    #[test]
    fn empty_args_is_command_not_found() {
        let args: [&str; 0] = [];
        assert!(matches!(
            parse(&args, &available()),
            Err(ConappError::CommandNotFound(ref c)) if c.is_empty()
        ));
    }

    #[test]
    fn option_without_value_is_empty() {
        let parsed = parse_ok(&["version", "pretty"]);
        assert_eq!(parsed.options.get("pretty"), Some(""));
    }

    #[test]
    fn options_keep_input_order() {
        let parsed = parse_ok(&[
            "version",
            "option1",
            "option2",
            "option3",
            "--argumentKey1:argumentValue1",
        ]);
        assert_eq!(parsed.option_keys(), ["option1", "option2", "option3"]);
        assert_eq!(parsed.arguments.get("argumentKey1"), Some("argumentValue1"));
    }

    #[test]
    fn arguments_with_and_without_values() {
        let parsed = parse_ok(&[
            "version",
            "option1",
            "--ArgumentKey1",
            "--ArgumentKey2:ArgumentValue2",
            "--ArgumentKey3",
        ]);
        let args: Vec<(&str, &str)> = parsed.arguments.iter().collect();
        assert_eq!(
            args,
            [("ArgumentKey1", ""), ("ArgumentKey2", "ArgumentValue2"), ("ArgumentKey3", "")]
        );
    }

    #[test]
    fn quoted_colon_is_preserved() {
        let parsed = parse_ok(&["version", "option1:\"value:1\""]);
        assert_eq!(parsed.options.get("option1"), Some("value:1"));
    }

    #[test]
    fn quoted_value_with_many_colons() {
        let parsed = parse_ok(&["update", "--duration:\"01:02:03\"", "--note:\"a:b:c:d\""]);
        assert_eq!(parsed.arguments.get("duration"), Some("01:02:03"));
        assert_eq!(parsed.arguments.get("note"), Some("a:b:c:d"));
    }

    #[test]
    fn unquoted_extra_colon_in_option_is_malformed() {
        let err = parse(&["version", "option1:value:1", "option2"], &available()).unwrap_err();
        assert!(matches!(
            err,
            ConappError::MalformedToken { ref token, .. } if token == "option1:value:1"
        ));
    }

    #[test]
    fn reserved_marker_character_is_rejected() {
        let token = format!("note:\"a{ESCAPED_DELIMITER}b\"");
        let err = parse(&["version", token.as_str()], &available()).unwrap_err();
        match err {
            ConappError::MalformedToken { token: bad, reason } => {
                assert_eq!(bad, token);
                assert!(reason.contains("U+E03A"));
            },
            other => panic!("expected MalformedToken, got {other:?}"),
        }
    }

    #[test]
    fn unquoted_extra_colon_in_argument_is_malformed() {
        let err = parse(
            &["version", "option1:value1", "--ArgumentKey1:Argument:Value1", "--ArgumentKey2"],
            &available(),
        )
        .unwrap_err();
        assert!(matches!(err, ConappError::MalformedToken { .. }));
    }

    #[test]
    fn option_after_argument_is_malformed() {
        let err = parse(&["install", "--version:1.0.0", "name:timer"], &available()).unwrap_err();
        match err {
            ConappError::MalformedToken { token, reason } => {
                assert_eq!(token, "name:timer");
                assert!(reason.contains("before the first"));
            },
            other => panic!("expected MalformedToken, got {other:?}"),
        }
    }

    #[test]
    fn repeated_key_keeps_first_value() {
        let parsed = parse_ok(&["install", "name:first", "NAME:second", "--x:1", "--x:2"]);
        assert_eq!(parsed.options.len(), 1);
        assert_eq!(parsed.options.get("name"), Some("first"));
        assert_eq!(parsed.arguments.get("x"), Some("1"));
    }

    #[test]
    fn shorter_command_shadows_longer_one() {
        let mut set = available();
        set.insert("list".into());
        let parsed = parse(&["list", "packages"], &set).unwrap();
        assert_eq!(parsed.command, "list");
        assert_eq!(parsed.option_keys(), ["packages"]);
    }

    #[test]
    fn command_match_is_case_sensitive() {
        assert!(matches!(
            parse(&["VERSION"], &available()),
            Err(ConappError::CommandNotFound(_))
        ));
    }

    #[test]
    fn escape_scans_from_the_end() {
        // The lone quote opens a region only towards the start of the token.
        assert_eq!(escape_quoted_delimiters("a:\"b"), "a\u{E03A}\"b");
        assert_eq!(escape_quoted_delimiters("a\"b:c"), "a\"b:c");
    }

    #[test]
    fn key_value_map_is_first_wins_and_case_insensitive() {
        let mut map = KeyValues::new();
        assert!(map.insert("Key", "1"));
        assert!(!map.insert("key", "2"));
        assert_eq!(map.get("KEY"), Some("1"));
        assert_eq!(map.entry("kEy"), Some(("Key", "1")));
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn quoted_values_survive_parsing(
                key in "[a-z]{1,8}",
                value in "[a-z0-9:]{0,16}",
            ) {
                let token = format!("{key}:\"{value}\"");
                let parsed = parse(&["version", token.as_str()], &available()).unwrap();
                prop_assert_eq!(parsed.options.get(&key), Some(value.as_str()));
            }

            #[test]
            fn options_and_arguments_keep_order(
                keys in proptest::collection::vec("[a-z]{1,6}", 0..8),
            ) {
                let mut unique: Vec<String> = Vec::new();
                for k in keys {
                    if !unique.contains(&k) {
                        unique.push(k);
                    }
                }
                let mut args = vec!["install".to_string()];
                args.extend(unique.iter().cloned());
                args.extend(unique.iter().map(|k| format!("--{k}:v")));
                let parsed = parse(&args, &available()).unwrap();
                let expected: Vec<&str> = unique.iter().map(String::as_str).collect();
                prop_assert_eq!(parsed.option_keys(), expected.clone());
                prop_assert_eq!(parsed.argument_keys(), expected);
            }

            #[test]
            fn never_consumes_past_the_command(
                extra in proptest::collection::vec("[a-z]{1,6}", 0..5),
            ) {
                let mut args = vec!["list".to_string(), "packages".to_string()];
                args.extend(extra.iter().cloned());
                let parsed = parse(&args, &available()).unwrap();
                prop_assert_eq!(parsed.command.as_str(), "list packages");
            }
        }
    }
}
