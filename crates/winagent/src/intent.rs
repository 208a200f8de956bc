//! Intent selection for free-text commands
//!
//! Text is split on whitespace and matched by token presence against a
//! keyword table, first rule wins. Keywords are compared lower-cased;
//! arguments (path, key, raw command) keep the caller's casing.

use crate::licensing::looks_like_key;

const SEARCH_WORDS: &[&str] = &["procurar", "buscar", "search"];
const MAK_WORDS: &[&str] = &["mak"];
const STATUS_WORDS: &[&str] = &["status"];
const ACTIVATE_WORDS: &[&str] = &["ativar", "activate"];
const WINDOWS_WORDS: &[&str] = &["windows"];
const EXECUTE_WORDS: &[&str] = &["executar", "execute"];

/// Prepositions and nouns dropped from a search path ("procurar mak na pasta C:\keys")
const PATH_STOPWORDS: &[&str] = &[
    "em", "no", "na", "pasta", "diretório", "in", "on", "at", "folder", "directory",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntentKind {
    SearchKeys,
    Status,
    Activate,
    Execute,
}

/// One row of the keyword table: every group must be present, any synonym per group
struct Rule {
    kind: IntentKind,
    groups: &'static [&'static [&'static str]],
}

const RULES: &[Rule] = &[
    Rule {
        kind: IntentKind::SearchKeys,
        groups: &[SEARCH_WORDS, MAK_WORDS],
    },
    Rule {
        kind: IntentKind::Status,
        groups: &[STATUS_WORDS],
    },
    Rule {
        kind: IntentKind::Activate,
        groups: &[ACTIVATE_WORDS, WINDOWS_WORDS],
    },
    Rule {
        kind: IntentKind::Execute,
        groups: &[EXECUTE_WORDS],
    },
];

/// What the caller asked for, with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Search for MAK keys, optionally in a file or directory
    SearchKeys { path: Option<String> },
    /// System information and activation state
    Status,
    /// Activate with the first key-shaped token, if any
    Activate { key: Option<String> },
    /// Run the text after the execute keyword, if any
    Execute { command: Option<String> },
    Unrecognized,
}

struct Tokens<'a> {
    original: Vec<&'a str>,
    lower: Vec<String>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        let original: Vec<&str> = text.split_whitespace().collect();
        let lower = original.iter().map(|t| t.to_lowercase()).collect();
        Self { original, lower }
    }

    fn has_any(&self, words: &[&str]) -> bool {
        self.lower.iter().any(|t| words.contains(&t.as_str()))
    }

    fn position(&self, words: &[&str]) -> Option<usize> {
        self.lower.iter().position(|t| words.contains(&t.as_str()))
    }

    /// Original-case tokens after the first occurrence of any of `words`
    fn after(&self, words: &[&str]) -> Vec<(&str, &str)> {
        let start = self.position(words).map_or(self.lower.len(), |i| i + 1);
        self.original[start..]
            .iter()
            .copied()
            .zip(self.lower[start..].iter().map(String::as_str))
            .collect()
    }
}

fn non_empty(joined: String) -> Option<String> {
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// Select the intent of a free-text command
pub fn parse(text: &str) -> Intent {
    let tokens = Tokens::new(text);

    let kind = RULES
        .iter()
        .find(|rule| rule.groups.iter().all(|group| tokens.has_any(group)))
        .map(|rule| rule.kind);

    match kind {
        Some(IntentKind::SearchKeys) => {
            let path: Vec<&str> = tokens
                .after(MAK_WORDS)
                .into_iter()
                .filter(|(_, lower)| !PATH_STOPWORDS.contains(lower))
                .map(|(original, _)| original)
                .collect();
            Intent::SearchKeys {
                path: non_empty(path.join(" ")),
            }
        }
        Some(IntentKind::Status) => Intent::Status,
        Some(IntentKind::Activate) => Intent::Activate {
            key: tokens
                .original
                .iter()
                .find(|t| looks_like_key(t))
                .map(|t| t.to_string()),
        },
        Some(IntentKind::Execute) => {
            let command: Vec<&str> = tokens
                .after(EXECUTE_WORDS)
                .into_iter()
                .map(|(original, _)| original)
                .collect();
            Intent::Execute {
                command: non_empty(command.join(" ")),
            }
        }
        None => Intent::Unrecognized,
    }
}
