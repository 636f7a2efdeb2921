//! Interactive command grammar.

use crate::filter::RuleKind;

/// Words the prompt can complete.
pub const VOCABULARY: [&str; 8] = [
    "ignore-line",
    "ignore-re",
    "ignore-substring",
    "snippet",
    "pats",
    "quit",
    "stats",
    "help",
];

/// A parsed line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Pats,
    Help,
    Stats,
    /// `<rule-command> <argument>`.
    Install { kind: RuleKind, argument: String },
    /// A bare word that is not a built-in.
    UnknownBuiltin(String),
    /// `<word> <argument>` where the word is not a rule command.
    UnknownCommand(String),
}

impl Command {
    /// Parse one non-empty input line.
    ///
    /// `_` and `-` are interchangeable in command names.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let input = input.trim_start();
        if let Some((name, rest)) = input.split_once(char::is_whitespace) {
            let argument = rest.trim_start();
            if !argument.is_empty() {
                let name = normalize(name);
                return match rule_kind(&name) {
                    Some(kind) => Self::Install {
                        kind,
                        argument: argument.to_string(),
                    },
                    None => Self::UnknownCommand(name),
                };
            }
        }

        let word = normalize(input.trim_end());
        match word.as_str() {
            "quit" => Self::Quit,
            "pats" => Self::Pats,
            "help" => Self::Help,
            "stats" => Self::Stats,
            _ => Self::UnknownBuiltin(word),
        }
    }
}

fn normalize(name: &str) -> String {
    name.replace('_', "-")
}

fn rule_kind(name: &str) -> Option<RuleKind> {
    match name {
        "ignore-re" => Some(RuleKind::IgnoreRegex),
        "ignore-line" => Some(RuleKind::IgnoreLine),
        "ignore-substring" => Some(RuleKind::IgnoreSubstring),
        "snippet" => Some(RuleKind::Snippet),
        _ => None,
    }
}

/// Vocabulary words starting with `prefix`.
#[must_use]
pub fn complete(prefix: &str) -> Vec<&'static str> {
    let prefix = normalize(prefix.trim_start());
    VOCABULARY
        .iter()
        .copied()
        .filter(|word| word.starts_with(prefix.as_str()))
        .collect()
}
