//! Sed-style substitution rules.
//!
//! Expressions have the form `s<d>SEARCH<d>REPLACE<d>FLAGS`, where `<d>` is
//! whatever character follows the leading `s`. Inside SEARCH and REPLACE the
//! delimiter may appear escaped as `\<d>`. FLAGS is any combination of `g`
//! (replace every match) and `i` (case-insensitive).

use regex::Regex;

use super::ConfigError;

/// Shortest possible expression, e.g. `s///`.
const MIN_EXPRESSION_LEN: usize = 4;

/// A compiled substitution rule.
#[derive(Debug, Clone)]
pub struct Substitution {
    expression: String,
    search: Regex,
    replace: String,
    global: bool,
}

impl Substitution {
    /// Compile a substitution expression.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming `expression` if it is too short, does not
    /// follow the grammar, or its search pattern is not a valid regex.
    pub fn parse(expression: &str) -> Result<Self, ConfigError> {
        let malformed = |reason| ConfigError::Malformed {
            input: expression.to_string(),
            reason,
        };

        if expression.chars().count() < MIN_EXPRESSION_LEN {
            return Err(ConfigError::TooShort {
                input: expression.to_string(),
            });
        }

        let mut chars = expression.chars();
        if chars.next() != Some('s') {
            return Err(malformed("must start with 's'"));
        }
        let Some(delim) = chars.next() else {
            return Err(malformed("missing delimiter"));
        };
        if delim == '\\' {
            return Err(malformed("delimiter cannot be a backslash"));
        }

        let search_delim = regex::escape(&delim.to_string());
        let replace_delim = if delim == '$' {
            "$$".to_string()
        } else {
            delim.to_string()
        };

        let (search, rest) = split_field(chars.as_str(), delim, &search_delim)
            .ok_or_else(|| malformed("unterminated search pattern"))?;
        let (replace, flags) = split_field(rest, delim, &replace_delim)
            .ok_or_else(|| malformed("unterminated replacement"))?;

        let mut global = false;
        let mut case_insensitive = false;
        for flag in flags.chars() {
            match flag {
                'g' => global = true,
                'i' => case_insensitive = true,
                _ => return Err(malformed("flags may only contain 'g' and 'i'")),
            }
        }

        let pattern = if case_insensitive {
            format!("(?i){search}")
        } else {
            search
        };
        let search = Regex::new(&pattern).map_err(|source| ConfigError::InvalidSearch {
            input: expression.to_string(),
            source,
        })?;

        Ok(Self {
            expression: expression.to_string(),
            search,
            replace,
            global,
        })
    }

    /// Apply the rule to `text`.
    ///
    /// `$1`, `$2`, ... in the replacement refer to groups of the current match.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        if self.global {
            self.search.replace_all(text, self.replace.as_str()).into_owned()
        } else {
            self.search.replace(text, self.replace.as_str()).into_owned()
        }
    }

    /// The expression this rule was compiled from.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The compiled search pattern.
    #[must_use]
    pub fn search(&self) -> &Regex {
        &self.search
    }

    /// The unexpanded replacement template.
    #[must_use]
    pub fn replacement(&self) -> &str {
        &self.replace
    }

    /// Whether every match is replaced.
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.global
    }
}

/// Read up to the next unescaped `delim`, returning the field and the remainder.
///
/// Escaped delimiters are written out as `literal_delim`; any other escape is
/// kept verbatim.
fn split_field<'a>(input: &'a str, delim: char, literal_delim: &str) -> Option<(String, &'a str)> {
    let mut field = String::new();
    let mut chars = input.char_indices();

    while let Some((idx, c)) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some((_, next)) if next == delim => field.push_str(literal_delim),
                Some((_, next)) => {
                    field.push('\\');
                    field.push(next);
                }
                None => field.push('\\'),
            }
        } else if c == delim {
            return Some((field, &input[idx + c.len_utf8()..]));
        } else {
            field.push(c);
        }
    }

    None
}

/// Ordered substitutions applied to every kept line.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionChain {
    rules: Vec<Substitution>,
}

impl SubstitutionChain {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Compile a batch of expressions and append them.
    ///
    /// Nothing is appended unless every expression compiles.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` in the batch.
    pub fn import<S: AsRef<str>>(&mut self, expressions: &[S]) -> Result<(), ConfigError> {
        let compiled = expressions
            .iter()
            .map(|expr| Substitution::parse(expr.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        self.rules.extend(compiled);
        Ok(())
    }

    /// Run every rule, in registration order, over `text`.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |current, rule| rule.apply(&current))
    }

    /// Number of installed rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Installed rules in registration order.
    #[must_use]
    pub fn rules(&self) -> &[Substitution] {
        &self.rules
    }
}
