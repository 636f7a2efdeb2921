//! Keep/drop decisions and rewriting of kept lines.

use regex::Regex;

use super::{ConfigError, Line, SubstitutionChain};

/// Kind of ignore rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreKind {
    /// The whole line must equal the rule.
    Line,
    /// The line must contain the rule.
    Substring,
    /// The line must match the rule as a regex.
    Regex,
}

/// Which class of rule dropped a line.
pub type DropReason = IgnoreKind;

/// Ignore rules, checked exact first, then substring, then regex.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRuleSet {
    lines: Vec<String>,
    substrings: Vec<String>,
    patterns: Vec<Regex>,
}

impl IgnoreRuleSet {
    /// Create an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add exact-match rules.
    pub fn add_lines<S: AsRef<str>>(&mut self, lines: &[S]) {
        self.lines.extend(lines.iter().map(|s| s.as_ref().to_string()));
    }

    /// Add substring rules.
    pub fn add_substrings<S: AsRef<str>>(&mut self, substrings: &[S]) {
        self.substrings
            .extend(substrings.iter().map(|s| s.as_ref().to_string()));
    }

    /// Compile and add regex rules.
    ///
    /// Nothing is added unless every pattern compiles.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPattern` for the first bad pattern.
    pub fn add_patterns<S: AsRef<str>>(&mut self, patterns: &[S]) -> Result<(), ConfigError> {
        let compiled = patterns
            .iter()
            .map(|p| {
                let pattern = p.as_ref();
                Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.patterns.extend(compiled);
        Ok(())
    }

    /// Find the first rule class that matches `text`.
    #[must_use]
    pub fn check(&self, text: &str) -> Option<DropReason> {
        if self.lines.iter().any(|l| l == text) {
            return Some(IgnoreKind::Line);
        }
        if self.substrings.iter().any(|s| text.contains(s.as_str())) {
            return Some(IgnoreKind::Substring);
        }
        if self.patterns.iter().any(|re| re.is_match(text)) {
            return Some(IgnoreKind::Regex);
        }
        None
    }

    /// Exact-match rules in registration order.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Substring rules in registration order.
    #[must_use]
    pub fn substrings(&self) -> &[String] {
        &self.substrings
    }

    /// Regex rules in registration order.
    #[must_use]
    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    /// Total number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len() + self.substrings.len() + self.patterns.len()
    }

    /// Whether no rules are installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of `FilterEngine::decide`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Drop(DropReason),
}

/// Line counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub total: u64,
    pub suppressed: u64,
}

impl FilterStats {
    /// Lines that were let through.
    #[must_use]
    pub fn emitted(&self) -> u64 {
        self.total - self.suppressed
    }
}

/// Ignore rules, substitution chain and counters.
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    ignore: IgnoreRuleSet,
    substitutions: SubstitutionChain,
    stats: FilterStats,
}

impl FilterEngine {
    /// Create an engine with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether `line` is kept, counting it.
    pub fn decide(&mut self, line: &Line) -> Decision {
        self.stats.total += 1;
        match self.ignore.check(line.text()) {
            Some(reason) => {
                self.stats.suppressed += 1;
                Decision::Drop(reason)
            }
            None => Decision::Keep,
        }
    }

    /// Rewrite a kept line through the substitution chain.
    #[must_use]
    pub fn transform(&self, line: &Line) -> Line {
        if self.substitutions.is_empty() {
            return line.clone();
        }
        line.with_text(self.substitutions.apply(line.text()))
    }

    /// Decide and, if kept, transform. Returns the line to emit.
    pub fn process(&mut self, line: &Line) -> Option<Line> {
        match self.decide(line) {
            Decision::Keep => Some(self.transform(line)),
            Decision::Drop(reason) => {
                tracing::trace!(?reason, line = line.text(), "Suppressed line");
                None
            }
        }
    }

    /// Install exact-match ignore rules.
    pub fn import_ignore_lines<S: AsRef<str>>(&mut self, lines: &[S]) {
        self.ignore.add_lines(lines);
    }

    /// Install substring ignore rules.
    pub fn import_ignore_substrings<S: AsRef<str>>(&mut self, substrings: &[S]) {
        self.ignore.add_substrings(substrings);
    }

    /// Install regex ignore rules as one batch.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPattern`; no rule of the batch is installed.
    pub fn import_ignore_patterns<S: AsRef<str>>(
        &mut self,
        patterns: &[S],
    ) -> Result<(), ConfigError> {
        self.ignore.add_patterns(patterns)
    }

    /// Install substitution rules as one batch.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError`; no rule of the batch is installed.
    pub fn import_snippets<S: AsRef<str>>(&mut self, expressions: &[S]) -> Result<(), ConfigError> {
        self.substitutions.import(expressions)
    }

    /// Install a single rule of the given kind.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the rule does not compile.
    pub fn install(&mut self, kind: RuleKind, argument: &str) -> Result<(), ConfigError> {
        match kind {
            RuleKind::IgnoreLine => self.import_ignore_lines(&[argument]),
            RuleKind::IgnoreSubstring => self.import_ignore_substrings(&[argument]),
            RuleKind::IgnoreRegex => self.import_ignore_patterns(&[argument])?,
            RuleKind::Snippet => self.import_snippets(&[argument])?,
        }
        tracing::debug!(?kind, rule = argument, "Installed filter rule");
        Ok(())
    }

    /// Current ignore rules.
    #[must_use]
    pub fn ignore_rules(&self) -> &IgnoreRuleSet {
        &self.ignore
    }

    /// Current substitution chain.
    #[must_use]
    pub fn substitutions(&self) -> &SubstitutionChain {
        &self.substitutions
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> FilterStats {
        self.stats
    }
}

/// Kind of rule an operator can install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    IgnoreLine,
    IgnoreSubstring,
    IgnoreRegex,
    Snippet,
}
