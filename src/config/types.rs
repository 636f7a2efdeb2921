//! Configuration types.

use std::time::Duration;

use crate::filter::{ConfigError, FilterEngine};
use crate::process::DEFAULT_GRACE_PERIOD;

/// Filter rules given at startup, in the order they were given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    pub ignore_re: Vec<String>,
    pub ignore_line: Vec<String>,
    pub ignore_substring: Vec<String>,
    pub snippets: Vec<String>,
}

impl FilterConfig {
    /// Compile the rules into a fresh engine.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found in the regex or snippet rules.
    pub fn build_engine(&self) -> Result<FilterEngine, ConfigError> {
        let mut engine = FilterEngine::new();
        engine.import_ignore_patterns(&self.ignore_re)?;
        engine.import_ignore_lines(&self.ignore_line);
        engine.import_ignore_substrings(&self.ignore_substring);
        engine.import_snippets(&self.snippets)?;
        Ok(engine)
    }
}

/// Everything a run needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// `--log` value, before name resolution.
    pub log: Option<String>,
    /// Read our own stdin even if a command was given.
    pub pipe: bool,
    pub verbose: u8,
    pub filters: FilterConfig,
    /// Child program followed by its arguments.
    pub command: Vec<String>,
    /// Delay before SIGTERM is escalated to SIGKILL.
    pub grace_period: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            log: None,
            pipe: false,
            verbose: 0,
            filters: FilterConfig::default(),
            command: Vec::new(),
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }
}

impl RunConfig {
    /// Whether to filter our own stdin instead of spawning a child.
    #[must_use]
    pub fn is_pipe_mode(&self) -> bool {
        self.pipe || self.command.is_empty()
    }

    /// The child program, if any.
    #[must_use]
    pub fn program(&self) -> Option<&str> {
        if self.is_pipe_mode() {
            return None;
        }
        self.command.first().map(String::as_str)
    }
}
