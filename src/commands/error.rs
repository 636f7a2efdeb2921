//! Top-level run errors.

use std::process::ExitStatus;

use crate::filter::{ConfigError, FilterStats};
use crate::output::SinkError;
use crate::process::SpawnError;

/// Exit status for a configuration error.
pub const EXIT_CONFIG_ERROR: u8 = 2;

/// Exit status for every other fatal error.
pub const EXIT_FAILURE: u8 = 1;

/// A failure that ends the run.
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    /// Bad filter rule given on the command line.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The child could not be started.
    #[error(transparent)]
    Spawn(#[from] SpawnError),
    /// Console or log output failed.
    #[error(transparent)]
    Sink(#[from] SinkError),
    /// The child's output pipes were not available.
    #[error("Child output pipes not available")]
    NoPipes,
    /// Waiting for the child failed.
    #[error("Failed to wait for child process: {0}")]
    Wait(#[source] std::io::Error),
}

impl RunError {
    /// Process exit status for this error.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => EXIT_CONFIG_ERROR,
            _ => EXIT_FAILURE,
        }
    }
}

/// What a finished run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub stats: FilterStats,
    pub exit_code: u8,
}

/// Map a child's exit status to ours. Death by signal counts as failure.
#[must_use]
pub fn exit_code_of(status: ExitStatus) -> u8 {
    status
        .code()
        .map_or(EXIT_FAILURE, |code| u8::try_from(code).unwrap_or(EXIT_FAILURE))
}
