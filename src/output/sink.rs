//! Line sinks.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Local;

use super::resolve_log_path;
use crate::filter::Line;
use crate::process::StreamKind;

/// Failure writing a kept line.
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    /// Writing to our own stdout/stderr failed.
    #[error("Failed to write to console: {0}")]
    Console(#[source] io::Error),
    /// Writing to the log file failed.
    #[error("Failed to write log file {path}: {source}")]
    Log {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Receives every line that survived filtering.
pub trait LineSink {
    /// Write one kept line that originated on `stream`.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if the line could not be written.
    fn emit(&mut self, stream: StreamKind, line: &Line) -> Result<(), SinkError>;
}

/// An open log file.
#[derive(Debug)]
pub struct LogFile {
    path: PathBuf,
    file: File,
}

impl LogFile {
    /// Create (or truncate) the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `SinkError::Log` if the file cannot be created.
    pub fn create(path: PathBuf) -> Result<Self, SinkError> {
        match File::create(&path) {
            Ok(file) => {
                tracing::info!(path = %path.display(), "Logging output");
                Ok(Self { path, file })
            }
            Err(source) => Err(SinkError::Log { path, source }),
        }
    }

    /// Path of the log file.
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn write_line(&mut self, line: &Line) -> Result<(), SinkError> {
        self.file
            .write_all(line.to_output().as_bytes())
            .map_err(|source| SinkError::Log {
                path: self.path.clone(),
                source,
            })
    }
}

/// Writes kept lines to the matching console stream and, optionally, a log.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    log: Option<LogFile>,
}

impl ConsoleSink {
    /// Console sink that also tees into `log`.
    #[must_use]
    pub fn with_log(log: Option<LogFile>) -> Self {
        Self { log }
    }

    /// Build the sink for a run, creating the log file named by `--log`.
    ///
    /// `program` is the child executable, or `None` in pipe mode.
    ///
    /// # Errors
    ///
    /// Returns `SinkError::Log` if the log file cannot be created.
    pub fn open(requested_log: Option<&str>, program: Option<&str>) -> Result<Self, SinkError> {
        let log = requested_log
            .filter(|requested| !requested.is_empty())
            .map(|requested| LogFile::create(resolve_log_path(requested, program, &Local::now())))
            .transpose()?;
        Ok(Self::with_log(log))
    }

    /// Path of the log file, if logging.
    #[must_use]
    pub fn log_path(&self) -> Option<&PathBuf> {
        self.log.as_ref().map(LogFile::path)
    }
}

impl LineSink for ConsoleSink {
    fn emit(&mut self, stream: StreamKind, line: &Line) -> Result<(), SinkError> {
        let text = line.to_output();
        let written = match stream {
            StreamKind::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(text.as_bytes()).and_then(|()| out.flush())
            }
            StreamKind::Stderr => {
                let mut err = io::stderr().lock();
                err.write_all(text.as_bytes()).and_then(|()| err.flush())
            }
        };
        written.map_err(SinkError::Console)?;

        if let Some(log) = self.log.as_mut() {
            log.write_line(line)?;
        }
        Ok(())
    }
}
