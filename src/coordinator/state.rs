//! Coordinator mode and the per-stream buffers used while interactive.

use std::collections::VecDeque;

use crate::filter::Line;
use crate::process::StreamKind;

/// Current coordinator mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Lines are filtered and emitted as they arrive.
    #[default]
    Passthrough,
    /// Lines are held until the session ends.
    Interactive,
}

/// FIFO queues of lines held back during an interactive session.
#[derive(Debug, Default)]
pub struct StreamBuffers {
    stdout: VecDeque<Line>,
    stderr: VecDeque<Line>,
}

impl StreamBuffers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a line behind earlier lines of the same stream.
    pub fn push(&mut self, stream: StreamKind, line: Line) {
        match stream {
            StreamKind::Stdout => self.stdout.push_back(line),
            StreamKind::Stderr => self.stderr.push_back(line),
        }
    }

    /// Empty both buffers: all of stdout first, then all of stderr.
    pub fn drain(&mut self) -> impl Iterator<Item = (StreamKind, Line)> + '_ {
        self.stdout
            .drain(..)
            .map(|line| (StreamKind::Stdout, line))
            .chain(self.stderr.drain(..).map(|line| (StreamKind::Stderr, line)))
    }

    /// Throw away everything held.
    pub fn clear(&mut self) {
        self.stdout.clear();
        self.stderr.clear();
    }

    /// Lines held for `stream`.
    #[must_use]
    pub fn pending(&self, stream: StreamKind) -> usize {
        match stream {
            StreamKind::Stdout => self.stdout.len(),
            StreamKind::Stderr => self.stderr.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }
}
