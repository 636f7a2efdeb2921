//! The coordinator loop.
//!
//! One task owns the filter engine and both buffers. Readers, the keypress
//! watcher and the interactive session only talk to it through channels, so
//! rule changes are always applied here, between lines.

use tokio::sync::mpsc::Receiver;

use crate::display;
use crate::filter::{FilterEngine, FilterStats, Line};
use crate::output::{LineSink, SinkError};
use crate::process::StreamKind;

use super::{Disposition, Event, Mode, SessionCommand, SessionOutcome, StreamBuffers};

/// What the loop driver must do after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Keep waiting for events.
    Continue,
    /// Start an interactive session.
    StartSession,
    /// Session is over; watch for the next keypress.
    Rearm,
    /// Stop with this disposition.
    Finish(Disposition),
}

/// The operator-facing side of the coordinator.
pub trait Console {
    /// Begin an interactive session. It must eventually send
    /// `Event::SessionEnded` on the coordinator's event channel.
    fn start_session(&mut self);

    /// Let the keypress watcher report the next keypress.
    fn rearm(&mut self);
}

/// Filters the child's output and handles mode switches.
#[derive(Debug)]
pub struct Coordinator<S> {
    engine: FilterEngine,
    sink: S,
    mode: Mode,
    buffers: StreamBuffers,
    stdout_open: bool,
    stderr_open: bool,
}

impl<S: LineSink> Coordinator<S> {
    /// Create a coordinator in passthrough mode with both streams open.
    #[must_use]
    pub fn new(engine: FilterEngine, sink: S) -> Self {
        Self {
            engine,
            sink,
            mode: Mode::Passthrough,
            buffers: StreamBuffers::new(),
            stdout_open: true,
            stderr_open: true,
        }
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Line counters so far.
    #[must_use]
    pub fn stats(&self) -> FilterStats {
        self.engine.stats()
    }

    /// The filter engine.
    #[must_use]
    pub fn engine(&self) -> &FilterEngine {
        &self.engine
    }

    /// The sink kept lines are written to.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Lines currently held for `stream`.
    #[must_use]
    pub fn pending(&self, stream: StreamKind) -> usize {
        self.buffers.pending(stream)
    }

    /// Whether `stream` has not reported end of stream yet.
    #[must_use]
    pub fn is_open(&self, stream: StreamKind) -> bool {
        match stream {
            StreamKind::Stdout => self.stdout_open,
            StreamKind::Stderr => self.stderr_open,
        }
    }

    fn transition(&mut self, mode: Mode) {
        tracing::debug!(from = ?self.mode, to = ?mode, "Mode transition");
        self.mode = mode;
    }

    fn both_closed(&self) -> bool {
        !self.stdout_open && !self.stderr_open
    }

    fn forward(&mut self, stream: StreamKind, line: &Line) -> Result<(), SinkError> {
        if let Some(kept) = self.engine.process(line) {
            self.sink.emit(stream, &kept)?;
        }
        Ok(())
    }

    fn drain_buffers(&mut self) -> Result<(), SinkError> {
        let mut held = std::mem::take(&mut self.buffers);
        for (stream, line) in held.drain() {
            self.forward(stream, &line)?;
        }
        Ok(())
    }

    fn apply(&mut self, command: SessionCommand) -> String {
        match command {
            SessionCommand::Install { kind, argument } => {
                match self.engine.install(kind, &argument) {
                    Ok(()) => String::new(),
                    Err(e) => {
                        tracing::warn!(error = %e, "Rejected filter rule");
                        e.to_string()
                    }
                }
            }
            SessionCommand::ListPatterns => display::format_patterns(&self.engine),
            SessionCommand::Stats => display::format_stats(self.engine.stats()),
        }
    }

    /// Apply one event to the state machine.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if a kept line could not be written.
    pub fn handle(&mut self, event: Event) -> Result<Step, SinkError> {
        match event {
            Event::LineArrived(stream, line) => {
                match self.mode {
                    Mode::Passthrough => self.forward(stream, &line)?,
                    Mode::Interactive => self.buffers.push(stream, line),
                }
                Ok(Step::Continue)
            }
            Event::StreamClosed(stream) => {
                match stream {
                    StreamKind::Stdout => self.stdout_open = false,
                    StreamKind::Stderr => self.stderr_open = false,
                }
                tracing::debug!(%stream, "Stream closed");
                if self.both_closed() && self.mode == Mode::Passthrough {
                    return Ok(Step::Finish(Disposition::ChildFinished));
                }
                Ok(Step::Continue)
            }
            Event::KeypressDetected => {
                if self.mode == Mode::Interactive {
                    return Ok(Step::Continue);
                }
                self.transition(Mode::Interactive);
                Ok(Step::StartSession)
            }
            Event::Request(request) => {
                let text = self.apply(request.command);
                if request.reply.send(text).is_err() {
                    tracing::debug!("Session went away before reply");
                }
                Ok(Step::Continue)
            }
            Event::SessionEnded(SessionOutcome::Quit) => {
                self.buffers.clear();
                Ok(Step::Finish(Disposition::KillRequested))
            }
            Event::SessionEnded(SessionOutcome::Resume) => {
                if self.mode != Mode::Interactive {
                    return Ok(Step::Continue);
                }
                self.drain_buffers()?;
                self.transition(Mode::Passthrough);
                if self.both_closed() {
                    return Ok(Step::Finish(Disposition::ChildFinished));
                }
                Ok(Step::Rearm)
            }
        }
    }

    /// Run until the child finished or the operator asked to kill it.
    ///
    /// `events` carries keypresses and session traffic from `console`.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if a kept line could not be written.
    pub async fn run<C: Console>(
        &mut self,
        mut stdout: Receiver<Line>,
        mut stderr: Receiver<Line>,
        mut events: Receiver<Event>,
        console: &mut C,
    ) -> Result<Disposition, SinkError> {
        let mut console_open = true;

        loop {
            let event = tokio::select! {
                line = stdout.recv(), if self.stdout_open => match line {
                    Some(line) => Event::LineArrived(StreamKind::Stdout, line),
                    None => Event::StreamClosed(StreamKind::Stdout),
                },
                line = stderr.recv(), if self.stderr_open => match line {
                    Some(line) => Event::LineArrived(StreamKind::Stderr, line),
                    None => Event::StreamClosed(StreamKind::Stderr),
                },
                event = events.recv(), if console_open => match event {
                    Some(event) => event,
                    None => {
                        tracing::debug!("Console channel closed");
                        console_open = false;
                        if self.mode != Mode::Interactive {
                            continue;
                        }
                        Event::SessionEnded(SessionOutcome::Resume)
                    }
                },
                else => return Ok(Disposition::ChildFinished),
            };

            match self.handle(event)? {
                Step::Continue => {}
                Step::StartSession => console.start_session(),
                Step::Rearm => console.rearm(),
                Step::Finish(disposition) => {
                    tracing::info!(?disposition, "Coordinator finished");
                    return Ok(disposition);
                }
            }
        }
    }
}
