//! The real console: stdin for input, stdout for prompts.

use std::io::{self, BufRead, Write};
use std::thread;

use tokio::sync::mpsc::Sender;

use crate::coordinator::{Console, Event};

use super::{InteractionSession, KeypressWatcher, LineInput};

/// Line input from the process's own stdin, read in cooked mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinInput;

impl LineInput for StdinInput {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.print(prompt);
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                let trimmed = line.trim_end_matches(['\n', '\r']).len();
                line.truncate(trimmed);
                Some(line)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read interactive input");
                None
            }
        }
    }

    fn print(&mut self, text: &str) {
        let mut out = io::stdout().lock();
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
            tracing::warn!(error = %e, "Failed to write to console");
        }
    }
}

/// Console backed by the terminal: a keypress watcher on stdin plus one
/// session thread per interactive session.
#[derive(Debug)]
pub struct TerminalConsole {
    events: Sender<Event>,
    watcher: KeypressWatcher,
}

impl TerminalConsole {
    /// Start watching stdin for keypresses, reporting through `events`.
    #[must_use]
    pub fn start(events: Sender<Event>) -> Self {
        let watcher = KeypressWatcher::spawn(io::stdin(), events.clone());
        Self { events, watcher }
    }
}

impl Console for TerminalConsole {
    fn start_session(&mut self) {
        let mut session = InteractionSession::new(StdinInput, self.events.clone());
        let events = self.events.clone();

        thread::spawn(move || {
            let outcome = session.run();
            if events.blocking_send(Event::SessionEnded(outcome)).is_err() {
                tracing::debug!("Coordinator gone before session end was reported");
            }
        });
    }

    fn rearm(&mut self) {
        self.watcher.rearm();
    }
}
