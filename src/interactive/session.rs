//! The interactive prompt loop.
//!
//! Runs on its own thread because line input blocks. Rule changes are sent to
//! the coordinator as requests; the session waits for each reply before
//! prompting again.

use tokio::sync::mpsc::Sender;

use crate::coordinator::{Event, SessionCommand, SessionOutcome, SessionRequest};
use crate::display;

use super::{complete, Command};

/// Prompt shown for each interactive line.
pub const PROMPT: &str = "prolix> ";

/// Source of operator input lines.
pub trait LineInput {
    /// Show `prompt` and read one line without its terminator.
    ///
    /// Returns `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> Option<String>;

    /// Show text to the operator.
    fn print(&mut self, text: &str);
}

/// One interactive session, from the first prompt to resume or quit.
#[derive(Debug)]
pub struct InteractionSession<I> {
    input: I,
    events: Sender<Event>,
}

impl<I: LineInput> InteractionSession<I> {
    /// Create a session that reports to the coordinator through `events`.
    pub fn new(input: I, events: Sender<Event>) -> Self {
        Self { input, events }
    }

    /// Run the prompt loop to completion.
    ///
    /// Blocks the calling thread; must not be called from async code. The
    /// caller is responsible for sending `Event::SessionEnded` with the
    /// returned outcome.
    pub fn run(&mut self) -> SessionOutcome {
        let outcome = self.prompt_loop();
        tracing::debug!(?outcome, "Interactive session ended");
        outcome
    }

    fn prompt_loop(&mut self) -> SessionOutcome {
        loop {
            let Some(line) = self.input.read_line(PROMPT) else {
                return SessionOutcome::Resume;
            };
            if line.is_empty() {
                return SessionOutcome::Resume;
            }

            if let Some(prefix) = line.strip_suffix('\t') {
                let candidates = complete(prefix);
                self.input.print(&format!("{}\n", candidates.join("  ")));
                continue;
            }

            let command = match Command::parse(&line) {
                Command::Quit => return SessionOutcome::Quit,
                Command::Help => {
                    self.input.print(&display::interactive_help());
                    continue;
                }
                Command::UnknownBuiltin(_) => {
                    self.input.print("Unknown command. Try 'help'.\n");
                    continue;
                }
                Command::UnknownCommand(name) => {
                    self.input
                        .print(&format!("Unknown unary command '{name}'. Try 'help'.\n"));
                    continue;
                }
                Command::Pats => SessionCommand::ListPatterns,
                Command::Stats => SessionCommand::Stats,
                Command::Install { kind, argument } => SessionCommand::Install { kind, argument },
            };

            if !self.request(command) {
                tracing::debug!("Coordinator gone, leaving interactive session");
                return SessionOutcome::Resume;
            }
        }
    }

    /// Send a request and show the reply. Returns `false` if the coordinator is gone.
    fn request(&mut self, command: SessionCommand) -> bool {
        let (request, reply) = SessionRequest::new(command);
        if self.events.blocking_send(Event::Request(request)).is_err() {
            return false;
        }
        match reply.blocking_recv() {
            Ok(text) => {
                if !text.is_empty() {
                    let text = if text.ends_with('\n') { text } else { text + "\n" };
                    self.input.print(&text);
                }
                true
            }
            Err(_) => false,
        }
    }
}
