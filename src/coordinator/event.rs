//! Events consumed by the coordinator loop.

use tokio::sync::oneshot;

use crate::filter::{Line, RuleKind};
use crate::process::StreamKind;

/// Everything the coordinator reacts to.
#[derive(Debug)]
pub enum Event {
    /// A reader produced a line.
    LineArrived(StreamKind, Line),
    /// A reader reached end of stream (or failed).
    StreamClosed(StreamKind),
    /// The operator pressed a key.
    KeypressDetected,
    /// The interactive session wants something done with the rules.
    Request(SessionRequest),
    /// The interactive session finished.
    SessionEnded(SessionOutcome),
}

/// How an interactive session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Go back to passthrough.
    Resume,
    /// Stop the child.
    Quit,
}

/// Work the session asks the coordinator to do on its behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Install a new rule.
    Install { kind: RuleKind, argument: String },
    /// Describe the installed rules.
    ListPatterns,
    /// Describe the line counters.
    Stats,
}

/// A `SessionCommand` plus the channel for the text to show the operator.
#[derive(Debug)]
pub struct SessionRequest {
    pub command: SessionCommand,
    pub reply: oneshot::Sender<String>,
}

impl SessionRequest {
    /// Create a request and the receiver for its reply.
    #[must_use]
    pub fn new(command: SessionCommand) -> (Self, oneshot::Receiver<String>) {
        let (reply, rx) = oneshot::channel();
        (Self { command, reply }, rx)
    }
}

/// Why the coordinator stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Both streams ended while passing lines through.
    ChildFinished,
    /// The operator asked to stop the child.
    KillRequested,
}
