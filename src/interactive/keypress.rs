//! Console keypress watcher.

use std::io::{ErrorKind, Read};
use std::sync::mpsc as std_mpsc;
use std::thread;

use tokio::sync::mpsc::Sender;

use crate::coordinator::Event;

/// Handle to the watcher thread.
///
/// After each reported keypress the watcher stops reading until `rearm` is
/// called, leaving the console free for the interactive session.
#[derive(Debug)]
pub struct KeypressWatcher {
    rearm: std_mpsc::Sender<()>,
}

impl KeypressWatcher {
    /// Start watching `input` on a background thread.
    ///
    /// The thread ends at end of input, on a read error, or once the
    /// coordinator or this handle is dropped.
    #[must_use]
    pub fn spawn<R: Read + Send + 'static>(mut input: R, events: Sender<Event>) -> Self {
        let (rearm, armed) = std_mpsc::channel();

        thread::spawn(move || {
            let mut byte = [0u8; 1];
            loop {
                match input.read(&mut byte) {
                    Ok(0) => {
                        tracing::debug!("Console input closed, keypress watcher exiting");
                        return;
                    }
                    Ok(_) => {
                        if events.blocking_send(Event::KeypressDetected).is_err() {
                            return;
                        }
                        if armed.recv().is_err() {
                            return;
                        }
                    }
                    Err(e) if e.kind() == ErrorKind::Interrupted => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "Console read failed, keypress watcher exiting");
                        return;
                    }
                }
            }
        });

        Self { rearm }
    }

    /// Allow the next keypress to be reported.
    pub fn rearm(&self) {
        if self.rearm.send(()).is_err() {
            tracing::debug!("Keypress watcher already exited");
        }
    }
}
