//! Child process spawning and termination.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::task::JoinHandle;

/// Default delay between the graceful and the forceful termination signal.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Error type for process spawning operations.
#[derive(thiserror::Error, Debug)]
pub enum SpawnError {
    /// No command was given.
    #[error("No command to run")]
    EmptyCommand,
    /// The executable was not found.
    #[error("Command not found: {0}")]
    NotFound(String),
    /// Permission denied when spawning.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// Other I/O error.
    #[error("Failed to start {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl SpawnError {
    /// Create a `SpawnError` from an I/O error, classifying common cases.
    fn from_io(program: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(program.to_string()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(program.to_string()),
            _ => Self::Io {
                program: program.to_string(),
                source: err,
            },
        }
    }
}

/// A running child whose stdout and stderr are piped back to us.
#[derive(Debug)]
pub struct ChildProcess {
    child: Child,
    pid: Option<u32>,
}

impl ChildProcess {
    /// Spawn `program` with `args`.
    ///
    /// The child's stdin is the null device; our own stdin belongs to the
    /// interactive prompt.
    ///
    /// # Errors
    ///
    /// Returns `SpawnError` if the process fails to start.
    pub fn spawn<S: AsRef<str>>(program: &str, args: &[S]) -> Result<Self, SpawnError> {
        let child = Command::new(program)
            .args(args.iter().map(AsRef::as_ref))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SpawnError::from_io(program, e))?;

        let pid = child.id();
        tracing::info!(program, pid, "Spawned child process");
        Ok(Self { child, pid })
    }

    /// Spawn from a full command line: program followed by its arguments.
    ///
    /// # Errors
    ///
    /// Returns `SpawnError::EmptyCommand` for an empty slice, otherwise as `spawn`.
    pub fn spawn_command(command: &[String]) -> Result<Self, SpawnError> {
        let (program, args) = command.split_first().ok_or(SpawnError::EmptyCommand)?;
        Self::spawn(program, args)
    }

    /// Take ownership of the stdout handle.
    ///
    /// This can only be called once; subsequent calls return `None`.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    /// Take ownership of the stderr handle.
    ///
    /// This can only be called once; subsequent calls return `None`.
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    /// The process ID assigned at spawn time.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.pid
    }

    /// Wait for the process to exit.
    ///
    /// # Errors
    ///
    /// Returns an error if waiting fails.
    pub async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        self.child.wait().await
    }

    /// Ask the process to stop, escalating after `grace`.
    ///
    /// SIGTERM is sent immediately. A background task then sleeps for `grace`
    /// and sends SIGKILL if a process with the same pid still exists. That
    /// probe cannot tell our child from a later process that reused the pid.
    /// Signal delivery failures are logged and otherwise ignored.
    ///
    /// Returns the handle of the escalation task, if one was scheduled.
    pub fn terminate_gracefully(&mut self, grace: Duration) -> Option<JoinHandle<()>> {
        #[cfg(unix)]
        {
            let pid = self.pid?;
            return Some(escalate_unix(pid, grace));
        }

        #[cfg(not(unix))]
        {
            let _ = grace;
            if let Err(e) = self.child.start_kill() {
                tracing::warn!(error = %e, "Failed to kill child process");
            }
            None
        }
    }
}

#[cfg(unix)]
fn escalate_unix(pid: u32, grace: Duration) -> JoinHandle<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let nix_pid = Pid::from_raw(i32::try_from(pid).unwrap_or(i32::MAX));

    tracing::info!(pid, signal = "SIGTERM", "Terminating child process");
    if let Err(e) = kill(nix_pid, Signal::SIGTERM) {
        tracing::warn!(pid, signal = "SIGTERM", error = %e, "Failed to signal child process");
    }

    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        // Signal 0 only checks that *a* process owns this pid.
        if kill(nix_pid, None).is_ok() {
            tracing::info!(pid, signal = "SIGKILL", "Grace period elapsed, killing child process");
            if let Err(e) = kill(nix_pid, Signal::SIGKILL) {
                tracing::warn!(
                    pid,
                    signal = "SIGKILL",
                    error = %e,
                    "Failed to signal child process"
                );
            }
        }
    })
}
