//! Spawn mode: run the child and coordinate its two output streams.

use tokio::sync::mpsc;

use crate::config::RunConfig;
use crate::coordinator::{Coordinator, Disposition};
use crate::display;
use crate::interactive::TerminalConsole;
use crate::output::ConsoleSink;
use crate::process::{ChildProcess, LineReader, StreamKind, DEFAULT_CHANNEL_BUFFER};

use super::{exit_code_of, RunError, RunSummary};

/// Run `config.command`, filtering its output until it exits or the operator
/// quits from the interactive prompt.
///
/// # Errors
///
/// Returns `RunError` for bad filter rules, a child that cannot be started,
/// or failed output.
pub async fn run_spawn(config: &RunConfig) -> Result<RunSummary, RunError> {
    let engine = config.filters.build_engine()?;
    let sink = ConsoleSink::open(config.log.as_deref(), config.program())?;

    if config.verbose > 0 {
        display::print_running(&config.command);
    }

    let mut child = ChildProcess::spawn_command(&config.command)?;
    let stdout = child.take_stdout().ok_or(RunError::NoPipes)?;
    let stderr = child.take_stderr().ok_or(RunError::NoPipes)?;

    let stdout_rx = LineReader::spawn(stdout, StreamKind::Stdout, DEFAULT_CHANNEL_BUFFER);
    let stderr_rx = LineReader::spawn(stderr, StreamKind::Stderr, DEFAULT_CHANNEL_BUFFER);

    let (events_tx, events_rx) = mpsc::channel(DEFAULT_CHANNEL_BUFFER);
    let mut console = TerminalConsole::start(events_tx);

    let mut coordinator = Coordinator::new(engine, sink);
    let disposition = match coordinator
        .run(stdout_rx, stderr_rx, events_rx, &mut console)
        .await
    {
        Ok(disposition) => disposition,
        Err(e) => {
            tracing::warn!(error = %e, "Output failed, stopping child");
            child.terminate_gracefully(config.grace_period);
            if let Err(wait_err) = child.wait().await {
                tracing::debug!(error = %wait_err, "Failed to reap child after output error");
            }
            return Err(e.into());
        }
    };

    if disposition == Disposition::KillRequested {
        child.terminate_gracefully(config.grace_period);
    }

    let status = child.wait().await.map_err(RunError::Wait)?;
    tracing::info!(%status, "Child exited");

    Ok(RunSummary {
        stats: coordinator.stats(),
        exit_code: exit_code_of(status),
    })
}
