//! Pipe mode: filter our own stdin.

use futures_util::StreamExt;
use tokio::io::AsyncRead;

use crate::config::RunConfig;
use crate::display;
use crate::filter::FilterEngine;
use crate::output::{ConsoleSink, LineSink, SinkError};
use crate::process::{LineReader, StreamKind};

use super::{RunError, RunSummary};

/// Filter stdin to stdout until end of input.
///
/// # Errors
///
/// Returns `RunError` for bad filter rules or failed output.
pub async fn run_pipe(config: &RunConfig) -> Result<RunSummary, RunError> {
    let mut engine = config.filters.build_engine()?;
    let mut sink = ConsoleSink::open(config.log.as_deref(), None)?;

    if config.verbose > 0 {
        display::print_pipe_mode();
    }

    filter_stream(tokio::io::stdin(), &mut engine, &mut sink).await?;

    Ok(RunSummary {
        stats: engine.stats(),
        exit_code: 0,
    })
}

/// Run every line of `reader` through `engine` into `sink`.
///
/// # Errors
///
/// Returns `SinkError` if a kept line could not be written.
pub async fn filter_stream<R, S>(
    reader: R,
    engine: &mut FilterEngine,
    sink: &mut S,
) -> Result<(), SinkError>
where
    R: AsyncRead + Unpin,
    S: LineSink,
{
    let lines = LineReader::new(reader, StreamKind::Stdout).into_stream();
    tokio::pin!(lines);

    while let Some(line) = lines.next().await {
        if let Some(kept) = engine.process(&line) {
            sink.emit(StreamKind::Stdout, &kept)?;
        }
    }
    Ok(())
}
