//! Line reader for child output streams.

use std::fmt;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

use crate::filter::Line;

/// Default capacity of the per-stream line channel.
pub const DEFAULT_CHANNEL_BUFFER: usize = 64;

/// Which child stream a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
        }
    }
}

/// Splits a byte stream into `Line`s.
#[derive(Debug)]
pub struct LineReader<R> {
    reader: BufReader<R>,
    kind: StreamKind,
    buf: Vec<u8>,
    failed: bool,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    /// Wrap a raw stream.
    pub fn new(reader: R, kind: StreamKind) -> Self {
        Self {
            reader: BufReader::new(reader),
            kind,
            buf: Vec::new(),
            failed: false,
        }
    }

    /// Read the next line.
    ///
    /// Returns `None` at end of stream. A read error also ends the stream;
    /// it is logged and not retried. Bytes read before the error are still
    /// returned as a final unterminated line.
    pub async fn next_line(&mut self) -> Option<Line> {
        if self.failed {
            return None;
        }
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf).await {
            Ok(0) => None,
            Ok(_) => Some(Line::from_raw(&self.buf)),
            Err(e) => {
                tracing::warn!(
                    stream = %self.kind,
                    error = %e,
                    "Read failed, treating as end of stream"
                );
                self.failed = true;
                (!self.buf.is_empty()).then(|| Line::from_raw(&self.buf))
            }
        }
    }

    /// Turn the reader into a lazy stream of lines.
    pub fn into_stream(self) -> impl futures_core::Stream<Item = Line> {
        futures_util::stream::unfold(self, |mut reader| async move {
            reader.next_line().await.map(|line| (line, reader))
        })
    }
}

impl<R: AsyncRead + Unpin + Send + 'static> LineReader<R> {
    /// Read on a background task, forwarding lines into a channel.
    ///
    /// The channel closes when the stream ends or fails.
    pub fn spawn(reader: R, kind: StreamKind, buffer: usize) -> mpsc::Receiver<Line> {
        let (tx, rx) = mpsc::channel(buffer);
        let mut lines = Self::new(reader, kind);

        tokio::spawn(async move {
            while let Some(line) = lines.next_line().await {
                if tx.send(line).await.is_err() {
                    tracing::debug!(stream = %kind, "Line receiver dropped");
                    break;
                }
            }
            tracing::debug!(stream = %kind, "Stream closed");
        });

        rx
    }
}
