//! Progress Reporter (C8): writes `ATTR:`/`STATE:` lines on the error
//! channel for the parent server to ingest, and installs the ambient
//! `tracing` subscriber from the resolved verbosity.

use futures::{AsyncWrite, AsyncWriteExt};
use std::ops::DerefMut;
use tracing_subscriber::EnvFilter;

/// Installs a `tracing_subscriber` writing to stderr, filtered by the
/// resolved verbosity (`-v` count, floored by `SERVER_LOGLEVEL`).
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Writes `ATTR:`/`STATE:`/free-form lines to the error channel. Generic
/// over `AsyncWrite` so it can be pointed at stderr or any other sink the
/// caller wires up in tests.
pub struct ProgressReporter<W> {
    writer: W,
}

impl<W> ProgressReporter<W>
where
    W: DerefMut<Target: AsyncWrite> + Unpin,
{
    pub fn new(writer: W) -> Self {
        ProgressReporter { writer }
    }

    async fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }

    /// `ATTR: name=value` — updates a job attribute.
    pub async fn attr(&mut self, name: &str, value: impl std::fmt::Display) -> std::io::Result<()> {
        self.write_line(&format!("ATTR: {}={}", name, value)).await
    }

    /// `STATE: [+|-]keyword[,keyword...]` — adds, removes, or sets
    /// `printer-state-reasons`. The caller passes the sign-prefixed keyword
    /// list; suffixes `-error`/`-warning`/`-report` are the caller's
    /// concern, stripped only by the parent when matching.
    pub async fn state(&mut self, keywords: &str) -> std::io::Result<()> {
        self.write_line(&format!("STATE: {}", keywords)).await
    }

    /// Free-form debug line, unprefixed.
    pub async fn log(&mut self, message: &str) -> std::io::Result<()> {
        self.write_line(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;

    #[tokio::test]
    async fn attr_and_state_lines_use_the_expected_prefixes() {
        let mut buf = Vec::<u8>::new();
        let mut reporter = ProgressReporter::new(Pin::new(&mut buf));
        reporter.attr("job-impressions-completed", 4).await.unwrap();
        reporter.state("+media-empty-warning").await.unwrap();

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("ATTR: job-impressions-completed=4"));
        assert_eq!(lines.next(), Some("STATE: +media-empty-warning"));
    }
}
