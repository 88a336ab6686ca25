//! Sink Writer (C9): resolves `device-uri` into a byte sink — fd 1 when
//! absent, or a `socket://host:port` TCP connection otherwise — wrapped in
//! the `futures::AsyncWrite` interface C5/C6 write through, the same
//! compat-shim pattern the teacher's own doc example uses for
//! `tokio::fs::File`.

use crate::error::SinkError;
use futures::AsyncWrite;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Either the process's stdout, or a connected `socket://` TCP stream,
/// both presented as `futures::AsyncWrite`.
pub enum Sink {
    Stdout(Compat<tokio::io::Stdout>),
    Socket(Compat<TcpStream>),
}

impl Sink {
    /// Resolves `device_uri` (the `device-uri` option, if any) into a
    /// connected sink. `None` selects stdout.
    pub async fn open(device_uri: Option<&str>) -> Result<Self, SinkError> {
        let Some(uri) = device_uri else {
            return Ok(Sink::Stdout(tokio::io::stdout().compat_write()));
        };

        let Some(host_port) = uri.strip_prefix("socket://") else {
            let scheme = uri.split("://").next().unwrap_or(uri).to_string();
            return Err(SinkError::UnsupportedScheme(scheme));
        };

        let connect = TcpStream::connect(host_port);
        let stream = match timeout(CONNECT_TIMEOUT, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(err)) => return Err(SinkError::ConnectFailure(host_port.to_string(), err)),
            Err(_) => return Err(SinkError::ConnectTimeout(host_port.to_string())),
        };
        Ok(Sink::Socket(stream.compat_write()))
    }
}

impl AsyncWrite for Sink {
    fn poll_write(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &[u8],
    ) -> std::task::Poll<std::io::Result<usize>> {
        match self.get_mut() {
            Sink::Stdout(s) => std::pin::Pin::new(s).poll_write(cx, buf),
            Sink::Socket(s) => std::pin::Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        match self.get_mut() {
            Sink::Stdout(s) => std::pin::Pin::new(s).poll_flush(cx),
            Sink::Socket(s) => std::pin::Pin::new(s).poll_flush(cx),
        }
    }

    fn poll_close(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        match self.get_mut() {
            Sink::Stdout(s) => std::pin::Pin::new(s).poll_close(cx),
            Sink::Socket(s) => std::pin::Pin::new(s).poll_close(cx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_unsupported_schemes() {
        let err = Sink::open(Some("ipp://host:631")).await.unwrap_err();
        assert!(matches!(err, SinkError::UnsupportedScheme(ref s) if s == "ipp"));
    }

    #[tokio::test]
    async fn stdout_is_selected_when_device_uri_absent() {
        assert!(Sink::open(None).await.is_ok());
    }
}
