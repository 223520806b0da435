//! Socket abstraction over plain TCP and TLS streams.
//!
//! The transport only needs "something that reads and writes"; this module
//! erases whether the bytes travel over TCP or BoringSSL.

use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_boring::SslStream;

/// A trait for any socket that supports async read/write operations.
pub trait StreamSocket: AsyncRead + AsyncWrite + Unpin + Send + Sync + 'static {}

impl StreamSocket for TcpStream {}

impl<S: StreamSocket> StreamSocket for SslStream<S> {}

/// A boxed [`StreamSocket`], so TCP and TLS connections share one type.
pub struct BoxedSocket {
    inner: Pin<Box<dyn StreamSocket>>,
    secure: bool,
}

impl BoxedSocket {
    pub fn tcp(socket: TcpStream) -> Self {
        Self {
            inner: Box::pin(socket),
            secure: false,
        }
    }

    pub fn tls<S: StreamSocket>(socket: SslStream<S>) -> Self {
        Self {
            inner: Box::pin(socket),
            secure: true,
        }
    }

    /// Whether the bytes are encrypted on the wire.
    pub fn is_secure(&self) -> bool {
        self.secure
    }
}

impl AsyncRead for BoxedSocket {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        self.inner.as_mut().poll_read(cx, buf)
    }
}

impl AsyncWrite for BoxedSocket {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        self.inner.as_mut().poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        self.inner.as_mut().poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        self.inner.as_mut().poll_shutdown(cx)
    }
}
