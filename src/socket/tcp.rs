//! TCP stream handle with shared ownership and better address semantics.
//!
//! When a server accepts a connection, it returns the associated
//! `SocketAddr` alongside the stream. On some platforms this information is
//! not available later via `TcpStream::peer_addr`, so the handle retains it
//! for the lifetime of the stream.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::ops::Deref;
use std::sync::Arc;

use tokio::net::ToSocketAddrs;

use crate::info::make_canonical;

/// A shareable handle to an established TCP stream.
///
/// Wraps `tokio::net::TcpStream` in shared ownership; clones of a handle
/// refer to the same underlying connection. Reading and writing go through
/// the non-blocking `&self` interface of the tokio stream (`try_read`,
/// `try_write`, `readable`, `writable`).
#[derive(Clone)]
pub struct TcpStream {
    stream: Arc<tokio::net::TcpStream>,
    remote: Option<SocketAddr>,
}

impl fmt::Debug for TcpStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.stream.fmt(f)
    }
}

impl TcpStream {
    /// Connect to a remote address. See `tokio::net::TcpStream::connect`.
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let stream = tokio::net::TcpStream::connect(addr).await?;
        Ok(Self::client(stream))
    }

    /// Wrap an existing `tokio::net::TcpStream` for a client connection.
    /// Client connections should have valid `peer_addr` and `local_addr`.
    pub fn client(inner: tokio::net::TcpStream) -> Self {
        Self {
            stream: Arc::new(inner),
            remote: None,
        }
    }

    /// Wrap an existing `tokio::net::TcpStream` for a server connection.
    /// Server connections should have a valid `local_addr` but may not have
    /// a `peer_addr`, hence the remote address must be provided.
    pub fn server(inner: tokio::net::TcpStream, remote: SocketAddr) -> Self {
        Self {
            stream: Arc::new(inner),
            remote: Some(make_canonical(remote)),
        }
    }

    /// Remote address of the connection. See `tokio::net::TcpStream::peer_addr`.
    ///
    /// For servers, this returns the remote address provided when creating
    /// the handle, instead of an `io::Error`.
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        match self.remote {
            Some(addr) => Ok(addr),
            None => self.stream.peer_addr().map(make_canonical),
        }
    }

    /// Local address of the connection, canonicalized. See
    /// `tokio::net::TcpStream::local_addr`.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.stream.local_addr().map(make_canonical)
    }

    /// Returns `true` if `other` is a handle to the same underlying stream.
    pub fn same_socket(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.stream, &other.stream)
    }
}

impl Deref for TcpStream {
    type Target = tokio::net::TcpStream;
    fn deref(&self) -> &Self::Target {
        &self.stream
    }
}

impl From<tokio::net::TcpStream> for TcpStream {
    fn from(stream: tokio::net::TcpStream) -> Self {
        Self::client(stream)
    }
}
