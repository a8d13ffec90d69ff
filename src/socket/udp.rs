//! UDP socket handle with shared ownership.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::ops::Deref;
use std::sync::Arc;

use tokio::net::ToSocketAddrs;

use crate::info::make_canonical;

/// A shareable handle to a bound UDP socket.
///
/// Wraps `tokio::net::UdpSocket` in shared ownership so the same endpoint
/// can be used concurrently by a sending path and a receiving path. Clones
/// of a handle refer to the same underlying socket.
#[derive(Clone)]
pub struct UdpSocket {
    socket: Arc<tokio::net::UdpSocket>,
}

impl fmt::Debug for UdpSocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.socket.fmt(f)
    }
}

impl UdpSocket {
    /// Bind a new UDP socket to the given address. See
    /// `tokio::net::UdpSocket::bind`.
    pub async fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let socket = tokio::net::UdpSocket::bind(addr).await?;
        Ok(Self::new(socket))
    }

    /// Wrap an existing socket in a shareable handle.
    pub fn new(socket: tokio::net::UdpSocket) -> Self {
        Self {
            socket: Arc::new(socket),
        }
    }

    /// Local address of the socket, canonicalized. See
    /// `tokio::net::UdpSocket::local_addr`.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr().map(make_canonical)
    }

    /// Returns `true` if `other` is a handle to the same underlying socket.
    pub fn same_socket(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.socket, &other.socket)
    }
}

impl Deref for UdpSocket {
    type Target = tokio::net::UdpSocket;
    fn deref(&self) -> &Self::Target {
        &self.socket
    }
}

impl From<tokio::net::UdpSocket> for UdpSocket {
    fn from(socket: tokio::net::UdpSocket) -> Self {
        Self::new(socket)
    }
}

#[cfg(test)]
mod tests {
    use super::UdpSocket;

    #[tokio::test]
    async fn clones_share_the_socket() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let clone = socket.clone();

        assert!(socket.same_socket(&clone));
        assert_eq!(
            socket.local_addr().unwrap(),
            clone.local_addr().unwrap()
        );

        let other = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        assert!(!socket.same_socket(&other));
    }

    #[tokio::test]
    async fn handles_send_and_receive() {
        let a = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let b = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        a.send_to(b"ping", b.local_addr().unwrap()).await.unwrap();

        let mut buf = [0u8; 16];
        let (n, from) = b.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"ping");
        assert_eq!(from, a.local_addr().unwrap());
    }
}
