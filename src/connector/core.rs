//! Concrete connector over a datagram or stream channel pair.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use super::StreamConnector;
use crate::info::Protocol;
use crate::socket::{TcpStream, UdpSocket};

/// The endpoints of a connector, keyed by protocol family.
///
/// One variant per transport kind, so a connector structurally carries
/// either datagram endpoints or stream endpoints, never both. A `None`
/// control endpoint encodes rtcp-mux: control traffic shares the data
/// endpoint, and the control accessors yield a handle to it.
#[derive(Debug, Clone)]
pub enum Channels {
    /// Connectionless endpoints.
    Datagram {
        /// Endpoint for data (e.g. RTP) traffic.
        data: UdpSocket,

        /// Endpoint for control (e.g. RTCP) traffic; `None` under rtcp-mux.
        control: Option<UdpSocket>,
    },

    /// Connection-oriented endpoints.
    Stream {
        /// Endpoint for data traffic.
        data: TcpStream,

        /// Endpoint for control traffic; `None` under rtcp-mux.
        control: Option<TcpStream>,
    },
}

impl Channels {
    /// The protocol family these channels belong to.
    pub fn protocol(&self) -> Protocol {
        match self {
            Self::Datagram { .. } => Protocol::Udp,
            Self::Stream { .. } => Protocol::Tcp,
        }
    }

    /// Whether control traffic is multiplexed onto the data endpoint.
    pub fn is_mux(&self) -> bool {
        match self {
            Self::Datagram { control, .. } => control.is_none(),
            Self::Stream { control, .. } => control.is_none(),
        }
    }

    fn data_socket(&self) -> Option<UdpSocket> {
        match self {
            Self::Datagram { data, .. } => Some(data.clone()),
            Self::Stream { .. } => None,
        }
    }

    fn control_socket(&self) -> Option<UdpSocket> {
        match self {
            Self::Datagram { data, control } => Some(control.as_ref().unwrap_or(data).clone()),
            Self::Stream { .. } => None,
        }
    }

    fn data_stream(&self) -> Option<TcpStream> {
        match self {
            Self::Datagram { .. } => None,
            Self::Stream { data, .. } => Some(data.clone()),
        }
    }

    fn control_stream(&self) -> Option<TcpStream> {
        match self {
            Self::Datagram { .. } => None,
            Self::Stream { data, control } => Some(control.as_ref().unwrap_or(data).clone()),
        }
    }
}

/// A thread-safe stream connector over already-bound endpoints.
///
/// The connector is constructed with endpoints that are bound and ready, so
/// it has no failure paths of its own: any bind or connect error belongs to
/// whatever produced the endpoints. `close` takes the endpoints out from
/// under a lock, so release is immediate and visible from every thread.
///
/// ```no_run
/// # async fn demo() -> std::io::Result<()> {
/// use duet::connector::{Connector, StreamConnector};
/// use duet::socket::UdpSocket;
///
/// let data = UdpSocket::bind("127.0.0.1:5004").await?;
/// let control = UdpSocket::bind("127.0.0.1:5005").await?;
///
/// let connector = Connector::udp(data, control);
/// let rtp = connector.data_socket().unwrap();
/// let rtcp = connector.control_socket().unwrap();
///
/// connector.close();
/// assert!(connector.data_socket().is_none());
/// # Ok(())
/// # }
/// ```
pub struct Connector {
    channels: RwLock<Option<Channels>>,
    protocol: Protocol,
    rtcp_mux: bool,
    started: AtomicBool,
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("protocol", &self.protocol)
            .field("rtcp_mux", &self.rtcp_mux)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Connector {
    /// Build a connector from an explicit channel pair.
    pub fn new(channels: Channels) -> Self {
        let protocol = channels.protocol();
        let rtcp_mux = channels.is_mux();
        Self {
            channels: RwLock::new(Some(channels)),
            protocol,
            rtcp_mux,
            started: AtomicBool::new(false),
        }
    }

    /// UDP connector with distinct data and control sockets.
    pub fn udp(data: UdpSocket, control: UdpSocket) -> Self {
        Self::new(Channels::Datagram {
            data,
            control: Some(control),
        })
    }

    /// UDP connector with control traffic multiplexed onto the data socket.
    pub fn udp_rtcp_mux(socket: UdpSocket) -> Self {
        Self::new(Channels::Datagram {
            data: socket,
            control: None,
        })
    }

    /// TCP connector with distinct data and control streams.
    pub fn tcp(data: TcpStream, control: TcpStream) -> Self {
        Self::new(Channels::Stream {
            data,
            control: Some(control),
        })
    }

    /// TCP connector with control traffic multiplexed onto the data stream.
    pub fn tcp_rtcp_mux(stream: TcpStream) -> Self {
        Self::new(Channels::Stream {
            data: stream,
            control: None,
        })
    }

    /// Whether the connector is between `started` and `stopped` calls.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.channels.read().is_none()
    }
}

impl StreamConnector for Connector {
    fn data_socket(&self) -> Option<UdpSocket> {
        self.channels.read().as_ref().and_then(Channels::data_socket)
    }

    fn control_socket(&self) -> Option<UdpSocket> {
        self.channels
            .read()
            .as_ref()
            .and_then(Channels::control_socket)
    }

    fn data_stream(&self) -> Option<TcpStream> {
        self.channels.read().as_ref().and_then(Channels::data_stream)
    }

    fn control_stream(&self) -> Option<TcpStream> {
        self.channels
            .read()
            .as_ref()
            .and_then(Channels::control_stream)
    }

    fn protocol(&self) -> Protocol {
        self.protocol
    }

    fn is_rtcp_mux(&self) -> bool {
        self.rtcp_mux
    }

    fn started(&self) {
        if !self.started.swap(true, Ordering::AcqRel) {
            tracing::trace!(protocol = %self.protocol, "connector started");
        }
    }

    fn stopped(&self) {
        if self.started.swap(false, Ordering::AcqRel) {
            tracing::trace!(protocol = %self.protocol, "connector stopped");
        }
    }

    fn close(&self) {
        if self.channels.write().take().is_some() {
            tracing::debug!(protocol = %self.protocol, "connector closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::socket::UdpSocket;

    assert_impl_all!(Connector: Send, Sync, std::fmt::Debug);

    #[tokio::test]
    async fn mux_aliases_the_data_socket() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let connector = Connector::udp_rtcp_mux(socket);

        assert!(connector.is_rtcp_mux());

        let data = connector.data_socket().unwrap();
        let control = connector.control_socket().unwrap();
        assert!(data.same_socket(&control));
    }

    #[tokio::test]
    async fn close_takes_the_channels() {
        let data = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let control = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let connector = Connector::udp(data, control);

        assert!(!connector.is_closed());
        connector.close();
        assert!(connector.is_closed());
        assert!(connector.data_socket().is_none());

        // identity survives close
        assert_eq!(connector.protocol(), Protocol::Udp);
        assert!(!connector.is_rtcp_mux());
    }

    #[tokio::test]
    async fn usage_phase_is_advisory() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let connector = Connector::udp_rtcp_mux(socket);

        assert!(!connector.is_started());
        connector.started();
        assert!(connector.is_started());
        connector.stopped();
        assert!(!connector.is_started());

        // phase does not gate the accessors
        assert!(connector.data_socket().is_some());
    }
}
