//! Allocation of paired UDP sockets for data and control traffic.
//!
//! The convention for a media stream's socket pair is an even port for data
//! and the next odd port for control. [`bind_pair`] scans a configured port
//! range for an adjacent pair that binds; [`bind_mux`] allocates the single
//! socket an rtcp-mux connector needs.

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::ops::Range;

use thiserror::Error;
use tracing::warn;

use crate::socket::UdpSocket;

/// Configuration for binding connector sockets.
#[derive(Debug, Clone)]
pub struct BindConfig {
    /// Ports to scan for a usable allocation. Data ports are drawn from the
    /// even ports in this range; the control port must also fall inside it.
    pub port_range: Range<u16>,

    /// Whether to set `SO_REUSEADDR` on the sockets.
    pub reuse_address: bool,

    /// The size of the send buffer.
    pub send_buffer_size: Option<usize>,

    /// The size of the receive buffer.
    pub recv_buffer_size: Option<usize>,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            port_range: 5000..6000,
            reuse_address: true,
            send_buffer_size: None,
            recv_buffer_size: None,
        }
    }
}

/// Error binding connector sockets.
#[derive(Debug, Error)]
pub enum BindError {
    /// Every candidate port in the range was already in use.
    #[error("no usable port in {}..{}", range.start, range.end)]
    Exhausted {
        /// The scanned port range.
        range: Range<u16>,
    },

    /// Socket construction failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Bind a data/control socket pair on adjacent ports.
///
/// Scans the even ports in `config.port_range`, binding data on the even
/// port and control on the next one; the first pair that binds wins. Ports
/// already in use are skipped, any other socket error is returned as-is.
///
/// Must be called from within a Tokio runtime.
pub fn bind_pair(ip: IpAddr, config: &BindConfig) -> Result<(UdpSocket, UdpSocket), BindError> {
    let mut data_port = config.port_range.start + (config.port_range.start & 1);

    while config.port_range.contains(&data_port)
        && data_port
            .checked_add(1)
            .is_some_and(|control| config.port_range.contains(&control))
    {
        let data = match bind_socket(SocketAddr::new(ip, data_port), config) {
            Ok(socket) => socket,
            Err(error) if error.kind() == io::ErrorKind::AddrInUse => {
                tracing::trace!(port = data_port, "data port in use");
                data_port += 2;
                continue;
            }
            Err(error) => return Err(error.into()),
        };

        match bind_socket(SocketAddr::new(ip, data_port + 1), config) {
            Ok(control) => {
                tracing::debug!(
                    data.port = data_port,
                    control.port = data_port + 1,
                    "bound socket pair"
                );
                return Ok((data, control));
            }
            Err(error) if error.kind() == io::ErrorKind::AddrInUse => {
                tracing::trace!(port = data_port + 1, "control port in use");
                data_port += 2;
            }
            Err(error) => return Err(error.into()),
        }
    }

    Err(BindError::Exhausted {
        range: config.port_range.clone(),
    })
}

/// Bind the single socket an rtcp-mux connector carries, on the first free
/// port in the range.
///
/// Must be called from within a Tokio runtime.
pub fn bind_mux(ip: IpAddr, config: &BindConfig) -> Result<UdpSocket, BindError> {
    for port in config.port_range.clone() {
        match bind_socket(SocketAddr::new(ip, port), config) {
            Ok(socket) => {
                tracing::debug!(local.port = port, "bound rtcp-mux socket");
                return Ok(socket);
            }
            Err(error) if error.kind() == io::ErrorKind::AddrInUse => {
                tracing::trace!(port, "port in use");
            }
            Err(error) => return Err(error.into()),
        }
    }

    Err(BindError::Exhausted {
        range: config.port_range.clone(),
    })
}

fn bind_socket(addr: SocketAddr, config: &BindConfig) -> Result<UdpSocket, io::Error> {
    use socket2::{Domain, Protocol, Socket, Type};

    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))?;

    // Tokio requires O_NONBLOCK to be set before the socket is handed over.
    socket.set_nonblocking(true)?;

    if config.reuse_address {
        socket.set_reuse_address(true)?;
    }

    if let Some(size) = config.send_buffer_size {
        if let Err(e) = socket.set_send_buffer_size(size) {
            warn!("udp set_send_buffer_size error: {}", e);
        }
    }

    if let Some(size) = config.recv_buffer_size {
        if let Err(e) = socket.set_recv_buffer_size(size) {
            warn!("udp set_recv_buffer_size error: {}", e);
        }
    }

    socket.bind(&addr.into())?;

    let socket = tokio::net::UdpSocket::from_std(socket.into())?;
    Ok(UdpSocket::new(socket))
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::{bind_mux, bind_pair, BindConfig, BindError};

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[tokio::test]
    async fn pair_lands_on_adjacent_ports() {
        let config = BindConfig {
            port_range: 40000..40100,
            reuse_address: false,
            ..Default::default()
        };

        let (data, control) = bind_pair(LOCALHOST, &config).unwrap();

        let data_port = data.local_addr().unwrap().port();
        let control_port = control.local_addr().unwrap().port();
        assert_eq!(data_port % 2, 0);
        assert_eq!(control_port, data_port + 1);
    }

    #[tokio::test]
    async fn pair_skips_occupied_ports() {
        let config = BindConfig {
            port_range: 40200..40300,
            reuse_address: false,
            ..Default::default()
        };

        let (first_data, _first_control) = bind_pair(LOCALHOST, &config).unwrap();
        let (second_data, _second_control) = bind_pair(LOCALHOST, &config).unwrap();

        let first = first_data.local_addr().unwrap().port();
        let second = second_data.local_addr().unwrap().port();
        assert_ne!(first, second);
        assert_eq!(second % 2, 0);
    }

    #[tokio::test]
    async fn empty_range_is_exhausted() {
        let config = BindConfig {
            port_range: 40400..40400,
            ..Default::default()
        };

        assert!(matches!(
            bind_pair(LOCALHOST, &config),
            Err(BindError::Exhausted { .. })
        ));
        assert!(matches!(
            bind_mux(LOCALHOST, &config),
            Err(BindError::Exhausted { .. })
        ));
    }

    #[tokio::test]
    async fn mux_binds_a_single_socket() {
        let config = BindConfig {
            port_range: 40500..40600,
            reuse_address: false,
            ..Default::default()
        };

        let socket = bind_mux(LOCALHOST, &config).unwrap();
        let port = socket.local_addr().unwrap().port();
        assert!(config.port_range.contains(&port));
    }
}
