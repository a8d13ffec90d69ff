//! Protocol identity and address semantics for connectors.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The transport protocol carried by a stream connector.
///
/// Fixed at construction for the lifetime of a connector: a connector
/// carries datagram endpoints or stream endpoints, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Connectionless datagram transport.
    Udp,

    /// Connection-oriented stream transport.
    Tcp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Udp => write!(f, "udp"),
            Self::Tcp => write!(f, "tcp"),
        }
    }
}

/// Error parsing an unrecognized protocol name.
#[derive(Debug, Error)]
#[error("invalid protocol")]
pub struct InvalidProtocol;

impl FromStr for Protocol {
    type Err = InvalidProtocol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "udp" | "UDP" => Ok(Self::Udp),
            "tcp" | "TCP" => Ok(Self::Tcp),
            _ => Err(InvalidProtocol),
        }
    }
}

/// Canonicalize a socket address, converting IPv4 addresses which are
/// mapped into IPv6 addresses into standard IPv4 addresses.
///
/// Address comparisons (e.g. "do data and control share a local address?")
/// are only meaningful on canonical addresses.
pub(crate) fn make_canonical(addr: std::net::SocketAddr) -> std::net::SocketAddr {
    match addr.ip() {
        std::net::IpAddr::V4(_) => addr,
        std::net::IpAddr::V6(ip) => {
            if let Some(ip) = ip.to_ipv4_mapped() {
                std::net::SocketAddr::new(std::net::IpAddr::V4(ip), addr.port())
            } else {
                addr
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_display() {
        assert_eq!(Protocol::Udp.to_string(), "udp");
        assert_eq!(Protocol::Tcp.to_string(), "tcp");
    }

    #[test]
    fn parse_protocol() {
        assert_eq!(Protocol::from_str("udp").unwrap(), Protocol::Udp);
        assert_eq!(Protocol::from_str("UDP").unwrap(), Protocol::Udp);
        assert_eq!(Protocol::from_str("tcp").unwrap(), Protocol::Tcp);
        assert_eq!(Protocol::from_str("TCP").unwrap(), Protocol::Tcp);
        assert!(Protocol::from_str("sctp").is_err());
    }

    #[test]
    fn canonical_addresses() {
        let addr: std::net::SocketAddr = "[::ffff:127.0.0.1]:5004".parse().unwrap();
        assert_eq!(
            make_canonical(addr),
            "127.0.0.1:5004".parse::<std::net::SocketAddr>().unwrap()
        );

        let addr: std::net::SocketAddr = "[::1]:5004".parse().unwrap();
        assert_eq!(make_canonical(addr), addr);

        let addr: std::net::SocketAddr = "10.0.0.1:5004".parse().unwrap();
        assert_eq!(make_canonical(addr), addr);
    }
}
