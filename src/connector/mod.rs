//! The stream connector contract and its default implementation.
//!
//! A stream connector bundles the pair of transport endpoints a media stream
//! uses: one for data traffic (e.g. RTP) and one for control traffic
//! (e.g. RTCP). The endpoints are exposed as shareable handles so they can
//! be used by the media code and by other layers which need the same
//! sockets, like an ICE implementation.

mod bind;
mod core;

pub use bind::{bind_mux, bind_pair, BindConfig, BindError};
pub use core::{Channels, Connector};

use std::sync::Arc;

use crate::info::Protocol;
use crate::socket::{TcpStream, UdpSocket};

/// A pair of transport endpoints for a media stream's data and control
/// traffic.
///
/// Exactly one protocol family is populated per connector, determined by
/// [`protocol`][StreamConnector::protocol]: the datagram accessors return a
/// handle only for UDP connectors, the stream accessors only for TCP
/// connectors. Absence (`None`) is a capability signal, not an error — it
/// means the requested family is not the one this connector carries, or the
/// connector has been closed.
///
/// A connector is usable from construction and accessors never block. The
/// same connector is typically handed to both the sending and the receiving
/// half of a pipeline, so every operation must be safe to invoke
/// concurrently; once [`close`][StreamConnector::close] returns, no accessor
/// yields an endpoint.
pub trait StreamConnector: Send + Sync {
    /// Handle to the socket for data (e.g. RTP) traffic, if this connector
    /// carries UDP.
    fn data_socket(&self) -> Option<UdpSocket>;

    /// Handle to the socket for control (e.g. RTCP) traffic, if this
    /// connector carries UDP.
    ///
    /// Under rtcp-mux this is a handle to the same socket as
    /// [`data_socket`][StreamConnector::data_socket].
    fn control_socket(&self) -> Option<UdpSocket>;

    /// Handle to the stream for data traffic, if this connector carries TCP.
    fn data_stream(&self) -> Option<TcpStream>;

    /// Handle to the stream for control traffic, if this connector carries
    /// TCP.
    ///
    /// Under rtcp-mux this is a handle to the same stream as
    /// [`data_stream`][StreamConnector::data_stream].
    fn control_stream(&self) -> Option<TcpStream>;

    /// The transport protocol of this connector. Fixed for the instance
    /// lifetime, and still answerable after `close`.
    fn protocol(&self) -> Protocol;

    /// Whether this connector uses rtcp-mux, that is, whether its data and
    /// control endpoints share the same local address and port.
    fn is_rtcp_mux(&self) -> bool;

    /// Notification that utilization of the endpoints for data and/or
    /// control traffic has started. Advisory and idempotent.
    fn started(&self);

    /// Notification that utilization of the endpoints has temporarily
    /// stopped. Advisory and idempotent; the connector can be started again
    /// later.
    fn stopped(&self);

    /// Release the endpoints held by this connector. Idempotent; after the
    /// first call returns, every endpoint accessor yields `None`.
    fn close(&self);
}

macro_rules! forward_connector_body {
    () => {
        fn data_socket(&self) -> Option<UdpSocket> {
            (**self).data_socket()
        }

        fn control_socket(&self) -> Option<UdpSocket> {
            (**self).control_socket()
        }

        fn data_stream(&self) -> Option<TcpStream> {
            (**self).data_stream()
        }

        fn control_stream(&self) -> Option<TcpStream> {
            (**self).control_stream()
        }

        fn protocol(&self) -> Protocol {
            (**self).protocol()
        }

        fn is_rtcp_mux(&self) -> bool {
            (**self).is_rtcp_mux()
        }

        fn started(&self) {
            (**self).started()
        }

        fn stopped(&self) {
            (**self).stopped()
        }

        fn close(&self) {
            (**self).close()
        }
    };
}

impl<C: StreamConnector + ?Sized> StreamConnector for Arc<C> {
    forward_connector_body!();
}

impl<C: StreamConnector + ?Sized> StreamConnector for Box<C> {
    forward_connector_body!();
}

impl<'a, C: StreamConnector + ?Sized> StreamConnector for &'a C {
    forward_connector_body!();
}
