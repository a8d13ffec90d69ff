//! Duet
//!
//! Paired data and control transport endpoints for real-time media streams.
//!
//! A media stream moves its traffic over two coupled channels: a data channel
//! (e.g. RTP) and a control channel (e.g. RTCP). The [`StreamConnector`]
//! trait is the contract for a handle bundling those two endpoints, so that
//! the sockets can be shared between media code and other layers which need
//! them, such as an ICE agent. [`Connector`] is the default thread-safe
//! implementation, and [`connector::bind_pair`] allocates the conventional
//! adjacent-port UDP socket pair for a new stream.

pub mod connector;
pub mod info;
pub mod socket;

pub use connector::Connector;
pub use connector::StreamConnector;
pub use info::Protocol;
