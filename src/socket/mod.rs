//! Shareable socket handles for connector endpoints.
//!
//! A connector hands the same endpoint to more than one party — typically a
//! sending path and a receiving path of the media pipeline, and sometimes an
//! ICE agent on top. The handle types here wrap the tokio socket types in
//! shared ownership so that cloning a handle is cheap and every clone refers
//! to the same underlying socket.

pub mod tcp;
pub mod udp;

pub use tcp::TcpStream;
pub use udp::UdpSocket;
