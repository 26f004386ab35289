//! Serial transport layer for SHDLC devices.
//!
//! Owns the physical byte stream and a deadline-aware receive loop,
//! nothing more: framing, retries and protocol knowledge live in the
//! layers above. The [`Channel`] is generic over any `Read + Write`
//! stream so tests can run against in-memory mocks; [`SerialStream`]
//! is the real hardware backend.

pub mod channel;
pub mod config;
pub mod error;
pub mod serial;

pub use channel::Channel;
pub use config::{
    PortConfig, BROADCAST_ADDRESS, DEFAULT_BAUD_RATE, DEFAULT_POLL_INTERVAL, DEVICE_ADDRESS_MAX,
};
pub use error::{Result, TransportError};
pub use serial::SerialStream;
