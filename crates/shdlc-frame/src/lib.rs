//! SHDLC frame encoding and decoding.
//!
//! Every frame on the wire is delimited by `0x7E` markers and carries:
//! - A 1-byte device address (255 is broadcast)
//! - A 1-byte command id
//! - A 1-byte payload length followed by up to 255 payload bytes
//! - A 1-byte two's-complement checksum
//!
//! Reserved bytes ({0x7E, 0x7D, 0x11, 0x13}) between the outer markers
//! are escaped as `0x7D, byte ^ 0x20`. This crate is pure: no I/O, no
//! timing, just bytes in and bytes out.

pub mod codec;
pub mod error;

pub use codec::{
    checksum, decode_frame, encode_frame, frame_complete, take_frame, Frame, ESCAPE_XOR,
    FRAME_ESCAPE, FRAME_MARKER, FRAME_OVERHEAD, MAX_PAYLOAD, RESERVED_BYTES,
};
pub use error::{FrameError, Result};
