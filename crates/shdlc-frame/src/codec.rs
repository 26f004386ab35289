use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Start/stop marker delimiting every frame on the wire.
pub const FRAME_MARKER: u8 = 0x7E;

/// Escape introducer for reserved bytes inside the frame body.
pub const FRAME_ESCAPE: u8 = 0x7D;

/// XOR applied to a reserved byte when escaping it.
pub const ESCAPE_XOR: u8 = 0x20;

/// Bytes that must be escaped inside the frame body (marker, escape,
/// XON, XOFF).
pub const RESERVED_BYTES: [u8; 4] = [0x7E, 0x7D, 0x11, 0x13];

/// Maximum payload size: the length field is a single byte.
pub const MAX_PAYLOAD: usize = 255;

/// Unescaped body overhead: address (1) + command (1) + length (1) +
/// checksum (1).
pub const FRAME_OVERHEAD: usize = 4;

/// A decoded frame: address, command id and raw payload.
///
/// Constructed per request/response exchange and discarded after
/// consumption. The checksum is recomputed on encode and verified on
/// decode; it never appears here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Device address (0-254) or 255 for broadcast.
    pub address: u8,
    /// Command id.
    pub command: u8,
    /// Raw command payload, up to 255 bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(address: u8, command: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            address,
            command,
            payload: payload.into(),
        }
    }
}

/// Two's-complement checksum over address, command, length and payload.
pub fn checksum(address: u8, command: u8, payload: &[u8]) -> u8 {
    let mut sum = address
        .wrapping_add(command)
        .wrapping_add(payload.len() as u8);
    for &byte in payload {
        sum = sum.wrapping_add(byte);
    }
    !sum
}

fn put_escaped(dst: &mut BytesMut, byte: u8) {
    if RESERVED_BYTES.contains(&byte) {
        dst.put_u8(FRAME_ESCAPE);
        dst.put_u8(byte ^ ESCAPE_XOR);
    } else {
        dst.put_u8(byte);
    }
}

/// Encode a frame into the wire format.
///
/// Wire format (before escaping):
/// ```text
/// ┌──────┬─────────┬─────────┬────────┬──────────┬──────────┬──────┐
/// │ 0x7E │ Address │ Command │ Length │ Payload  │ Checksum │ 0x7E │
/// │      │ (1B)    │ (1B)    │ (1B)   │ (0-255B) │ (1B)     │      │
/// └──────┴─────────┴─────────┴────────┴──────────┴──────────┴──────┘
/// ```
///
/// Every reserved byte between the outer markers is replaced by
/// `0x7D, byte ^ 0x20`. Pure and deterministic, no I/O.
pub fn encode_frame(address: u8, command: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    // Worst case every body byte is escaped.
    dst.reserve(2 + 2 * (FRAME_OVERHEAD + payload.len()));
    dst.put_u8(FRAME_MARKER);
    put_escaped(dst, address);
    put_escaped(dst, command);
    put_escaped(dst, payload.len() as u8);
    for &byte in payload {
        put_escaped(dst, byte);
    }
    put_escaped(dst, checksum(address, command, payload));
    dst.put_u8(FRAME_MARKER);
    Ok(())
}

/// Locate the escaped body of the first complete frame in `buf`.
///
/// Leading noise and runs of adjacent markers (a stop marker directly
/// followed by a start marker) are skipped. Returns `(body, end)` where
/// `end` is the index of the closing marker.
fn frame_span(buf: &[u8]) -> Option<(&[u8], usize)> {
    let start = buf.iter().position(|&b| b == FRAME_MARKER)?;
    let mut body_start = start;
    while body_start < buf.len() && buf[body_start] == FRAME_MARKER {
        body_start += 1;
    }
    let end = buf[body_start..]
        .iter()
        .position(|&b| b == FRAME_MARKER)?
        + body_start;
    Some((&buf[body_start..end], end))
}

/// Returns true if `buf` contains a complete marker-delimited frame.
///
/// Intended as the receive predicate for a transport channel: once this
/// is true, [`take_frame`] will make progress.
pub fn frame_complete(buf: &[u8]) -> bool {
    frame_span(buf).is_some()
}

fn unescape(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len());
    let mut iter = body.iter();
    while let Some(&byte) = iter.next() {
        if byte == FRAME_ESCAPE {
            // A trailing escape with nothing after it is dropped; the
            // length check below reports the corruption.
            if let Some(&escaped) = iter.next() {
                out.push(escaped ^ ESCAPE_XOR);
            }
        } else {
            out.push(byte);
        }
    }
    out
}

/// Decode and validate one complete frame from raw received bytes.
///
/// All-or-nothing: a malformed frame yields an error, never a partial
/// result. Returns [`FrameError::Incomplete`] while no closing marker
/// has arrived yet (including a lone escape byte at end-of-stream);
/// callers should keep buffering in that case.
pub fn decode_frame(raw: &[u8]) -> Result<Frame> {
    let (body, _) = frame_span(raw).ok_or(FrameError::Incomplete)?;
    let body = unescape(body);
    if body.len() < FRAME_OVERHEAD {
        return Err(FrameError::Truncated { len: body.len() });
    }
    let declared = body[2] as usize;
    let actual = body.len() - FRAME_OVERHEAD;
    if declared != actual {
        return Err(FrameError::LengthMismatch { declared, actual });
    }
    let received = body[body.len() - 1];
    let computed = checksum(body[0], body[1], &body[3..3 + actual]);
    if received != computed {
        return Err(FrameError::Checksum { received, computed });
    }
    Ok(Frame {
        address: body[0],
        command: body[1],
        payload: Bytes::copy_from_slice(&body[3..3 + actual]),
    })
}

/// Decode the first complete frame in `src`, consuming its bytes.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame
/// yet. On a complete frame the span up to and including its closing
/// marker is consumed, whether decoding succeeded or not, so a caller
/// can skip corrupted or foreign frames and keep reading.
pub fn take_frame(src: &mut BytesMut) -> Result<Option<Frame>> {
    let Some((_, end)) = frame_span(src) else {
        return Ok(None); // Need more data
    };
    let result = decode_frame(&src[..=end]);
    src.advance(end + 1);
    // The span is complete, so decode cannot report Incomplete here; a
    // dangling escape inside it surfaces as a length/truncation error.
    result.map(Some)
}
