/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds the single-byte length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The buffer does not yet contain a complete frame.
    ///
    /// Not a terminal condition: the caller should keep buffering bytes
    /// from the stream and try again.
    #[error("incomplete frame (need more bytes)")]
    Incomplete,

    /// The frame body is too short to hold address, command, length and
    /// checksum.
    #[error("frame body truncated ({len} bytes, need at least {min})", min = crate::codec::FRAME_OVERHEAD)]
    Truncated { len: usize },

    /// The declared payload length disagrees with the received payload.
    #[error("frame length mismatch (declared {declared} bytes, got {actual})")]
    LengthMismatch { declared: usize, actual: usize },

    /// The received checksum does not match the recomputed one.
    #[error("frame checksum mismatch (received 0x{received:02X}, computed 0x{computed:02X})")]
    Checksum { received: u8, computed: u8 },
}

pub type Result<T> = std::result::Result<T, FrameError>;
