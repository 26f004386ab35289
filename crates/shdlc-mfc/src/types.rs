use std::time::Duration;

use crate::definitions::Scaling;

/// Firmware version with its debug flag.
///
/// Officially released firmware always has `debug == false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub debug: bool,
}

/// Hardware version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HardwareVersion {
    pub major: u8,
    pub minor: u8,
}

/// SHDLC protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProtocolVersion {
    pub major: u8,
    pub minor: u8,
}

/// Combined version information reported by the "get version" command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Version {
    pub firmware: FirmwareVersion,
    pub hardware: HardwareVersion,
    pub protocol: ProtocolVersion,
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Firmware {}.{}{}, Hardware {}.{}, Protocol {}.{}",
            self.firmware.major,
            self.firmware.minor,
            if self.firmware.debug { "-debug" } else { "" },
            self.hardware.major,
            self.hardware.minor,
            self.protocol.major,
            self.protocol.minor,
        )
    }
}

/// Device status word and the last device error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceStatus {
    /// Device status flags.
    pub flags: u32,
    /// Code of the most recent device error, 0 if none.
    pub last_error: u8,
}

/// Whether a buffer read drained the device-side ring buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BufferDrain {
    /// The whole buffer was read out.
    Complete,
    /// The read cap was reached with values still in the buffer. The
    /// device produced values faster than they could be fetched.
    Partial { remaining: u32 },
}

/// Result of draining the measured value buffer.
///
/// The device stores measured flow values in an internal ring buffer at
/// a fixed sampling interval. Draining it takes several commands since
/// one frame holds at most 60 values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferRead {
    /// Scaling the values were read with.
    pub scaling: Scaling,
    /// How many read commands were issued.
    pub read_count: usize,
    /// Values lost to buffer overrun since the last drain. Overrun can
    /// be expected behavior when sampling outpaces polling, so this is
    /// reported rather than raised as an error.
    pub lost_values: u32,
    /// Sampling interval of the buffered values.
    pub sampling_time: Duration,
    /// The measured values, oldest first.
    pub values: Vec<f32>,
    /// Whether the buffer was drained completely.
    pub drain: BufferDrain,
}

impl BufferRead {
    /// True if the device buffer was empty when the drain finished.
    pub fn is_complete(&self) -> bool {
        matches!(self.drain, BufferDrain::Complete)
    }
}
