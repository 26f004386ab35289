/// Scaling variants with their byte values on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Scaling {
    /// Normalized to the range [0, 1].
    Normalized = 0x00,
    /// Physical value with unit and fullscale of the calibration.
    Physical = 0x01,
    /// User defined unit and scaling as configured.
    UserDefined = 0x02,
}

impl From<Scaling> for u8 {
    fn from(scaling: Scaling) -> u8 {
        scaling as u8
    }
}

/// Valve input sources with their byte values on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ValveInputSource {
    /// Driven by the flow controller (default).
    Controller = 0x00,
    /// Force closed: the valve remains fully closed.
    ForceClosed = 0x01,
    /// Force open: the valve remains fully open.
    ForceOpen = 0x02,
    /// Hold the current voltage on the valve.
    Hold = 0x03,
    /// Apply the configured user defined value.
    UserDefined = 0x10,
}

impl From<ValveInputSource> for u8 {
    fn from(source: ValveInputSource) -> u8 {
        source as u8
    }
}

impl TryFrom<u8> for ValveInputSource {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0x00 => Ok(ValveInputSource::Controller),
            0x01 => Ok(ValveInputSource::ForceClosed),
            0x02 => Ok(ValveInputSource::ForceOpen),
            0x03 => Ok(ValveInputSource::Hold),
            0x10 => Ok(ValveInputSource::UserDefined),
            other => Err(other),
        }
    }
}
