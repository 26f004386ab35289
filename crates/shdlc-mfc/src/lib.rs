//! Driver for Sensirion SFC5xxx mass flow controllers.
//!
//! Builds on [`shdlc_link`] with the command catalog of the SFC5xxx
//! family and a typed device facade:
//!
//! - [`Mfc`], the facade binding a device address on a shared
//!   [`shdlc_link::Connection`],
//! - [`commands`], the individual command descriptors for callers that
//!   want to drive the link layer directly,
//! - medium unit vocabulary ([`MediumUnit`] and friends) and response
//!   types ([`Version`], [`DeviceStatus`], [`BufferRead`]).
//!
//! Device-rejected commands surface as [`MfcError::Device`] with the
//! error code resolved to a message.

pub mod commands;
mod definitions;
mod device;
mod device_errors;
mod error;
mod types;
mod units;

pub use definitions::{Scaling, ValveInputSource};
pub use device::Mfc;
pub use device_errors::device_error_message;
pub use error::{MfcError, Result};
pub use types::{
    BufferDrain, BufferRead, DeviceStatus, FirmwareVersion, HardwareVersion, ProtocolVersion,
    Version,
};
pub use units::{FlowUnit, MediumUnit, TimeBase, UnitPrefix};
