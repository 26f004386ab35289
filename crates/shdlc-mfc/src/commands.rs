//! Command descriptors understood by the flow controller.
//!
//! The link engine strips the leading state byte from every response
//! and raises rejected commands as device errors, so the descriptors
//! here only declare and decode the data that follows it. Response-time
//! budgets are per command and reflect real device processing cost.

use std::ops::RangeInclusive;
use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};

use shdlc_link::{Command, LinkError, Result};

use crate::definitions::{Scaling, ValveInputSource};
use crate::types::{DeviceStatus, FirmwareVersion, HardwareVersion, ProtocolVersion, Version};
use crate::units::{FlowUnit, MediumUnit, TimeBase, UnitPrefix};

fn be_f32(data: &[u8]) -> f32 {
    f32::from_be_bytes(data[..4].try_into().unwrap())
}

fn be_u32(data: &[u8]) -> u32 {
    u32::from_be_bytes(data[..4].try_into().unwrap())
}

/// SHDLC command 0xD1: "Get Version".
#[derive(Debug, Clone, Copy)]
pub struct GetVersion;

impl Command for GetVersion {
    type Response = Version;

    fn command_id(&self) -> u8 {
        0xD1
    }

    fn response_length(&self) -> RangeInclusive<usize> {
        7..=7
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(10)
    }

    fn interpret_response(&self, data: &[u8]) -> Result<Version> {
        Ok(Version {
            firmware: FirmwareVersion {
                major: data[0],
                minor: data[1],
                debug: data[2] != 0,
            },
            hardware: HardwareVersion {
                major: data[3],
                minor: data[4],
            },
            protocol: ProtocolVersion {
                major: data[5],
                minor: data[6],
            },
        })
    }
}

/// Which device information string to request with command 0xD0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceInformation {
    ProductName = 0x01,
    ArticleCode = 0x02,
    SerialNumber = 0x03,
}

/// SHDLC command 0xD0: "Get Device Information".
#[derive(Debug, Clone, Copy)]
pub struct GetDeviceInformation(pub DeviceInformation);

impl Command for GetDeviceInformation {
    type Response = String;

    fn command_id(&self) -> u8 {
        0xD0
    }

    fn parameters(&self) -> Bytes {
        Bytes::copy_from_slice(&[self.0 as u8])
    }

    fn response_length(&self) -> RangeInclusive<usize> {
        1..=254
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(10)
    }

    fn interpret_response(&self, data: &[u8]) -> Result<String> {
        // The string is ASCII, padded with a trailing NUL.
        let data = data.strip_suffix(&[0]).unwrap_or(data);
        String::from_utf8(data.to_vec())
            .map_err(|err| LinkError::MalformedResponse(format!("device information: {err}")))
    }
}

/// SHDLC command 0xD3: "Device Reset".
///
/// Reboots the firmware, similar to a power cycle. The device needs a
/// long settle time before it accepts the next command.
#[derive(Debug, Clone, Copy)]
pub struct DeviceReset;

impl Command for DeviceReset {
    type Response = ();

    fn command_id(&self) -> u8 {
        0xD3
    }

    fn response_length(&self) -> RangeInclusive<usize> {
        0..=0
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(500)
    }

    fn post_processing_time(&self) -> Duration {
        Duration::from_secs(2)
    }

    fn interpret_response(&self, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// SHDLC command 0xD2: "Read Device Status".
#[derive(Debug, Clone, Copy)]
pub struct ReadDeviceStatus {
    /// Clear the error state after reading it.
    pub clear: bool,
}

impl Command for ReadDeviceStatus {
    type Response = DeviceStatus;

    fn command_id(&self) -> u8 {
        0xD2
    }

    fn parameters(&self) -> Bytes {
        Bytes::copy_from_slice(&[u8::from(self.clear)])
    }

    fn response_length(&self) -> RangeInclusive<usize> {
        5..=5
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(10)
    }

    fn interpret_response(&self, data: &[u8]) -> Result<DeviceStatus> {
        Ok(DeviceStatus {
            flags: be_u32(data),
            last_error: data[4],
        })
    }
}

/// SHDLC command 0x90: "Get Slave Address".
#[derive(Debug, Clone, Copy)]
pub struct GetSlaveAddress;

impl Command for GetSlaveAddress {
    type Response = u8;

    fn command_id(&self) -> u8 {
        0x90
    }

    fn response_length(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(5)
    }

    fn interpret_response(&self, data: &[u8]) -> Result<u8> {
        Ok(data[0])
    }
}

/// SHDLC command 0x90: "Set Slave Address".
///
/// Stored in non-volatile memory; further traffic must use the new
/// address.
#[derive(Debug, Clone, Copy)]
pub struct SetSlaveAddress {
    pub address: u8,
}

impl Command for SetSlaveAddress {
    type Response = ();

    fn command_id(&self) -> u8 {
        0x90
    }

    fn parameters(&self) -> Bytes {
        Bytes::copy_from_slice(&[self.address])
    }

    fn response_length(&self) -> RangeInclusive<usize> {
        0..=0
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(5)
    }

    fn post_processing_time(&self) -> Duration {
        // Non-volatile write.
        Duration::from_millis(50)
    }

    fn interpret_response(&self, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// SHDLC command 0x91: "Get Baudrate".
#[derive(Debug, Clone, Copy)]
pub struct GetBaudrate;

impl Command for GetBaudrate {
    type Response = u32;

    fn command_id(&self) -> u8 {
        0x91
    }

    fn response_length(&self) -> RangeInclusive<usize> {
        4..=4
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(10)
    }

    fn interpret_response(&self, data: &[u8]) -> Result<u32> {
        Ok(be_u32(data))
    }
}

/// SHDLC command 0x91: "Set Baudrate".
///
/// Stored in non-volatile memory and thus persists across resets.
/// Allowed values are 9600, 19200, 38400, 115200, 230400 and 460800.
#[derive(Debug, Clone, Copy)]
pub struct SetBaudrate {
    pub baud_rate: u32,
}

impl Command for SetBaudrate {
    type Response = ();

    fn command_id(&self) -> u8 {
        0x91
    }

    fn parameters(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(4);
        buf.put_u32(self.baud_rate);
        buf.freeze()
    }

    fn response_length(&self) -> RangeInclusive<usize> {
        0..=0
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(10)
    }

    fn post_processing_time(&self) -> Duration {
        Duration::from_millis(50)
    }

    fn interpret_response(&self, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// SHDLC command 0x00: "Get Setpoint".
#[derive(Debug, Clone, Copy)]
pub struct GetSetpoint {
    pub scaling: Scaling,
}

impl Command for GetSetpoint {
    type Response = f32;

    fn command_id(&self) -> u8 {
        0x00
    }

    fn parameters(&self) -> Bytes {
        Bytes::copy_from_slice(&[self.scaling.into()])
    }

    fn response_length(&self) -> RangeInclusive<usize> {
        4..=4
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(5)
    }

    fn interpret_response(&self, data: &[u8]) -> Result<f32> {
        Ok(be_f32(data))
    }
}

/// SHDLC command 0x00: "Set Setpoint".
#[derive(Debug, Clone, Copy)]
pub struct SetSetpoint {
    pub setpoint: f32,
    pub scaling: Scaling,
}

impl Command for SetSetpoint {
    type Response = ();

    fn command_id(&self) -> u8 {
        0x00
    }

    fn parameters(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(5);
        buf.put_u8(self.scaling.into());
        buf.put_f32(self.setpoint);
        buf.freeze()
    }

    fn response_length(&self) -> RangeInclusive<usize> {
        0..=0
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(5)
    }

    fn interpret_response(&self, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// SHDLC command 0x03: "Set Setpoint And Read Measured Value".
///
/// Combined write/read saving one exchange on the bus.
#[derive(Debug, Clone, Copy)]
pub struct SetSetpointAndReadMeasuredValue {
    pub setpoint: f32,
    pub scaling: Scaling,
}

impl Command for SetSetpointAndReadMeasuredValue {
    type Response = f32;

    fn command_id(&self) -> u8 {
        0x03
    }

    fn parameters(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(5);
        buf.put_u8(self.scaling.into());
        buf.put_f32(self.setpoint);
        buf.freeze()
    }

    fn response_length(&self) -> RangeInclusive<usize> {
        4..=4
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(5)
    }

    fn interpret_response(&self, data: &[u8]) -> Result<f32> {
        Ok(be_f32(data))
    }
}

/// SHDLC command 0x08: "Read Measured Value".
#[derive(Debug, Clone, Copy)]
pub struct ReadMeasuredValue {
    pub scaling: Scaling,
}

impl Command for ReadMeasuredValue {
    type Response = f32;

    fn command_id(&self) -> u8 {
        0x08
    }

    fn parameters(&self) -> Bytes {
        Bytes::copy_from_slice(&[self.scaling.into()])
    }

    fn response_length(&self) -> RangeInclusive<usize> {
        4..=4
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(5)
    }

    fn interpret_response(&self, data: &[u8]) -> Result<f32> {
        Ok(be_f32(data))
    }
}

/// One chunk of the measured value buffer as returned by a single
/// command 0x09 exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferChunk {
    pub lost_values: u32,
    pub remaining_values: u32,
    /// Sampling interval in seconds.
    pub sampling_time: f32,
    pub values: Vec<f32>,
}

/// SHDLC command 0x09: "Read Measured Value Buffer".
///
/// Returns up to 60 buffered values per exchange; the device removes
/// returned values from its ring buffer.
#[derive(Debug, Clone, Copy)]
pub struct ReadMeasuredValueBuffer {
    pub scaling: Scaling,
}

impl Command for ReadMeasuredValueBuffer {
    type Response = BufferChunk;

    fn command_id(&self) -> u8 {
        0x09
    }

    fn parameters(&self) -> Bytes {
        Bytes::copy_from_slice(&[self.scaling.into()])
    }

    fn response_length(&self) -> RangeInclusive<usize> {
        // lost (4) + remaining (4) + sampling time (4) + 0-60 values
        12..=252
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(20)
    }

    fn interpret_response(&self, data: &[u8]) -> Result<BufferChunk> {
        let tail = &data[12..];
        if tail.len() % 4 != 0 {
            return Err(LinkError::MalformedResponse(format!(
                "buffer values not a multiple of 4 bytes (got {})",
                tail.len()
            )));
        }
        Ok(BufferChunk {
            lost_values: be_u32(data),
            remaining_values: be_u32(&data[4..]),
            sampling_time: be_f32(&data[8..]),
            values: tail.chunks_exact(4).map(be_f32).collect(),
        })
    }
}

/// SHDLC command 0x20, subcommand 0x00: "Get Valve Input Source".
#[derive(Debug, Clone, Copy)]
pub struct GetValveInputSource;

impl Command for GetValveInputSource {
    type Response = ValveInputSource;

    fn command_id(&self) -> u8 {
        0x20
    }

    fn parameters(&self) -> Bytes {
        Bytes::copy_from_slice(&[0x00])
    }

    fn response_length(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(5)
    }

    fn interpret_response(&self, data: &[u8]) -> Result<ValveInputSource> {
        ValveInputSource::try_from(data[0])
            .map_err(|value| LinkError::MalformedResponse(format!("valve input source {value}")))
    }
}

/// SHDLC command 0x20, subcommand 0x00: "Set Valve Input Source".
///
/// Volatile: reverts to [`ValveInputSource::Controller`] after a reset.
#[derive(Debug, Clone, Copy)]
pub struct SetValveInputSource {
    pub source: ValveInputSource,
}

impl Command for SetValveInputSource {
    type Response = ();

    fn command_id(&self) -> u8 {
        0x20
    }

    fn parameters(&self) -> Bytes {
        Bytes::copy_from_slice(&[0x00, self.source.into()])
    }

    fn response_length(&self) -> RangeInclusive<usize> {
        0..=0
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(5)
    }

    fn interpret_response(&self, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// SHDLC command 0x20, subcommand 0x01: "Get User Defined Valve Value".
#[derive(Debug, Clone, Copy)]
pub struct GetUserDefinedValveValue;

impl Command for GetUserDefinedValveValue {
    type Response = f32;

    fn command_id(&self) -> u8 {
        0x20
    }

    fn parameters(&self) -> Bytes {
        Bytes::copy_from_slice(&[0x01])
    }

    fn response_length(&self) -> RangeInclusive<usize> {
        4..=4
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(5)
    }

    fn interpret_response(&self, data: &[u8]) -> Result<f32> {
        Ok(be_f32(data))
    }
}

/// SHDLC command 0x20, subcommand 0x01: "Set User Defined Valve Value".
///
/// Value is normalized: 0.0 is fully closed, 1.0 fully open. Only
/// effective while the input source is [`ValveInputSource::UserDefined`].
#[derive(Debug, Clone, Copy)]
pub struct SetUserDefinedValveValue {
    pub value: f32,
}

impl Command for SetUserDefinedValveValue {
    type Response = ();

    fn command_id(&self) -> u8 {
        0x20
    }

    fn parameters(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(5);
        buf.put_u8(0x01);
        buf.put_f32(self.value);
        buf.freeze()
    }

    fn response_length(&self) -> RangeInclusive<usize> {
        0..=0
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(5)
    }

    fn interpret_response(&self, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// SHDLC command 0x22, subcommand 0x00: "Get User Controller Gain".
#[derive(Debug, Clone, Copy)]
pub struct GetUserControllerGain;

impl Command for GetUserControllerGain {
    type Response = f32;

    fn command_id(&self) -> u8 {
        0x22
    }

    fn parameters(&self) -> Bytes {
        Bytes::copy_from_slice(&[0x00])
    }

    fn response_length(&self) -> RangeInclusive<usize> {
        4..=4
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(5)
    }

    fn interpret_response(&self, data: &[u8]) -> Result<f32> {
        Ok(be_f32(data))
    }
}

/// SHDLC command 0x22, subcommand 0x00: "Set User Controller Gain".
#[derive(Debug, Clone, Copy)]
pub struct SetUserControllerGain {
    pub gain: f32,
}

impl Command for SetUserControllerGain {
    type Response = ();

    fn command_id(&self) -> u8 {
        0x22
    }

    fn parameters(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(5);
        buf.put_u8(0x00);
        buf.put_f32(self.gain);
        buf.freeze()
    }

    fn response_length(&self) -> RangeInclusive<usize> {
        0..=0
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(5)
    }

    fn interpret_response(&self, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// SHDLC command 0x21: "Get User Defined Medium Unit".
#[derive(Debug, Clone, Copy)]
pub struct GetUserDefinedMediumUnit;

impl Command for GetUserDefinedMediumUnit {
    type Response = MediumUnit;

    fn command_id(&self) -> u8 {
        0x21
    }

    fn response_length(&self) -> RangeInclusive<usize> {
        3..=3
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(5)
    }

    fn interpret_response(&self, data: &[u8]) -> Result<MediumUnit> {
        let prefix = UnitPrefix::try_from(data[0] as i8)
            .map_err(|value| LinkError::MalformedResponse(format!("unit prefix {value}")))?;
        let unit = FlowUnit::try_from(data[1])
            .map_err(|value| LinkError::MalformedResponse(format!("flow unit {value}")))?;
        let timebase = TimeBase::try_from(data[2])
            .map_err(|value| LinkError::MalformedResponse(format!("unit time base {value}")))?;
        Ok(MediumUnit::new(prefix, unit, timebase))
    }
}

/// SHDLC command 0x21: "Set User Defined Medium Unit".
#[derive(Debug, Clone, Copy)]
pub struct SetUserDefinedMediumUnit {
    pub unit: MediumUnit,
}

impl Command for SetUserDefinedMediumUnit {
    type Response = ();

    fn command_id(&self) -> u8 {
        0x21
    }

    fn parameters(&self) -> Bytes {
        Bytes::copy_from_slice(&[
            i8::from(self.unit.prefix) as u8,
            self.unit.unit.into(),
            self.unit.timebase.into(),
        ])
    }

    fn response_length(&self) -> RangeInclusive<usize> {
        0..=0
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(5)
    }

    fn interpret_response(&self, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}
