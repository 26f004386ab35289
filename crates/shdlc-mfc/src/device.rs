use std::io::{Read, Write};
use std::time::Duration;

use tracing::debug;

use shdlc_link::{Connection, LinkError};

use crate::commands::{
    DeviceInformation, DeviceReset, GetBaudrate, GetDeviceInformation, GetSetpoint,
    GetSlaveAddress, GetUserControllerGain, GetUserDefinedMediumUnit, GetUserDefinedValveValue,
    GetValveInputSource, GetVersion, ReadDeviceStatus, ReadMeasuredValue, ReadMeasuredValueBuffer,
    SetBaudrate, SetSetpoint, SetSetpointAndReadMeasuredValue, SetSlaveAddress,
    SetUserControllerGain, SetUserDefinedMediumUnit, SetUserDefinedValveValue,
    SetValveInputSource,
};
use crate::definitions::{Scaling, ValveInputSource};
use crate::error::Result;
use crate::types::{BufferDrain, BufferRead, DeviceStatus, Version};
use crate::units::MediumUnit;

/// Typed facade for one mass flow controller on a shared connection.
///
/// The facade is a thin borrow: several devices on the same bus can be
/// driven through one [`Connection`], each with its own address, and the
/// connection serializes their traffic.
///
/// ```no_run
/// use shdlc_mfc::{Mfc, Scaling};
/// use shdlc_link::Connection;
/// use shdlc_transport::PortConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let connection = Connection::open(&PortConfig::new("/dev/ttyUSB0"))?;
/// let mfc = Mfc::new(&connection, 0);
/// mfc.set_setpoint(0.5, Scaling::Normalized)?;
/// println!("flow: {}", mfc.read_measured_value(Scaling::Physical)?);
/// # Ok(())
/// # }
/// ```
pub struct Mfc<'bus, P> {
    connection: &'bus Connection<P>,
    address: u8,
}

impl<'bus, P: Read + Write> Mfc<'bus, P> {
    /// Bind a device address on the given connection.
    pub fn new(connection: &'bus Connection<P>, address: u8) -> Self {
        Self {
            connection,
            address,
        }
    }

    /// The bound device address.
    pub fn address(&self) -> u8 {
        self.address
    }

    fn execute<C: shdlc_link::Command>(&self, command: &C) -> Result<C::Response> {
        self.connection
            .execute(self.address, command)
            .map_err(Into::into)
    }

    /// Firmware, hardware and protocol versions.
    pub fn get_version(&self) -> Result<Version> {
        self.execute(&GetVersion)
    }

    /// Product name, e.g. "SFC5400".
    pub fn get_product_name(&self) -> Result<String> {
        self.execute(&GetDeviceInformation(DeviceInformation::ProductName))
    }

    /// Article code of the device.
    pub fn get_article_code(&self) -> Result<String> {
        self.execute(&GetDeviceInformation(DeviceInformation::ArticleCode))
    }

    /// Serial number of the device.
    pub fn get_serial_number(&self) -> Result<String> {
        self.execute(&GetDeviceInformation(DeviceInformation::SerialNumber))
    }

    /// Reboot the firmware. Blocks through the reboot settle time, so
    /// the device is ready for the next command on return.
    pub fn device_reset(&self) -> Result<()> {
        self.execute(&DeviceReset)
    }

    /// Read the device status word, optionally clearing the error state.
    pub fn read_device_status(&self, clear: bool) -> Result<DeviceStatus> {
        self.execute(&ReadDeviceStatus { clear })
    }

    /// The SHDLC address stored on the device.
    pub fn get_slave_address(&self) -> Result<u8> {
        self.execute(&GetSlaveAddress)
    }

    /// Persist a new SHDLC address and rebind this facade to it.
    ///
    /// The device answers on the old address, then switches.
    pub fn set_slave_address(&mut self, address: u8) -> Result<()> {
        self.execute(&SetSlaveAddress { address })?;
        self.address = address;
        Ok(())
    }

    /// The baud rate stored on the device.
    pub fn get_baudrate(&self) -> Result<u32> {
        self.execute(&GetBaudrate)
    }

    /// Persist a new baud rate. The device answers at the old rate,
    /// then switches; the host port must be reconfigured to match.
    pub fn set_baudrate(&self, baud_rate: u32) -> Result<()> {
        self.execute(&SetBaudrate { baud_rate })
    }

    /// Current flow setpoint.
    pub fn get_setpoint(&self, scaling: Scaling) -> Result<f32> {
        self.execute(&GetSetpoint { scaling })
    }

    /// Set the flow setpoint.
    pub fn set_setpoint(&self, setpoint: f32, scaling: Scaling) -> Result<()> {
        self.execute(&SetSetpoint { setpoint, scaling })
    }

    /// Latest measured flow value.
    pub fn read_measured_value(&self, scaling: Scaling) -> Result<f32> {
        self.execute(&ReadMeasuredValue { scaling })
    }

    /// Set the setpoint and read the measured value in one exchange.
    pub fn set_setpoint_and_read_measured_value(
        &self,
        setpoint: f32,
        scaling: Scaling,
    ) -> Result<f32> {
        self.execute(&SetSetpointAndReadMeasuredValue { setpoint, scaling })
    }

    /// Drain the device-side measured value buffer.
    ///
    /// One exchange returns at most 60 values, so draining loops until
    /// the device reports an empty buffer or `max_reads` exchanges were
    /// issued. A fast-sampling device can refill the buffer while it is
    /// being drained; the cap keeps that from looping forever, and the
    /// result reports the values still pending as
    /// [`BufferDrain::Partial`].
    pub fn read_measured_value_buffer(
        &self,
        scaling: Scaling,
        max_reads: usize,
    ) -> Result<BufferRead> {
        let command = ReadMeasuredValueBuffer { scaling };
        let mut values = Vec::new();
        let mut lost_values = 0u32;
        let mut sampling_time = Duration::ZERO;
        let mut read_count = 0;

        let drain = loop {
            let chunk = self.execute(&command)?;
            read_count += 1;
            lost_values = lost_values.saturating_add(chunk.lost_values);
            if read_count == 1 {
                sampling_time = sampling_duration(chunk.sampling_time)?;
            }
            values.extend_from_slice(&chunk.values);

            if chunk.remaining_values == 0 {
                break BufferDrain::Complete;
            }
            if read_count >= max_reads {
                debug!(
                    remaining = chunk.remaining_values,
                    read_count, "buffer drain capped with values pending"
                );
                break BufferDrain::Partial {
                    remaining: chunk.remaining_values,
                };
            }
        };

        Ok(BufferRead {
            scaling,
            read_count,
            lost_values,
            sampling_time,
            values,
            drain,
        })
    }

    /// What currently drives the valve.
    pub fn get_valve_input_source(&self) -> Result<ValveInputSource> {
        self.execute(&GetValveInputSource)
    }

    /// Select what drives the valve. Volatile, reverts on reset.
    pub fn set_valve_input_source(&self, source: ValveInputSource) -> Result<()> {
        self.execute(&SetValveInputSource { source })
    }

    /// The configured user defined valve value.
    pub fn get_user_defined_valve_value(&self) -> Result<f32> {
        self.execute(&GetUserDefinedValveValue)
    }

    /// Set the valve opening directly, 0.0 (closed) to 1.0 (open).
    /// Only effective with [`ValveInputSource::UserDefined`] selected.
    pub fn set_user_defined_valve_value(&self, value: f32) -> Result<()> {
        self.execute(&SetUserDefinedValveValue { value })
    }

    /// The user controller gain.
    pub fn get_user_controller_gain(&self) -> Result<f32> {
        self.execute(&GetUserControllerGain)
    }

    /// Set the user controller gain, a multiplier on the internal
    /// controller gain. Default 1.0.
    pub fn set_user_controller_gain(&self, gain: f32) -> Result<()> {
        self.execute(&SetUserControllerGain { gain })
    }

    /// The user defined medium unit.
    pub fn get_user_defined_medium_unit(&self) -> Result<MediumUnit> {
        self.execute(&GetUserDefinedMediumUnit)
    }

    /// Set the user defined medium unit used by
    /// [`Scaling::UserDefined`].
    pub fn set_user_defined_medium_unit(&self, unit: MediumUnit) -> Result<()> {
        self.execute(&SetUserDefinedMediumUnit { unit })
    }
}

fn sampling_duration(seconds: f32) -> Result<Duration> {
    Duration::try_from_secs_f32(seconds).map_err(|_| {
        LinkError::MalformedResponse(format!("sampling time {seconds} seconds")).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::ErrorKind;

    use bytes::BytesMut;

    use shdlc_frame::encode_frame;
    use shdlc_link::Connection;
    use shdlc_transport::Channel;

    use crate::error::MfcError;

    struct MockPort {
        responses: VecDeque<Vec<u8>>,
        written: Vec<u8>,
    }

    impl MockPort {
        fn new(responses: Vec<Vec<u8>>) -> Self {
            Self {
                responses: responses.into(),
                written: Vec::new(),
            }
        }
    }

    impl Read for MockPort {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.responses.pop_front() {
                Some(chunk) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                None => Err(std::io::Error::from(ErrorKind::TimedOut)),
            }
        }
    }

    impl Write for MockPort {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn response(address: u8, command: u8, payload: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(address, command, payload, &mut buf).unwrap();
        buf.to_vec()
    }

    fn buffer_payload(lost: u32, remaining: u32, sampling: f32, values: &[f32]) -> Vec<u8> {
        let mut payload = vec![0x00];
        payload.extend_from_slice(&lost.to_be_bytes());
        payload.extend_from_slice(&remaining.to_be_bytes());
        payload.extend_from_slice(&sampling.to_be_bytes());
        for value in values {
            payload.extend_from_slice(&value.to_be_bytes());
        }
        payload
    }

    #[test]
    fn serial_number_through_full_stack() {
        let port = MockPort::new(vec![response(4, 0xD0, b"\x00220401234\x00")]);
        let connection = Connection::new(Channel::new(port));

        let mfc = Mfc::new(&connection, 4);
        assert_eq!(mfc.get_serial_number().unwrap(), "220401234");

        // Request carries the information index as its only parameter.
        let channel = connection.into_channel();
        assert_eq!(channel.into_inner().written, response(4, 0xD0, &[0x03]));
    }

    #[test]
    fn buffer_drain_runs_until_empty() {
        let port = MockPort::new(vec![
            response(0, 0x09, &buffer_payload(1, 2, 0.001, &[1.0, 2.0])),
            response(0, 0x09, &buffer_payload(0, 0, 0.001, &[3.0, 4.0])),
        ]);
        let connection = Connection::new(Channel::new(port));
        let mfc = Mfc::new(&connection, 0);

        let read = mfc
            .read_measured_value_buffer(Scaling::Physical, 10)
            .unwrap();
        assert!(read.is_complete());
        assert_eq!(read.read_count, 2);
        assert_eq!(read.lost_values, 1);
        assert_eq!(read.sampling_time, Duration::from_millis(1));
        assert_eq!(read.values, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn buffer_drain_capped_reports_partial() {
        let port = MockPort::new(vec![
            response(0, 0x09, &buffer_payload(0, 57, 0.0005, &[1.0])),
            response(0, 0x09, &buffer_payload(0, 42, 0.0005, &[2.0])),
        ]);
        let connection = Connection::new(Channel::new(port));
        let mfc = Mfc::new(&connection, 0);

        let read = mfc
            .read_measured_value_buffer(Scaling::Physical, 2)
            .unwrap();
        assert!(!read.is_complete());
        assert_eq!(read.drain, BufferDrain::Partial { remaining: 42 });
        assert_eq!(read.read_count, 2);
        assert_eq!(read.values, vec![1.0, 2.0]);
    }

    #[test]
    fn device_error_resolved_against_registry() {
        // Setpoint rejected with 0x33 "out of valid range".
        let port = MockPort::new(vec![response(0, 0x00, &[0x33])]);
        let connection = Connection::new(Channel::new(port));
        let mfc = Mfc::new(&connection, 0);

        let err = mfc.set_setpoint(99.0, Scaling::Normalized).unwrap_err();
        match err {
            MfcError::Device { code, message } => {
                assert_eq!(code, 0x33);
                assert_eq!(message, "flow setpoint out of valid range");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn set_slave_address_rebinds_facade() {
        let port = MockPort::new(vec![response(3, 0x90, &[0x00])]);
        let connection = Connection::new(Channel::new(port));
        let mut mfc = Mfc::new(&connection, 3);

        mfc.set_slave_address(7).unwrap();
        assert_eq!(mfc.address(), 7);
        assert_eq!(
            connection.into_channel().into_inner().written,
            response(3, 0x90, &[0x07])
        );
    }

    #[test]
    fn rejected_multi_byte_command_keeps_its_error_code() {
        // A rejected command answers with the state byte only, far
        // short of the seven data bytes a version reply carries. The
        // code must survive as a device error, not a length violation.
        let port = MockPort::new(vec![response(0, 0xD1, &[0x03])]);
        let connection = Connection::new(Channel::new(port));
        let mfc = Mfc::new(&connection, 0);

        let err = mfc.get_version().unwrap_err();
        match err {
            MfcError::Device { code, message } => {
                assert_eq!(code, 0x03);
                assert_eq!(message, "no access right for command");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn version_through_full_stack() {
        let port = MockPort::new(vec![response(0, 0xD1, &[0x00, 1, 2, 0, 3, 0, 1, 0])]);
        let connection = Connection::new(Channel::new(port));
        let mfc = Mfc::new(&connection, 0);

        let version = mfc.get_version().unwrap();
        assert_eq!(version.firmware.major, 1);
        assert_eq!(version.firmware.minor, 2);
        assert!(!version.firmware.debug);
        assert_eq!(version.to_string(), "Firmware 1.2, Hardware 3.0, Protocol 1.0");
    }
}
