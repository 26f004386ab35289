//! Device error code registry.
//!
//! Codes reported in the state byte of response payloads. The device
//! executed the command and rejected it; these are application errors,
//! not transport failures, and are never retried.

/// Human-readable description for a device error code.
pub fn device_error_message(code: u8) -> &'static str {
    match code {
        0x01 => "incorrect command data length",
        0x02 => "unknown command",
        0x03 => "no access right for command",
        0x04 => "illegal command parameter or parameter out of range",
        0x20 => "sensor busy",
        0x21 => "no acknowledge from sensor",
        0x22 => "sensor data checksum wrong",
        0x28 => "command not allowed in current state",
        0x33 => "flow setpoint out of valid range",
        0x40 => "no calibration active",
        0x42 => "calibration index out of range",
        0x50 => "user memory access out of range",
        _ => "unknown device error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_codes() {
        assert_eq!(device_error_message(0x02), "unknown command");
        assert_eq!(device_error_message(0x7F), "unknown device error");
    }
}
