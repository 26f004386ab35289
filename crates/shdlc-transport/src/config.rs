use std::time::Duration;

/// Highest address assignable to a device. Addresses 0-254 identify
/// individual devices on the bus.
pub const DEVICE_ADDRESS_MAX: u8 = 254;

/// Broadcast address: every device on the bus accepts the frame.
pub const BROADCAST_ADDRESS: u8 = 255;

/// Default baud rate of SHDLC devices out of the box.
pub const DEFAULT_BAUD_RATE: u32 = 115200;

/// Default read timeout granularity.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Configuration for opening a serial channel.
#[derive(Debug, Clone)]
pub struct PortConfig {
    /// Serial port path, e.g. `/dev/ttyUSB0` or `COM3`.
    pub path: String,
    /// Baud rate. Default: 115200.
    pub baud_rate: u32,
    /// Granularity of blocking reads while waiting for bytes. Bounds how
    /// long a receive can overshoot its deadline; smaller values poll the
    /// port more often. Default: 1 ms.
    pub poll_interval: Duration,
}

impl PortConfig {
    /// Configuration for `path` with default baud rate and poll interval.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Same configuration with a different baud rate.
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PortConfig::new("/dev/ttyUSB0");
        assert_eq!(config.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
    }

    #[test]
    fn baud_override() {
        let config = PortConfig::new("/dev/ttyUSB0").baud_rate(460800);
        assert_eq!(config.baud_rate, 460800);
    }
}
