use std::io::{Read, Write};

use serialport::SerialPort;
use tracing::debug;

use crate::config::PortConfig;
use crate::error::{Result, TransportError};

/// A connected serial byte stream — implements Read + Write.
///
/// Wraps a platform serial port configured for 8N1 operation. Reads
/// block at most for the configured poll interval, which is what keeps
/// [`Channel::receive_until`](crate::Channel::receive_until) from
/// busy-spinning while still honoring its deadline.
pub struct SerialStream {
    inner: Box<dyn SerialPort>,
}

impl SerialStream {
    /// Open the serial port described by `config`.
    pub fn open(config: &PortConfig) -> Result<Self> {
        let inner = serialport::new(&config.path, config.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .timeout(config.poll_interval)
            .open()
            .map_err(|source| TransportError::Open {
                path: config.path.clone(),
                source,
            })?;
        debug!(path = %config.path, baud = config.baud_rate, "opened serial port");
        Ok(Self { inner })
    }

    /// Discard any bytes pending in the OS receive buffer.
    ///
    /// Useful before the first exchange after opening, when the buffer
    /// may hold stale traffic from a previous session.
    pub fn clear_input(&self) -> Result<()> {
        self.inner
            .clear(serialport::ClearBuffer::Input)
            .map_err(|err| TransportError::Io(err.into()))
    }
}

impl Read for SerialStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for SerialStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl std::fmt::Debug for SerialStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialStream")
            .field("port", &self.inner.name())
            .finish()
    }
}
