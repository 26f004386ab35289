use std::io::{Read, Write};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use shdlc_frame::{encode_frame, frame_complete, take_frame};
use shdlc_transport::{Channel, PortConfig, SerialStream, BROADCAST_ADDRESS};

use crate::command::Command;
use crate::error::{LinkError, Result};

/// Configuration for the request/response engine.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// How many times a transport-class failure (timeout, I/O error,
    /// corrupted frame) is retried with the same frame before the last
    /// error surfaces. Protocol and device errors are never retried.
    pub retries: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self { retries: 2 }
    }
}

/// Request/response engine over one serial channel.
///
/// Sequences exactly one outstanding request at a time: the underlying
/// bus is half-duplex and shared, so overlapping writes would corrupt
/// frames. Concurrent callers serialize through the internal lock,
/// which is held across the whole exchange including the post-command
/// settle delay.
///
/// Each call moves through send, await-response (discarding traffic
/// from foreign addresses until the command's response-time budget
/// elapses), state-byte check, validation against the descriptor,
/// settle delay and typed decoding.
pub struct Connection<P> {
    channel: Mutex<Channel<P>>,
    config: LinkConfig,
}

impl Connection<SerialStream> {
    /// Open the configured serial port and build a connection on it.
    ///
    /// Stale bytes from a previous session are dropped so the first
    /// exchange starts from a clean receive buffer.
    pub fn open(config: &PortConfig) -> Result<Self> {
        let stream = SerialStream::open(config)?;
        stream.clear_input()?;
        let channel = Channel::with_poll_interval(stream, config.poll_interval);
        Ok(Self::new(channel))
    }
}

impl<P: Read + Write> Connection<P> {
    /// Create a connection with the default engine configuration.
    pub fn new(channel: Channel<P>) -> Self {
        Self::with_config(channel, LinkConfig::default())
    }

    /// Create a connection with an explicit engine configuration.
    pub fn with_config(channel: Channel<P>, config: LinkConfig) -> Self {
        Self {
            channel: Mutex::new(channel),
            config,
        }
    }

    /// Execute `command` against the device at `address` and return its
    /// typed response.
    ///
    /// `address` 0-254 targets one device; [`BROADCAST_ADDRESS`] sends
    /// to every device and accepts a reply from any address.
    pub fn execute<C: Command>(&self, address: u8, command: &C) -> Result<C::Response> {
        let parameters = command.parameters();
        let mut wire = BytesMut::new();
        encode_frame(address, command.command_id(), &parameters, &mut wire)?;
        let wire = wire.freeze();

        let mut channel = self
            .channel
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut attempt = 0;
        let payload = loop {
            attempt += 1;
            match exchange(&mut channel, address, command, &wire) {
                Ok(payload) => break payload,
                Err(err) if err.is_transient() && attempt <= self.config.retries => {
                    debug!(
                        attempt,
                        command = format_args!("0x{:02X}", command.command_id()),
                        error = %err,
                        "exchange failed, retrying"
                    );
                }
                Err(err) => return Err(err),
            }
        };

        // Let the device settle before the channel is reused. The lock
        // is still held, so a queued caller cannot start early.
        let settle = command.post_processing_time();
        if !settle.is_zero() {
            std::thread::sleep(settle);
        }
        drop(channel);

        command.interpret_response(&payload)
    }

    /// Current engine configuration.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Consume the connection and return the underlying channel.
    pub fn into_channel(self) -> Channel<P> {
        self.channel
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// One send/await/validate pass. Transient failures bubble up to the
/// retry loop in [`Connection::execute`].
fn exchange<P: Read + Write, C: Command>(
    channel: &mut Channel<P>,
    address: u8,
    command: &C,
    wire: &Bytes,
) -> Result<Bytes> {
    channel.send(wire)?;

    let deadline = Instant::now() + command.max_response_time();
    let mut buf = BytesMut::new();
    loop {
        channel.receive_until(&mut buf, frame_complete, deadline)?;
        let Some(frame) = take_frame(&mut buf)? else {
            continue;
        };

        // Bus noise or cross-talk from other devices on a shared line:
        // discard and keep waiting until the deadline.
        if address != BROADCAST_ADDRESS && frame.address != address {
            trace!(
                from = frame.address,
                expected = address,
                "discarding frame from foreign address"
            );
            continue;
        }

        if frame.command != command.command_id() {
            return Err(LinkError::ResponseCommand {
                expected: command.command_id(),
                actual: frame.command,
            });
        }

        // The first payload byte is the device state: zero on success,
        // an application error code otherwise. A rejected command
        // replies with the state byte alone, so the state is checked
        // before the data-length bounds.
        let Some((&state, data)) = frame.payload.split_first() else {
            return Err(LinkError::MalformedResponse(
                "response payload missing the state byte".into(),
            ));
        };
        if state != 0 {
            return Err(LinkError::Device { code: state });
        }

        let bounds = command.response_length();
        if !bounds.contains(&data.len()) {
            return Err(LinkError::ResponseLength {
                min: *bounds.start(),
                max: *bounds.end(),
                actual: data.len(),
            });
        }

        return Ok(frame.payload.slice(1..));
    }
}
