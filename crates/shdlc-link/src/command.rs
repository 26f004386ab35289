use std::ops::RangeInclusive;
use std::time::Duration;

use bytes::Bytes;

use crate::error::Result;

/// The declarative contract every concrete command implements.
///
/// The engine is entirely data-driven: it asks the command for its id,
/// request parameters and timing budgets, runs the exchange, and hands
/// the validated response payload back to [`interpret_response`]. New
/// commands never require engine changes.
///
/// [`interpret_response`]: Command::interpret_response
pub trait Command {
    /// The typed result this command decodes from the response payload.
    type Response;

    /// Command id byte sent in the request frame and echoed by the
    /// device in the response.
    fn command_id(&self) -> u8;

    /// Request payload. Defaults to empty.
    fn parameters(&self) -> Bytes {
        Bytes::new()
    }

    /// Accepted response data lengths, not counting the leading state
    /// byte the engine strips. A successful response outside these
    /// bounds fails the exchange with
    /// [`LinkError::ResponseLength`](crate::LinkError::ResponseLength).
    fn response_length(&self) -> RangeInclusive<usize>;

    /// How long the device may take to answer this command. This is a
    /// per-command budget, not a global constant: real budgets range
    /// from a few milliseconds to tens of milliseconds.
    fn max_response_time(&self) -> Duration;

    /// How long the device needs to settle after answering before the
    /// channel may be used again. Defaults to zero.
    fn post_processing_time(&self) -> Duration {
        Duration::ZERO
    }

    /// Decode the validated response data into the typed result.
    ///
    /// The engine only calls this after a zero state byte and with data
    /// whose length is inside
    /// [`response_length`](Command::response_length), so implementations
    /// may index within the declared bounds. Device-rejected commands
    /// never reach this method; the engine surfaces them as
    /// [`LinkError::Device`](crate::LinkError::Device).
    fn interpret_response(&self, payload: &[u8]) -> Result<Self::Response>;
}
