/// Errors that can occur while executing a command.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Transport-level failure (stream I/O or deadline). Retried up to
    /// the configured bound before surfacing.
    #[error("transport error: {0}")]
    Transport(#[from] shdlc_transport::TransportError),

    /// Corrupted frame on the wire. Retried up to the configured bound
    /// before surfacing.
    #[error("frame error: {0}")]
    Frame(#[from] shdlc_frame::FrameError),

    /// The response echoed a different command id than the request.
    /// Terminal: indicates firmware/driver version skew, not transience.
    #[error("response command mismatch (sent 0x{expected:02X}, got 0x{actual:02X})")]
    ResponseCommand { expected: u8, actual: u8 },

    /// The response payload length violates the descriptor's declared
    /// bounds. Terminal, same as a command mismatch.
    #[error("response length {actual} outside declared bounds [{min}, {max}]")]
    ResponseLength {
        min: usize,
        max: usize,
        actual: usize,
    },

    /// The device executed the command and rejected it, reporting an
    /// application error code. Never retried automatically.
    #[error("device reported error code 0x{code:02X}")]
    Device { code: u8 },

    /// The response payload could not be decoded into the command's
    /// typed result. Terminal.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl LinkError {
    /// Whether this failure class may be resolved by resending the same
    /// frame. Only transport-level failures and corrupted frames
    /// qualify; protocol and device errors are terminal.
    pub fn is_transient(&self) -> bool {
        match self {
            LinkError::Transport(_) => true,
            LinkError::Frame(err) => !matches!(err, shdlc_frame::FrameError::PayloadTooLarge { .. }),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, LinkError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn transience_classification() {
        let timeout = LinkError::Transport(shdlc_transport::TransportError::Timeout {
            waited: Duration::from_millis(5),
        });
        assert!(timeout.is_transient());

        let checksum = LinkError::Frame(shdlc_frame::FrameError::Checksum {
            received: 0,
            computed: 1,
        });
        assert!(checksum.is_transient());

        let oversized = LinkError::Frame(shdlc_frame::FrameError::PayloadTooLarge {
            size: 300,
            max: 255,
        });
        assert!(!oversized.is_transient());

        assert!(!LinkError::Device { code: 0x02 }.is_transient());
        assert!(!LinkError::ResponseLength {
            min: 4,
            max: 4,
            actual: 7
        }
        .is_transient());
    }
}
