use std::time::Duration;

/// Errors that can occur in serial transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial port.
    #[error("failed to open serial port {path}: {source}")]
    Open {
        path: String,
        source: serialport::Error,
    },

    /// An I/O error occurred on the byte stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The receive predicate was not satisfied before the deadline.
    #[error("timed out after {waited:?}")]
    Timeout { waited: Duration },
}

pub type Result<T> = std::result::Result<T, TransportError>;
