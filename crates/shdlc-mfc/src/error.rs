use shdlc_link::LinkError;

use crate::device_errors::device_error_message;

/// Errors returned by the device facade.
#[derive(Debug, thiserror::Error)]
pub enum MfcError {
    /// Failure in the link, transport or frame layer.
    #[error(transparent)]
    Link(LinkError),

    /// The device executed the command and rejected it. The code is
    /// resolved against the device error registry.
    #[error("device error 0x{code:02X}: {message}")]
    Device { code: u8, message: &'static str },
}

impl From<LinkError> for MfcError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::Device { code } => MfcError::Device {
                code,
                message: device_error_message(code),
            },
            other => MfcError::Link(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, MfcError>;
