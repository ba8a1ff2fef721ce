//! High-level error types

use datecs_core::Command;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] datecs_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] datecs_transport::Error),

    #[error("Receipt error: {0}")]
    Types(#[from] datecs_types::Error),

    #[error("Device not connected")]
    NotConnected,

    #[error("Device answered NAK twice to {command}")]
    RepeatedNak { command: Command },

    #[error("{function} failed with device error {code}: {message}")]
    Device {
        function: &'static str,
        code: i32,
        message: String,
    },

    #[error("Receipt must be closed before printing")]
    ReceiptNotClosed,

    #[error("Operation not supported: {0}")]
    NotSupported(String),

    #[error("Invalid response from device: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Check if the device itself reported the failure
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::Device { .. })
    }

    /// Check if the connection should be re-established before retrying
    pub fn requires_reconnect(&self) -> bool {
        match self {
            Self::NotConnected | Self::RepeatedNak { .. } | Self::Transport(_) => true,
            Self::Core(e) => e.is_framing(),
            _ => false,
        }
    }
}
