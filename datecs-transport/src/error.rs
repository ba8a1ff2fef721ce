//! Transport errors

use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Transport is not connected")]
    NotConnected,

    #[error("Transport is already connected")]
    AlreadyConnected,

    #[error("Timed out connecting to device")]
    ConnectionTimeout,

    #[error("No data from device within the read timeout")]
    ReadTimeout,

    #[error("Device closed the connection")]
    ConnectionClosed,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid device address: {0}")]
    InvalidAddress(String),

    #[error("Serial port error: {0}")]
    Serial(String),
}

impl Error {
    /// Check if the error came from a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectionTimeout | Self::ReadTimeout)
    }
}
