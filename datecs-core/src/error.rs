//! Error types for datecs-core

use crate::dialect::Dialect;

/// Result type alias for datecs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reply carries no status separator
    #[error("Malformed response: no separator (0x04) in {len} bytes")]
    MissingSeparator {
        len: usize,
    },

    /// Reply ends before the status window is complete
    #[error("Malformed response: status window needs {expected} bytes after the separator, got {actual}")]
    StatusWindowTooShort {
        expected: usize,
        actual: usize,
    },

    /// Packet is too short to be valid
    #[error("Packet too short: expected at least {expected} bytes, got {actual} bytes")]
    PacketTooShort {
        expected: usize,
        actual: usize,
    },

    /// Frame markers or declared length do not match
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// Checksum verification failed
    #[error("Checksum mismatch: expected 0x{expected:04X}, received 0x{received:04X}")]
    ChecksumMismatch {
        expected: u16,
        received: u16,
    },

    /// Byte outside the ASCII nibble range
    #[error("Invalid word byte: 0x{0:02X}")]
    InvalidWordByte(u8),

    /// Payload too large
    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge {
        size: usize,
        max: usize,
    },

    /// Command code does not fit the dialect's command field
    #[error("Command 0x{command:X} cannot be encoded in the {dialect} dialect")]
    CommandOutOfRange {
        command: u16,
        dialect: Dialect,
    },

    /// Unknown command code
    #[error("Unknown command code: 0x{0:02X}")]
    UnknownCommand(u16),

    /// Reply has fewer fields than expected
    #[error("Response field {index} missing ({count} fields received)")]
    MissingField {
        index: usize,
        count: usize,
    },

    /// Error field is neither P, F nor an integer
    #[error("Invalid error code field: {0:?}")]
    InvalidErrorCode(String),

    /// Invalid session state
    #[error("Invalid session state: {0}")]
    InvalidSessionState(String),
}

impl Error {
    /// Check if the error points at a corrupted or unexpected reply
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            Self::MissingSeparator { .. }
                | Self::StatusWindowTooShort { .. }
                | Self::PacketTooShort { .. }
                | Self::InvalidFrame(_)
                | Self::ChecksumMismatch { .. }
                | Self::InvalidWordByte(_)
        )
    }
}
