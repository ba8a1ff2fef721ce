//! Protocol constants

/// Start of every request and reply frame
pub const PREAMBLE: u8 = 0x01;

/// Closes the checksummed body
pub const POSTAMBLE: u8 = 0x05;

/// End of frame (ETX)
pub const TERMINATOR: u8 = 0x03;

/// Splits reply data from the status bytes
pub const SEPARATOR: u8 = 0x04;

/// Device rejected the last frame, resend it
pub const NAK: u8 = 0x15;

/// Device is busy, keep waiting
pub const SYN: u8 = 0x16;

/// Lowest sequence number
pub const SEQ_START: u8 = 0x20;

/// Highest sequence number
pub const SEQ_MAX: u8 = 0xFF;

/// Width of the status window taken after the separator
pub const STATUS_LEN: usize = 7;

/// Width of an ASCII-nibble encoded word
pub const WORD_LEN: usize = 4;

/// Number of resends allowed after a NAK
pub const MAX_RESENDS: usize = 1;

/// Error code reported for a plain `F` answer
pub const ERROR_COMMAND_FAILED: i32 = -20;

/// Default TCP port of Datecs LAN-enabled devices
pub const DEFAULT_TCP_PORT: u16 = 4999;

/// Default serial line speed
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
