//! Datecs frame encoding and reply payload extraction

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{
    checksum,
    command::Command,
    constants::{POSTAMBLE, PREAMBLE, SEPARATOR, STATUS_LEN, TERMINATOR, WORD_LEN},
    dialect::Dialect,
    error::{Error, Result},
};

/// Datecs request packet
///
/// # Packet Structure
///
/// ```text
/// ┌──────────┬───────┬───────┬───────┬─────────┬───────────┬─────────┬────────────┐
/// │ PREAMBLE │  LEN  │  SEQ  │  CMD  │  DATA   │ POSTAMBLE │   BCC   │ TERMINATOR │
/// │   0x01   │ 1 / 4 │   1   │ 1 / 4 │ N bytes │   0x05    │ 4 bytes │    0x03    │
/// └──────────┴───────┴───────┴───────┴─────────┴───────────┴─────────┴────────────┘
/// ```
///
/// LEN and CMD are one raw byte each in the OLD dialect and four ASCII nibbles
/// each in the X dialect. BCC is the byte sum of LEN through POSTAMBLE.
///
/// # Examples
///
/// ```
/// use datecs_core::{Command, Dialect, Packet};
///
/// let packet = Packet::new(0x21, Command::GetDateTime);
/// let encoded = packet.encode(Dialect::Old).unwrap();
///
/// let decoded = Packet::decode(Dialect::Old, &encoded).unwrap();
/// assert_eq!(packet, decoded);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Packet {
    /// Sequence number (0x20..=0xFF)
    pub sequence: u8,

    /// Command code
    pub command: Command,

    /// Command payload, separator delimited ASCII
    pub data: Bytes,
}

impl Packet {
    /// Bytes around the payload that do not depend on the dialect
    /// (PREAMBLE, SEQ, POSTAMBLE, BCC, TERMINATOR)
    pub const FIXED_OVERHEAD: usize = 1 + 1 + 1 + WORD_LEN + 1;

    /// Create a new packet with empty payload
    pub fn new(sequence: u8, command: Command) -> Self {
        Self {
            sequence,
            command,
            data: Bytes::new(),
        }
    }

    /// Create a packet with payload
    ///
    /// # Examples
    ///
    /// ```
    /// use datecs_core::{Command, Packet};
    ///
    /// let packet = Packet::with_data(0x21, Command::Total, "0\t5.00\t\t");
    /// assert_eq!(packet.data.len(), 8);
    /// ```
    pub fn with_data(sequence: u8, command: Command, data: impl Into<Bytes>) -> Self {
        Self {
            sequence,
            command,
            data: data.into(),
        }
    }

    /// Body covered by the checksum: LEN + SEQ + CMD + DATA + POSTAMBLE
    pub fn body(&self, dialect: Dialect) -> Result<BytesMut> {
        let (len, cmd) = dialect.encode_length_and_command(self.data.len(), self.command.into())?;

        let mut buf = BytesMut::with_capacity(len.len() + cmd.len() + self.data.len() + 2);
        buf.put_slice(&len);
        buf.put_u8(self.sequence);
        buf.put_slice(&cmd);
        buf.put_slice(&self.data);
        buf.put_u8(POSTAMBLE);

        Ok(buf)
    }

    /// Encode packet to bytes
    ///
    /// # Errors
    ///
    /// Fails when the payload or command code cannot be represented in the
    /// dialect's LEN/CMD fields.
    pub fn encode(&self, dialect: Dialect) -> Result<BytesMut> {
        let body = self.body(dialect)?;

        let mut buf = BytesMut::with_capacity(body.len() + Self::FIXED_OVERHEAD);
        buf.put_u8(PREAMBLE);
        buf.put_slice(&body);
        buf.put_slice(&checksum::encode(&body));
        buf.put_u8(TERMINATOR);

        Ok(buf)
    }

    /// Decode a request packet
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Buffer is too short for the dialect's header
    /// - Frame markers or the declared length are wrong
    /// - Checksum verification fails
    /// - Command code is unknown
    pub fn decode(dialect: Dialect, buf: &[u8]) -> Result<Self> {
        let width = dialect.rules().field_width;
        let min_len = Self::FIXED_OVERHEAD + 2 * width;

        if buf.len() < min_len {
            return Err(Error::PacketTooShort {
                expected: min_len,
                actual: buf.len(),
            });
        }

        if buf[0] != PREAMBLE || buf[buf.len() - 1] != TERMINATOR {
            return Err(Error::InvalidFrame("missing preamble or terminator".into()));
        }

        let bcc_start = buf.len() - 1 - WORD_LEN;
        let body = &buf[1..bcc_start];
        let received = checksum::decode_word(&buf[bcc_start..buf.len() - 1])?;
        let expected = checksum::calculate(body);
        if expected != received {
            return Err(Error::ChecksumMismatch { expected, received });
        }

        if body[body.len() - 1] != POSTAMBLE {
            return Err(Error::InvalidFrame("missing postamble".into()));
        }

        let read_field = |field: &[u8]| -> Result<u16> {
            match dialect {
                Dialect::Old => Ok(u16::from(field[0])),
                Dialect::X => checksum::decode_word(field),
            }
        };

        let declared = usize::from(read_field(&body[..width])?);
        let data_start = 2 * width + 1;
        let data_end = body.len() - 1;
        let data_len = data_end - data_start;

        if declared != usize::from(dialect.rules().length_offset) + data_len {
            return Err(Error::InvalidFrame(format!(
                "declared length 0x{:X} does not match {} payload bytes",
                declared, data_len
            )));
        }

        let sequence = body[width];
        let command = Command::try_from(read_field(&body[width + 1..data_start])?)?;

        Ok(Self {
            sequence,
            command,
            data: Bytes::copy_from_slice(&body[data_start..data_end]),
        })
    }

    /// Get total packet size
    pub fn size(&self, dialect: Dialect) -> usize {
        Self::FIXED_OVERHEAD + 2 * dialect.rules().field_width + self.data.len()
    }
}

/// Split a raw reply into its payload and status window
///
/// The payload starts at a dialect specific offset and runs up to the
/// separator (0x04); the X dialect also drops the byte right before the
/// separator. The status window is the seven bytes following the separator.
///
/// # Examples
///
/// ```
/// use datecs_core::{packet, Dialect};
///
/// let raw = b"\x01\x2C\x21\x3E02-10-19 21:29:42\x04\x80\x80\x80\x80\x80\x80\x05";
/// let (data, status) = packet::decode_payload(Dialect::Old, raw).unwrap();
/// assert_eq!(data, "02-10-19 21:29:42");
/// assert_eq!(status[0], 0x80);
/// ```
pub fn decode_payload(dialect: Dialect, raw: &[u8]) -> Result<(String, [u8; STATUS_LEN])> {
    let sep = raw
        .iter()
        .position(|&b| b == SEPARATOR)
        .ok_or(Error::MissingSeparator { len: raw.len() })?;

    let payload = dialect
        .payload_slice(sep)
        .ok_or_else(|| Error::InvalidFrame(format!("separator at offset {} leaves no payload", sep)))?;
    let data = String::from_utf8_lossy(&raw[payload]).into_owned();

    let window = &raw[sep + 1..];
    if window.len() < STATUS_LEN {
        return Err(Error::StatusWindowTooShort {
            expected: STATUS_LEN,
            actual: window.len(),
        });
    }

    let mut status = [0u8; STATUS_LEN];
    status.copy_from_slice(&window[..STATUS_LEN]);

    Ok((data, status))
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("sequence", &format!("0x{:02X}", self.sequence))
            .field("command", &self.command)
            .field("data", &String::from_utf8_lossy(&self.data))
            .finish()
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Packet[{}](seq=0x{:02X}, len={})",
            self.command,
            self.sequence,
            self.data.len()
        )
    }
}
