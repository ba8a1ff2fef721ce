//! Datecs block check (BCC) and word encoding
//!
//! The checksum is the plain byte sum of the frame body (LEN through POSTAMBLE)
//! truncated to 16 bits. It always travels as four ASCII bytes, one per nibble,
//! each offset by `0x30`. The X dialect uses the same encoding for its length
//! and command fields.

use tracing::trace;

use crate::constants::WORD_LEN;
use crate::error::{Error, Result};

/// Encode a 16-bit word as four ASCII nibbles
///
/// # Examples
///
/// ```
/// use datecs_core::checksum;
///
/// assert_eq!(checksum::encode_word(0x1A2F), *b"1:2?");
/// ```
pub fn encode_word(value: u16) -> [u8; WORD_LEN] {
    let [hi, lo] = value.to_be_bytes();
    [
        0x30 + (hi >> 4),
        0x30 + (hi & 0x0F),
        0x30 + (lo >> 4),
        0x30 + (lo & 0x0F),
    ]
}

/// Reassemble a word written by [`encode_word`]
///
/// # Errors
///
/// Returns an error if fewer than four bytes are given or a byte falls outside
/// `0x30..=0x3F`.
pub fn decode_word(bytes: &[u8]) -> Result<u16> {
    if bytes.len() < WORD_LEN {
        return Err(Error::PacketTooShort {
            expected: WORD_LEN,
            actual: bytes.len(),
        });
    }

    bytes[..WORD_LEN].iter().try_fold(0u16, |acc, &b| {
        if !(0x30..=0x3F).contains(&b) {
            return Err(Error::InvalidWordByte(b));
        }
        Ok((acc << 4) | u16::from(b - 0x30))
    })
}

/// Calculate the checksum of a frame body
///
/// # Examples
///
/// ```
/// use datecs_core::checksum;
///
/// assert_eq!(checksum::calculate(&[0x24, 0x21, 0x3E, 0x05]), 0x88);
/// ```
pub fn calculate(body: &[u8]) -> u16 {
    let sum = body
        .iter()
        .fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)));

    trace!(
        body_len = body.len(),
        checksum = format!("0x{:04X}", sum),
        "Calculated checksum"
    );

    sum
}

/// Checksum of a frame body, ready to append
pub fn encode(body: &[u8]) -> [u8; WORD_LEN] {
    encode_word(calculate(body))
}

/// Verify an encoded checksum against a body
pub fn verify(body: &[u8], encoded: &[u8]) -> bool {
    matches!(decode_word(encoded), Ok(received) if received == calculate(body))
}
