//! Protocol dialects
//!
//! Datecs devices speak one of two frame layouts that share the same overall
//! shape. The OLD dialect writes the length and command as single raw bytes; the
//! X dialect writes both as ASCII-nibble words. Everything that differs between
//! the two lives in a [`DialectRules`] table so the rest of the crate stays
//! free of per-dialect branches.

use std::fmt;

use crate::checksum::encode_word;
use crate::constants::WORD_LEN;
use crate::error::{Error, Result};

/// Wire dialect spoken by a device
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// Older firmware: raw length and command bytes, `,` separated fields
    Old,

    /// X firmware: ASCII-nibble length and command, tab separated fields
    #[default]
    X,
}

/// Dialect specific encoding rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectRules {
    /// Field separator inside payloads
    pub separator: char,

    /// Added to the payload length to form the LEN field
    pub length_offset: u16,

    /// Width of the LEN and CMD fields
    pub field_width: usize,

    /// First payload byte of a reply
    pub payload_start: usize,

    /// Bytes dropped between the payload and the separator
    pub payload_trim: usize,
}

const OLD_RULES: DialectRules = DialectRules {
    separator: ',',
    length_offset: 0x24,
    field_width: 1,
    payload_start: 4,
    payload_trim: 0,
};

const X_RULES: DialectRules = DialectRules {
    separator: '\t',
    length_offset: 0x2A,
    field_width: WORD_LEN,
    payload_start: 12,
    payload_trim: 1,
};

impl Dialect {
    /// Encoding rules for this dialect
    pub const fn rules(self) -> &'static DialectRules {
        match self {
            Self::Old => &OLD_RULES,
            Self::X => &X_RULES,
        }
    }

    /// Field separator inside payloads
    pub const fn separator(self) -> char {
        self.rules().separator
    }

    /// Dialect name
    pub fn name(self) -> &'static str {
        match self {
            Self::Old => "OLD",
            Self::X => "X",
        }
    }

    /// Encode the LEN and CMD fields for a payload of `data_len` bytes
    ///
    /// Returns `(len, cmd)` ready to be placed around the sequence byte.
    ///
    /// # Errors
    ///
    /// The OLD dialect fails when the length or command code do not fit into a
    /// single byte.
    pub fn encode_length_and_command(
        self,
        data_len: usize,
        command: u16,
    ) -> Result<(Vec<u8>, Vec<u8>)> {
        let rules = self.rules();
        let len = usize::from(rules.length_offset) + data_len;

        match self {
            Self::Old => {
                let len = u8::try_from(len).map_err(|_| Error::PayloadTooLarge {
                    size: data_len,
                    max: usize::from(u8::MAX - 0x24),
                })?;
                let cmd = u8::try_from(command).map_err(|_| Error::CommandOutOfRange {
                    command,
                    dialect: self,
                })?;
                Ok((vec![len], vec![cmd]))
            }
            Self::X => {
                let len = u16::try_from(len).map_err(|_| Error::PayloadTooLarge {
                    size: data_len,
                    max: usize::from(u16::MAX - 0x2A),
                })?;
                Ok((encode_word(len).to_vec(), encode_word(command).to_vec()))
            }
        }
    }

    /// Byte range of the payload inside a reply whose separator sits at `sep`
    ///
    /// Returns `None` when the separator is too close to the start of the
    /// frame to hold a payload.
    pub fn payload_slice(self, sep: usize) -> Option<std::ops::Range<usize>> {
        let rules = self.rules();
        let end = sep.checked_sub(rules.payload_trim)?;
        (end >= rules.payload_start).then_some(rules.payload_start..end)
    }

    /// Split a payload into fields, keeping empty trailing fields
    pub fn split_fields(self, data: &str) -> Vec<String> {
        data.split(self.separator()).map(str::to_owned).collect()
    }

    /// Join fields, terminating every one with the separator
    pub fn join_fields<I, S>(self, fields: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sep = self.separator();
        fields.into_iter().fold(String::new(), |mut out, field| {
            out.push_str(field.as_ref());
            out.push(sep);
            out
        })
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
