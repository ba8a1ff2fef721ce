//! Device status bytes
//!
//! Every reply carries a status window after the separator. Bits are counted
//! from the least significant bit of each byte.

use std::fmt;

use bitflags::bitflags;

use crate::constants::STATUS_LEN;

bitflags! {
    /// Status byte 0: general state
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GeneralStatus: u8 {
        const SYNTAX_ERROR = 1 << 0;
        const INVALID_COMMAND = 1 << 1;
        const RTC_NOT_SYNCHRONIZED = 1 << 2;
        const MECHANISM_FAILURE = 1 << 4;
        const GENERAL_ERROR = 1 << 5;
        const COVER_OPEN = 1 << 6;
    }
}

bitflags! {
    /// Status byte 1: command execution
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CommandStatus: u8 {
        const OVERFLOW_DURING_COMMAND = 1 << 0;
        const COMMAND_NOT_PERMITTED = 1 << 1;
    }
}

bitflags! {
    /// Status byte 2: paper and receipts
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ReceiptStatus: u8 {
        const END_OF_PAPER = 1 << 0;
        const FISCAL_RECEIPT_OPEN = 1 << 3;
        const NONFISCAL_RECEIPT_OPEN = 1 << 5;
    }
}

/// Decoded status window
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Status {
    bytes: [u8; STATUS_LEN],
}

impl Status {
    pub fn new(bytes: [u8; STATUS_LEN]) -> Self {
        Self { bytes }
    }

    /// Raw status bytes
    pub fn bytes(&self) -> &[u8; STATUS_LEN] {
        &self.bytes
    }

    /// Test bit `n` of status byte `byte`
    ///
    /// Out of range positions read as unset.
    pub fn bit(&self, byte: usize, n: u8) -> bool {
        n < 8 && self.bytes.get(byte).is_some_and(|b| (b >> n) & 1 == 1)
    }

    pub fn general(&self) -> GeneralStatus {
        GeneralStatus::from_bits_truncate(self.bytes[0])
    }

    pub fn command(&self) -> CommandStatus {
        CommandStatus::from_bits_truncate(self.bytes[1])
    }

    pub fn receipt(&self) -> ReceiptStatus {
        ReceiptStatus::from_bits_truncate(self.bytes[2])
    }

    pub fn cover_open(&self) -> bool {
        self.general().contains(GeneralStatus::COVER_OPEN)
    }

    pub fn general_error(&self) -> bool {
        self.general().contains(GeneralStatus::GENERAL_ERROR)
    }

    pub fn mechanism_failure(&self) -> bool {
        self.general().contains(GeneralStatus::MECHANISM_FAILURE)
    }

    pub fn rtc_not_synchronized(&self) -> bool {
        self.general().contains(GeneralStatus::RTC_NOT_SYNCHRONIZED)
    }

    pub fn invalid_command(&self) -> bool {
        self.general().contains(GeneralStatus::INVALID_COMMAND)
    }

    pub fn syntax_error(&self) -> bool {
        self.general().contains(GeneralStatus::SYNTAX_ERROR)
    }

    pub fn command_not_permitted(&self) -> bool {
        self.command().contains(CommandStatus::COMMAND_NOT_PERMITTED)
    }

    pub fn overflow_during_command(&self) -> bool {
        self.command().contains(CommandStatus::OVERFLOW_DURING_COMMAND)
    }

    pub fn nonfiscal_receipt_open(&self) -> bool {
        self.receipt().contains(ReceiptStatus::NONFISCAL_RECEIPT_OPEN)
    }

    pub fn fiscal_receipt_open(&self) -> bool {
        self.receipt().contains(ReceiptStatus::FISCAL_RECEIPT_OPEN)
    }

    pub fn end_of_paper(&self) -> bool {
        self.receipt().contains(ReceiptStatus::END_OF_PAPER)
    }

    /// No general error and the cover is closed
    pub fn is_ok(&self) -> bool {
        !(self.general_error() || self.cover_open())
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Status")
            .field("bytes", &format!("{:02X?}", self.bytes))
            .field("general", &self.general())
            .field("command", &self.command())
            .field("receipt", &self.receipt())
            .finish()
    }
}
