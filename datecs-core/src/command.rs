//! Datecs command codes

use std::fmt;

use crate::dialect::Dialect;
use crate::error::{Error, Result};

/// Protocol command codes
///
/// Only the commands the driver issues are listed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Command {
    // Fiscal receipt lifecycle
    OpenFiscalReceipt = 0x30,
    RegisterSale = 0x31,
    Total = 0x35,
    CloseFiscalReceipt = 0x38,
    CancelFiscalReceipt = 0x3C,

    // Clock
    SetDateTime = 0x3D,
    GetDateTime = 0x3E,

    // Cash drawer
    CashInOut = 0x46,

    // Information
    LastFiscalRecord = 0x56,
    DiagnosticInfo = 0x5A,

    // X dialect only
    Programming = 0xFF,
}

impl Command {
    /// Get command name
    pub fn name(self) -> &'static str {
        match self {
            Self::OpenFiscalReceipt => "CMD_OPEN_FISCAL_RECEIPT",
            Self::RegisterSale => "CMD_REGISTER_SALE",
            Self::Total => "CMD_TOTAL",
            Self::CloseFiscalReceipt => "CMD_CLOSE_FISCAL_RECEIPT",
            Self::CancelFiscalReceipt => "CMD_CANCEL_FISCAL_RECEIPT",
            Self::SetDateTime => "CMD_SET_DATE_TIME",
            Self::GetDateTime => "CMD_GET_DATE_TIME",
            Self::CashInOut => "CMD_CASH_IN_OUT",
            Self::LastFiscalRecord => "CMD_LAST_FISCAL_RECORD",
            Self::DiagnosticInfo => "CMD_DIAGNOSTIC_INFO",
            Self::Programming => "CMD_PROGRAMMING",
        }
    }

    /// Check if the device accepts this command in the given dialect
    pub fn is_supported_by(self, dialect: Dialect) -> bool {
        !matches!((self, dialect), (Self::Programming, Dialect::Old))
    }
}

impl From<Command> for u16 {
    fn from(cmd: Command) -> u16 {
        cmd as u16
    }
}

impl TryFrom<u16> for Command {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            0x30 => Ok(Self::OpenFiscalReceipt),
            0x31 => Ok(Self::RegisterSale),
            0x35 => Ok(Self::Total),
            0x38 => Ok(Self::CloseFiscalReceipt),
            0x3C => Ok(Self::CancelFiscalReceipt),
            0x3D => Ok(Self::SetDateTime),
            0x3E => Ok(Self::GetDateTime),
            0x46 => Ok(Self::CashInOut),
            0x56 => Ok(Self::LastFiscalRecord),
            0x5A => Ok(Self::DiagnosticInfo),
            0xFF => Ok(Self::Programming),
            _ => Err(Error::UnknownCommand(value)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_conversion() {
        assert_eq!(u16::from(Command::GetDateTime), 0x3E);
        assert_eq!(Command::try_from(0x3C).unwrap(), Command::CancelFiscalReceipt);
    }

    #[test]
    fn test_unknown_command() {
        assert!(matches!(Command::try_from(0x99), Err(Error::UnknownCommand(0x99))));
    }

    #[test]
    fn test_programming_is_x_only() {
        assert!(Command::Programming.is_supported_by(Dialect::X));
        assert!(!Command::Programming.is_supported_by(Dialect::Old));
        assert!(Command::Total.is_supported_by(Dialect::Old));
    }

    #[test]
    fn test_display() {
        assert_eq!(Command::Total.to_string(), "CMD_TOTAL(0x35)");
    }
}
