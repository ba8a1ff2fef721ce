//! # datecs-core
//!
//! Core protocol implementation for Datecs fiscal printers.
//!
//! This crate provides the low-level protocol primitives:
//! - Packet encoding/decoding for the OLD and X dialects
//! - Checksum and ASCII-nibble word encoding
//! - Reply decoding, status flags and error codes
//! - Command definitions
//! - Session state (sequence numbers, receipt state)

pub mod checksum;
pub mod command;
pub mod constants;
pub mod dialect;
pub mod error;
pub mod error_table;
pub mod packet;
pub mod response;
pub mod session;
pub mod status;

pub use command::Command;
pub use dialect::{Dialect, DialectRules};
pub use error::{Error, Result};
pub use error_table::{DefaultErrorTable, ErrorTable};
pub use packet::Packet;
pub use response::Response;
pub use session::{Session, SessionState};
pub use status::Status;
