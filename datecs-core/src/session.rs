//! Per-connection session state
//!
//! A session belongs to exactly one device connection and tracks:
//! - Sequence counter (advanced once per command, not per resend)
//! - Last frame sent (resent verbatim on NAK)
//! - Receipt state
//! - Slip number of the last closed receipt
//!
//! The dialect itself is immutable and lives outside the session.

use bytes::Bytes;

use crate::constants::{SEQ_MAX, SEQ_START};
use crate::error::{Error, Result};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not connected
    Disconnected,

    /// Connected, no receipt open
    Connected,

    /// A fiscal receipt is open on the device
    ReceiptOpen,
}

/// Session manager
#[derive(Debug)]
pub struct Session {
    sequence: u8,
    last_packet: Option<Bytes>,
    state: SessionState,
    last_slip: Option<u32>,
}

impl Session {
    /// Create a new disconnected session
    pub fn new() -> Self {
        Self {
            sequence: SEQ_START,
            last_packet: None,
            state: SessionState::Disconnected,
            last_slip: None,
        }
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        !matches!(self.state, SessionState::Disconnected)
    }

    /// Check if a fiscal receipt is open
    pub fn is_receipt_open(&self) -> bool {
        matches!(self.state, SessionState::ReceiptOpen)
    }

    /// Current sequence number
    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    /// Mark the session connected
    pub fn connect(&mut self) -> Result<()> {
        if self.state != SessionState::Disconnected {
            return Err(Error::InvalidSessionState(format!(
                "Cannot connect from state: {:?}",
                self.state
            )));
        }

        self.state = SessionState::Connected;
        Ok(())
    }

    /// Record that a fiscal receipt was opened
    pub fn open_receipt(&mut self) -> Result<()> {
        if self.state != SessionState::Connected {
            return Err(Error::InvalidSessionState(format!(
                "Cannot open a receipt from state: {:?}",
                self.state
            )));
        }

        self.state = SessionState::ReceiptOpen;
        Ok(())
    }

    /// Require an open receipt
    pub fn ensure_receipt_open(&self) -> Result<()> {
        if !self.is_receipt_open() {
            return Err(Error::InvalidSessionState(format!(
                "No fiscal receipt open (state: {:?})",
                self.state
            )));
        }
        Ok(())
    }

    /// Record a closed receipt and its slip number
    pub fn close_receipt(&mut self, slip: Option<u32>) {
        self.last_slip = slip;
        self.end_receipt();
    }

    /// Leave the receipt state without a slip (cancel)
    pub fn end_receipt(&mut self) {
        if self.is_receipt_open() {
            self.state = SessionState::Connected;
        }
    }

    /// Close session
    pub fn close(&mut self) {
        self.last_packet = None;
        self.state = SessionState::Disconnected;
    }

    /// Advance and return the sequence number for the next command
    ///
    /// Runs from 0x21 up to 0xFF, then wraps to 0x20.
    pub fn next_sequence(&mut self) -> u8 {
        self.sequence = if self.sequence >= SEQ_MAX {
            SEQ_START
        } else {
            self.sequence + 1
        };
        self.sequence
    }

    /// Remember the frame just sent
    pub fn set_last_packet(&mut self, packet: Bytes) {
        self.last_packet = Some(packet);
    }

    /// Frame to resend after a NAK
    pub fn last_packet(&self) -> Option<&Bytes> {
        self.last_packet.as_ref()
    }

    /// Slip number of the last closed receipt
    pub fn last_slip(&self) -> Option<u32> {
        self.last_slip
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
