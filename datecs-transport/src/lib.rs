//! Transport layer for Datecs fiscal devices
//!
//! Provides TCP and serial byte channels. Both backends own their timeouts;
//! the protocol layer above only sees `send` and possibly partial `receive`.

pub mod error;
#[cfg(feature = "serial")]
pub mod serial;
pub mod tcp;

pub use error::{Error, Result};
#[cfg(feature = "serial")]
pub use serial::SerialTransport;
pub use tcp::TcpTransport;

use async_trait::async_trait;
use bytes::BytesMut;

/// Transport trait for different communication methods
#[async_trait]
pub trait Transport: Send {
    /// Connect to device
    async fn connect(&mut self) -> Result<()>;

    /// Disconnect from device
    async fn disconnect(&mut self) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Send raw bytes
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive whatever bytes are available
    ///
    /// May return a partial frame. Fails with [`Error::ReadTimeout`] when
    /// nothing arrives within the transport's read timeout.
    async fn receive(&mut self) -> Result<BytesMut>;

    /// Get remote address
    fn remote_addr(&self) -> String;
}
