//! # datecs
//!
//! Rust driver for Datecs fiscal printers.
//!
//! ## Features
//!
//! - OLD (comma separated) and X (tab separated) protocol dialects
//! - Async/await API using Tokio
//! - TCP and serial transports
//! - Receipt printing with automatic cancellation on failure
//!
//! ## Quick Start
//!
//! ```no_run
//! use datecs::{Article, Dialect, FiscalBon, FiscalDevice, PayMode};
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> datecs::Result<()> {
//!     // Connect to device
//!     let mut device = FiscalDevice::tcp("192.168.8.100", 4999, Dialect::X);
//!     device.connect().await?;
//!
//!     // Build and print a receipt
//!     let mut bon = FiscalBon::new(1, "1", "0001");
//!     bon.add(Article::new("Water", Decimal::ONE, Decimal::new(250, 2), "pcs"));
//!     bon.close(Decimal::new(250, 2), PayMode::Cash)?;
//!     device.print(bon).await?;
//!
//!     println!("Printed slip {:?}", device.last_slip());
//!
//!     // Disconnect
//!     device.disconnect().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod error;

// Re-exports
pub use device::FiscalDevice;
pub use error::{Error, Result};

// Re-export protocol and transport types
pub use datecs_core::{Command, Dialect, ErrorTable, Response, SessionState, Status};
#[cfg(feature = "serial")]
pub use datecs_transport::SerialTransport;
pub use datecs_transport::{TcpTransport, Transport};

// Re-export receipt types
pub use datecs_types::{Article, CashAvailability, FiscalBon, PayMode, StornoInfo};
