//! Type definitions for datecs

pub mod cash;
pub mod error;
pub mod receipt;

pub use cash::CashAvailability;
pub use error::{Error, Result};
pub use receipt::{Article, FiscalBon, PayMode, StornoInfo};
