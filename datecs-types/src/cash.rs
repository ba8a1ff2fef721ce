//! Cash drawer totals

use std::fmt;

use rust_decimal::Decimal;

/// Cash drawer totals reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CashAvailability {
    /// Cash currently in the drawer
    pub cash_sum: Decimal,

    /// Total service deposits (cash in)
    pub service_in: Decimal,

    /// Total service withdrawals (cash out)
    pub service_out: Decimal,
}

impl fmt::Display for CashAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cash[sum: {}, in: {}, out: {}]",
            self.cash_sum, self.service_in, self.service_out
        )
    }
}
