//! Fiscal receipt value objects

use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{Error, Result};

/// Round a money amount to 2 decimals
pub fn round_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a quantity to 3 decimals
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
}

/// Payment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum PayMode {
    #[default]
    Cash = 0,
    Card = 1,
    OnDelivery = 2,
}

impl PayMode {
    /// Code sent to the device
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for PayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Receipt line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Item name printed on the receipt
    pub name: String,

    /// Quantity, 3 decimals
    pub quantity: Decimal,

    /// Unit price, 2 decimals
    pub price: Decimal,

    /// Unit label ("kg", "pcs", ...)
    pub unit: String,

    /// Tax group letter or digit
    pub tax_code: char,
}

impl Article {
    /// Tax group used when none is given
    pub const DEFAULT_TAX_CODE: char = 'A';

    pub fn new(
        name: impl Into<String>,
        quantity: Decimal,
        price: Decimal,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            quantity: round_quantity(quantity),
            price: round_amount(price),
            unit: unit.into(),
            tax_code: Self::DEFAULT_TAX_CODE,
        }
    }

    /// Set tax group
    pub fn with_tax_code(mut self, tax_code: char) -> Self {
        self.tax_code = tax_code;
        self
    }

    /// Line total: `round(quantity × price, 2)`
    pub fn amount(&self) -> Decimal {
        round_amount(self.quantity * self.price)
    }
}

/// Reference to the document a storno cancels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StornoInfo {
    pub reason: String,
    pub document: String,
    pub timestamp: NaiveDateTime,
}

/// Fiscal receipt
///
/// Built by the caller, filled with [`FiscalBon::add`], finalized with
/// [`FiscalBon::close`] and handed to the device once.
///
/// # Examples
///
/// ```
/// use datecs_types::{Article, FiscalBon, PayMode};
/// use rust_decimal::Decimal;
///
/// let mut bon = FiscalBon::new(1, "1", "0001");
/// bon.add(Article::new("Potatoes", Decimal::new(2350, 3), Decimal::new(85, 2), "kg"));
/// bon.add(Article::new("Tomatoes", Decimal::new(1200, 3), Decimal::new(250, 2), "kg"));
///
/// assert_eq!(bon.total(), Decimal::new(500, 2));
/// assert!(bon.close(Decimal::new(499, 2), PayMode::Card).is_err());
/// assert!(bon.close(Decimal::new(500, 2), PayMode::Card).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiscalBon {
    pub operator: u32,
    pub password: String,
    pub work_place: String,
    pub sale_ref: Option<String>,
    pub storno: Option<StornoInfo>,
    articles: Vec<Article>,
    total: Decimal,
    pay_mode: PayMode,
    payed: Option<Decimal>,
}

impl FiscalBon {
    pub fn new(operator: u32, password: impl Into<String>, work_place: impl Into<String>) -> Self {
        Self {
            operator,
            password: password.into(),
            work_place: work_place.into(),
            sale_ref: None,
            storno: None,
            articles: Vec::new(),
            total: Decimal::ZERO,
            pay_mode: PayMode::default(),
            payed: None,
        }
    }

    /// Set the unique sale reference
    pub fn with_sale_ref(mut self, sale_ref: impl Into<String>) -> Self {
        self.sale_ref = Some(sale_ref.into());
        self
    }

    /// Turn the receipt into a storno document
    pub fn with_storno(mut self, storno: StornoInfo) -> Self {
        self.storno = Some(storno);
        self
    }

    /// Append a line and add its amount to the running total
    pub fn add(&mut self, article: Article) {
        self.total = round_amount(self.total + article.amount());
        self.articles.push(article);
    }

    /// Record the payment
    ///
    /// # Errors
    ///
    /// Fails without changing the receipt if `amount` is below the total.
    pub fn close(&mut self, amount: Decimal, pay_mode: PayMode) -> Result<()> {
        if amount < self.total {
            return Err(Error::InsufficientAmount {
                total: self.total,
                amount,
            });
        }

        self.pay_mode = pay_mode;
        self.payed = Some(round_amount(amount));
        Ok(())
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// Running total
    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn pay_mode(&self) -> PayMode {
        self.pay_mode
    }

    /// Amount tendered, once closed
    pub fn payed(&self) -> Option<Decimal> {
        self.payed
    }

    pub fn is_closed(&self) -> bool {
        self.payed.is_some()
    }

    pub fn is_storno(&self) -> bool {
        self.storno.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn sample() -> FiscalBon {
        let mut bon = FiscalBon::new(1, "1", "0001");
        bon.add(Article::new("Potatoes", dec("2.350"), dec("0.85"), "kg"));
        bon.add(Article::new("Tomatoes", dec("1.200"), dec("2.50"), "kg"));
        bon
    }

    #[test]
    fn test_article_rounding() {
        let article = Article::new("Salt", dec("1.23456"), dec("0.995"), "pcs");

        assert_eq!(article.quantity, dec("1.235"));
        assert_eq!(article.price, dec("1.00"));
        assert_eq!(article.amount(), dec("1.24"));
        assert_eq!(article.tax_code, 'A');
    }

    #[test]
    fn test_running_total() {
        let bon = sample();

        assert_eq!(bon.articles().len(), 2);
        assert_eq!(bon.articles()[0].amount(), dec("2.00"));
        assert_eq!(bon.total(), dec("5.00"));
    }

    #[test]
    fn test_close_underpaid() {
        let mut bon = sample();
        let err = bon.close(dec("4.99"), PayMode::Card).unwrap_err();

        assert!(matches!(err, Error::InsufficientAmount { .. }));
        assert!(!bon.is_closed());
        assert_eq!(bon.pay_mode(), PayMode::Cash);
    }

    #[test]
    fn test_close_exact() {
        let mut bon = sample();
        bon.close(dec("5.00"), PayMode::Card).unwrap();

        assert!(bon.is_closed());
        assert_eq!(bon.payed(), Some(dec("5.00")));
        assert_eq!(bon.pay_mode(), PayMode::Card);
    }

    #[test]
    fn test_empty_receipt_closes_with_zero() {
        let mut bon = FiscalBon::new(1, "1", "0001");
        assert!(bon.close(Decimal::ZERO, PayMode::Cash).is_ok());
    }

    #[test]
    fn test_pay_mode_codes() {
        assert_eq!(PayMode::Cash.to_string(), "0");
        assert_eq!(PayMode::Card.to_string(), "1");
        assert_eq!(PayMode::OnDelivery.to_string(), "2");
    }

    #[test]
    fn test_storno_flag() {
        let timestamp = chrono::NaiveDate::from_ymd_opt(2019, 10, 2)
            .unwrap()
            .and_hms_opt(21, 29, 42)
            .unwrap();
        let bon = FiscalBon::new(1, "1", "0001").with_storno(StornoInfo {
            reason: "1".into(),
            document: "123".into(),
            timestamp,
        });

        assert!(bon.is_storno());
    }
}
