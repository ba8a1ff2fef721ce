use rust_decimal::Decimal;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Insufficient amount: {amount} paid, {total} due")]
    InsufficientAmount { total: Decimal, amount: Decimal },
}
