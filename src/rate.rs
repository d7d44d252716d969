//! Fixed-point cashback rate.
//!
//! Uses `rust_decimal` so cashback is computed exactly, without the rounding
//! surprises of floating-point multiplication.

use crate::account::Amount;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Fraction of a payment returned to the payer as cashback.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use ledger_engine::CashbackRate;
///
/// let rate = CashbackRate::from_str("0.02").unwrap();
/// assert_eq!(rate.cashback_for(1_000), 20);
/// assert_eq!(rate.cashback_for(149), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CashbackRate(Decimal);

impl CashbackRate {
    /// Two percent.
    pub const STANDARD: Self = CashbackRate(Decimal::from_parts(2, 0, 0, false, 2));

    /// No cashback.
    pub const ZERO: Self = CashbackRate(Decimal::ZERO);

    /// Creates a rate, returning `None` for negative values.
    pub fn new(value: Decimal) -> Option<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return None;
        }
        Some(CashbackRate(value))
    }

    /// Cashback owed on a payment of `amount`, rounded down.
    ///
    /// Saturates at `Amount::MAX` when the product leaves the `i64` range.
    pub fn cashback_for(&self, amount: Amount) -> Amount {
        Decimal::from(amount)
            .checked_mul(self.0)
            .and_then(|cashback| cashback.floor().to_i64())
            .unwrap_or(Amount::MAX)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl Default for CashbackRate {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Error returned when parsing a [`CashbackRate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseRateError {
    #[error("invalid rate: {0}")]
    Invalid(#[from] rust_decimal::Error),

    #[error("rate must not be negative")]
    Negative,
}

impl FromStr for CashbackRate {
    type Err = ParseRateError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s.trim())?;
        CashbackRate::new(decimal).ok_or(ParseRateError::Negative)
    }
}

impl fmt::Display for CashbackRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
