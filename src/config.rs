//! Engine configuration.

use crate::rate::CashbackRate;

/// Delay between a payment and its cashback becoming payable (24h in ms).
pub const DEFAULT_MATURITY_WINDOW: u64 = 86_400_000;

/// Tunables for a [`LedgerEngine`](crate::LedgerEngine).
///
/// The defaults reproduce the standard product: 2% cashback maturing 24
/// hours after the payment, with out-of-order timestamps logged but accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Fraction of each payment returned as cashback.
    pub cashback_rate: CashbackRate,

    /// Time units between a payment and its cashback credit.
    pub maturity_window: u64,

    /// Fail calls whose timestamp precedes one already observed.
    pub reject_out_of_order: bool,
}

impl LedgerConfig {
    pub fn with_cashback_rate(mut self, rate: CashbackRate) -> Self {
        self.cashback_rate = rate;
        self
    }

    pub fn with_maturity_window(mut self, window: u64) -> Self {
        self.maturity_window = window;
        self
    }

    pub fn with_reject_out_of_order(mut self, reject: bool) -> Self {
        self.reject_out_of_order = reject;
        self
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            cashback_rate: CashbackRate::STANDARD,
            maturity_window: DEFAULT_MATURITY_WINDOW,
            reject_out_of_order: false,
        }
    }
}
