//! Error types for the ledger engine.

use crate::account::{AccountId, Amount, Timestamp};
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Coarse classification of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Referenced account or payment does not exist (or belongs elsewhere).
    NotFound,
    /// Non-positive amount, same-account operation, overdraft or overflow.
    InvalidArgument,
    /// Account id collision on create.
    AlreadyExists,
    /// Query against an id absorbed by a merge at or before the queried time.
    StaleReference,
    /// Call timestamp earlier than one already observed.
    OutOfOrder,
}

/// Errors that can occur during engine operation.
///
/// Every variant is recoverable: the engine state is untouched when one is
/// returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// No live account (or, for balance queries, no historical id) matches
    #[error("Account '{id}' not found")]
    AccountNotFound { id: AccountId },

    /// Payment id was never issued
    #[error("Payment '{payment}' not found")]
    PaymentNotFound { payment: String },

    /// Payment exists but is owned by another account
    #[error("Payment '{payment}' does not belong to account '{id}'")]
    PaymentOwnerMismatch { payment: String, id: AccountId },

    /// Amount must be strictly positive
    #[error("Invalid amount {amount}")]
    InvalidAmount { amount: Amount },

    /// Transfer or merge with itself
    #[error("Source and target are the same account '{id}'")]
    SameAccount { id: AccountId },

    /// Requested debit exceeds the current balance
    #[error("Insufficient funds in '{id}': balance {balance}, requested {requested}")]
    InsufficientFunds {
        id: AccountId,
        balance: Amount,
        requested: Amount,
    },

    /// Balance or outgoing total would exceed the representable range
    #[error("Amount overflow on account '{id}'")]
    AmountOverflow { id: AccountId },

    /// Account id already denotes a live account
    #[error("Account '{id}' already exists")]
    AccountExists { id: AccountId },

    /// Id was absorbed by a merge at or before the queried time
    #[error("Account '{id}' was merged away at {merged_at}")]
    MergedAway { id: AccountId, merged_at: Timestamp },

    /// Queried time precedes the account's first recorded snapshot
    #[error("Account '{id}' did not exist at {time_at}")]
    NotYetCreated { id: AccountId, time_at: Timestamp },

    /// Call timestamp went backwards
    #[error("Timestamp {timestamp} precedes previously observed {latest}")]
    ClockRegression { timestamp: Timestamp, latest: Timestamp },
}

impl LedgerError {
    /// Maps the error onto its [`ErrorKind`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::AccountNotFound { .. }
            | LedgerError::PaymentNotFound { .. }
            | LedgerError::PaymentOwnerMismatch { .. } => ErrorKind::NotFound,
            LedgerError::InvalidAmount { .. }
            | LedgerError::SameAccount { .. }
            | LedgerError::InsufficientFunds { .. }
            | LedgerError::AmountOverflow { .. } => ErrorKind::InvalidArgument,
            LedgerError::AccountExists { .. } => ErrorKind::AlreadyExists,
            LedgerError::MergedAway { .. } | LedgerError::NotYetCreated { .. } => {
                ErrorKind::StaleReference
            }
            LedgerError::ClockRegression { .. } => ErrorKind::OutOfOrder,
        }
    }

    pub(crate) fn not_found(id: &str) -> Self {
        LedgerError::AccountNotFound { id: id.to_string() }
    }
}
