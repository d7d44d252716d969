//! # Ledger Engine
//!
//! A deterministic, timestamp-driven ledger that handles account creation,
//! deposits, transfers, payments with deferred cashback, account merging and
//! point-in-time balance queries.
//!
//! ## Design Principles
//!
//! - **Caller-supplied time**: every operation carries its own timestamp; no wall clock
//! - **Deferred cashback**: payments earn cashback that matures 24h later
//! - **Irreversible merges**: absorbed accounts stay queryable for their past
//! - **Atomic calls**: validation precedes mutation, failures leave state untouched
//!
//! ## Example
//!
//! ```
//! use ledger_engine::{LedgerEngine, PaymentStatus};
//!
//! let mut engine = LedgerEngine::new();
//! assert!(engine.create_account(1, "alice"));
//! assert_eq!(engine.deposit(2, "alice", 1_000), Ok(1_000));
//!
//! let payment = engine.pay(3, "alice", 500).unwrap();
//! assert_eq!(
//!     engine.get_payment_status(4, "alice", &payment),
//!     Ok(PaymentStatus::InProgress)
//! );
//!
//! // 2% cashback lands 24h after the payment
//! assert_eq!(engine.get_balance(3 + 86_400_000, "alice", 3 + 86_400_000), Ok(510));
//! ```

pub mod account;
pub mod cashback;
pub mod config;
pub mod engine;
pub mod error;
pub mod rate;
pub mod store;

pub use account::{Account, AccountId, Amount, BalanceHistory, Timestamp};
pub use cashback::{CashbackEntry, CashbackSchedule, PaymentStatus};
pub use config::{LedgerConfig, DEFAULT_MATURITY_WINDOW};
pub use engine::LedgerEngine;
pub use error::{ErrorKind, LedgerError, Result};
pub use rate::{CashbackRate, ParseRateError};
pub use store::AccountStore;
