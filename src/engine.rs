//! Core ledger engine.
//!
//! Applies operations in caller-supplied timestamp order and maintains the
//! live accounts, the payment registry and the deferred cashback schedule.
//! Every operation that can observe a balance first credits cashback that
//! has matured by its timestamp.

use crate::account::{Account, AccountId, Amount, Timestamp};
use crate::cashback::{CashbackEntry, CashbackSchedule, PaymentStatus};
use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::store::AccountStore;
use log::{debug, warn};
use std::collections::HashMap;

/// The ledger engine.
///
/// Single-writer and synchronous: each call runs to completion and validates
/// before it mutates. A call that fails with a [`LedgerError`] applies none
/// of its own effects, though any cashback due by its timestamp is still
/// credited. Instances share no state.
///
/// # Time
///
/// The engine never reads a wall clock. Callers are expected to supply
/// non-decreasing timestamps; see [`LedgerConfig::reject_out_of_order`] for
/// how regressions are handled. Only successful calls advance the clock.
pub struct LedgerEngine {
    config: LedgerConfig,

    /// Live accounts.
    accounts: AccountStore,

    /// Payment id to the account that currently owns it.
    payments: HashMap<String, AccountId>,

    cashback: CashbackSchedule,

    /// Number of payments issued so far; drives payment id allocation.
    payment_count: u64,

    /// Latest timestamp of a successful call.
    latest_timestamp: Option<Timestamp>,
}

impl LedgerEngine {
    /// Creates an empty engine with the default configuration.
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        LedgerEngine {
            config,
            accounts: AccountStore::new(),
            payments: HashMap::new(),
            cashback: CashbackSchedule::new(),
            payment_count: 0,
            latest_timestamp: None,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Opens a new account with a zero balance.
    ///
    /// Returns `false` if `id` is live or was ever absorbed by a merge.
    pub fn create_account(&mut self, timestamp: Timestamp, id: &str) -> bool {
        self.run("create_account", timestamp, |engine| {
            engine.apply_create(timestamp, id)
        })
        .is_ok()
    }

    fn apply_create(&mut self, timestamp: Timestamp, id: &str) -> Result<()> {
        if self.accounts.find_by_any_historical_id(id).is_some()
            || !self.accounts.create(id, timestamp)
        {
            return Err(LedgerError::AccountExists { id: id.to_string() });
        }

        debug!("t={}: created account '{}'", timestamp, id);
        Ok(())
    }

    /// Credits `amount` to a live account and returns the new balance.
    pub fn deposit(&mut self, timestamp: Timestamp, id: &str, amount: Amount) -> Result<Amount> {
        self.run("deposit", timestamp, |engine| {
            engine.apply_deposit(timestamp, id, amount)
        })
    }

    fn apply_deposit(
        &mut self,
        timestamp: Timestamp,
        id: &str,
        amount: Amount,
    ) -> Result<Amount> {
        self.process_due_cashback(timestamp);

        let account = self
            .accounts
            .find_mut(id)
            .ok_or_else(|| LedgerError::not_found(id))?;

        if amount <= 0 {
            return Err(LedgerError::InvalidAmount { amount });
        }
        checked_sum(id, account.balance, amount)?;

        let credited = account.credit(timestamp, amount);
        debug_assert!(credited);
        debug!(
            "t={}: deposited {} into '{}', balance {}",
            timestamp, amount, id, account.balance
        );

        Ok(account.balance)
    }

    /// Moves `amount` between two live accounts and returns the source's
    /// new balance.
    ///
    /// Transferring exactly the source balance is allowed.
    pub fn transfer(
        &mut self,
        timestamp: Timestamp,
        source_id: &str,
        target_id: &str,
        amount: Amount,
    ) -> Result<Amount> {
        self.run("transfer", timestamp, |engine| {
            engine.apply_transfer(timestamp, source_id, target_id, amount)
        })
    }

    fn apply_transfer(
        &mut self,
        timestamp: Timestamp,
        source_id: &str,
        target_id: &str,
        amount: Amount,
    ) -> Result<Amount> {
        self.process_due_cashback(timestamp);

        let source_balance = self.live_balance(source_id)?;
        let target_balance = self.live_balance(target_id)?;

        if source_id == target_id {
            return Err(LedgerError::SameAccount {
                id: source_id.to_string(),
            });
        }
        check_debit(source_id, source_balance, amount)?;
        checked_sum(target_id, target_balance, amount)?;

        let [source, target] = self
            .accounts
            .pair_mut(source_id, target_id)
            .ok_or_else(|| LedgerError::not_found(target_id))?;
        let outgoing = checked_sum(source_id, source.outgoing, amount)?;

        let debited = source.debit(timestamp, amount);
        debug_assert!(debited);
        source.outgoing = outgoing;
        let credited = target.credit(timestamp, amount);
        debug_assert!(credited);

        debug!(
            "t={}: transferred {} from '{}' to '{}', balances {} / {}",
            timestamp, amount, source_id, target_id, source.balance, target.balance
        );

        Ok(source.balance)
    }

    /// Withdraws `amount` and schedules cashback on it.
    ///
    /// Returns the new payment id (`payment1`, `payment2`, ...).
    pub fn pay(&mut self, timestamp: Timestamp, id: &str, amount: Amount) -> Result<String> {
        self.run("pay", timestamp, |engine| {
            engine.apply_pay(timestamp, id, amount)
        })
    }

    fn apply_pay(&mut self, timestamp: Timestamp, id: &str, amount: Amount) -> Result<String> {
        self.process_due_cashback(timestamp);

        let balance = self.live_balance(id)?;
        check_debit(id, balance, amount)?;

        let account = self
            .accounts
            .find_mut(id)
            .ok_or_else(|| LedgerError::not_found(id))?;
        let outgoing = checked_sum(id, account.outgoing, amount)?;

        let debited = account.debit(timestamp, amount);
        debug_assert!(debited);
        account.outgoing = outgoing;
        let remaining = account.balance;

        self.payment_count += 1;
        let payment = format!("payment{}", self.payment_count);
        self.payments.insert(payment.clone(), id.to_string());

        let cashback = self.config.cashback_rate.cashback_for(amount);
        self.cashback
            .schedule(&payment, CashbackEntry::new(timestamp, id, cashback));

        debug!(
            "t={}: '{}' paid {} as {}, balance {}, cashback {} pending",
            timestamp, id, amount, payment, remaining, cashback
        );

        Ok(payment)
    }

    /// Reports the cashback status of a payment owned by `id`.
    pub fn get_payment_status(
        &mut self,
        timestamp: Timestamp,
        id: &str,
        payment: &str,
    ) -> Result<PaymentStatus> {
        self.run("get_payment_status", timestamp, |engine| {
            engine.apply_payment_status(timestamp, id, payment)
        })
    }

    fn apply_payment_status(
        &mut self,
        timestamp: Timestamp,
        id: &str,
        payment: &str,
    ) -> Result<PaymentStatus> {
        self.process_due_cashback(timestamp);

        self.live_balance(id)?;

        let owner = self
            .payments
            .get(payment)
            .ok_or_else(|| LedgerError::PaymentNotFound {
                payment: payment.to_string(),
            })?;

        if owner != id {
            return Err(LedgerError::PaymentOwnerMismatch {
                payment: payment.to_string(),
                id: id.to_string(),
            });
        }

        self.cashback
            .status(payment)
            .ok_or_else(|| LedgerError::PaymentNotFound {
                payment: payment.to_string(),
            })
    }

    /// Top `n` live accounts by outgoing total, formatted as `id(amount)`.
    ///
    /// Ties are broken by ascending id. Read-only: neither sweeps cashback
    /// nor advances the engine clock.
    pub fn top_spenders(&self, timestamp: Timestamp, n: usize) -> Vec<String> {
        let mut ranked: Vec<(&str, Amount)> = self
            .accounts
            .iter()
            .map(|account| (account.id.as_str(), account.outgoing))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        debug!("t={}: top {} of {} spenders", timestamp, n, ranked.len());

        ranked
            .into_iter()
            .take(n)
            .map(|(id, amount)| format!("{}({})", id, amount))
            .collect()
    }

    /// Folds `id2` into `id1`. Irreversible.
    ///
    /// `id1` receives `id2`'s balance, outgoing total, pending cashback,
    /// payments and balance history. `id2` stops being live but stays
    /// queryable through [`get_balance`](Self::get_balance) for times
    /// before the merge.
    pub fn merge_accounts(&mut self, timestamp: Timestamp, id1: &str, id2: &str) -> bool {
        self.run("merge_accounts", timestamp, |engine| {
            engine.apply_merge(timestamp, id1, id2)
        })
        .is_ok()
    }

    fn apply_merge(&mut self, timestamp: Timestamp, id1: &str, id2: &str) -> Result<()> {
        if id1 == id2 {
            return Err(LedgerError::SameAccount { id: id1.to_string() });
        }
        self.live_balance(id1)?;
        self.live_balance(id2)?;

        // id2 must see its own matured cashback before its balance moves
        self.process_due_cashback(timestamp);

        let (survivor, absorbed) = match (self.accounts.find(id1), self.accounts.find(id2)) {
            (Some(survivor), Some(absorbed)) => (survivor, absorbed),
            _ => return Err(LedgerError::not_found(id2)),
        };
        let balance = checked_sum(id1, survivor.balance, absorbed.balance)?;
        let outgoing = checked_sum(id1, survivor.outgoing, absorbed.outgoing)?;

        let absorbed = self
            .accounts
            .remove(id2)
            .ok_or_else(|| LedgerError::not_found(id2))?;
        let survivor = self
            .accounts
            .find_mut(id1)
            .ok_or_else(|| LedgerError::not_found(id1))?;

        if absorbed.balance > 0 {
            let credited = survivor.credit(timestamp, absorbed.balance);
            debug_assert!(credited);
        }
        debug_assert_eq!(survivor.balance, balance);
        survivor.outgoing = outgoing;

        debug!(
            "t={}: merged '{}' into '{}', balance {}, outgoing {}",
            timestamp, id2, id1, survivor.balance, survivor.outgoing
        );
        survivor.absorb_lineage(absorbed, timestamp);

        self.cashback.reassign(id2, id1);
        for owner in self.payments.values_mut() {
            if *owner == id2 {
                *owner = id1.to_string();
            }
        }

        Ok(())
    }

    /// Balance of `id` as of `time_at`.
    ///
    /// `id` may name a live account or one absorbed by a merge; absorbed ids
    /// only answer for times strictly before their absorption. Cashback is
    /// swept no further than the engine clock, so a `time_at` in the future
    /// sees the balance as it stands now.
    pub fn get_balance(
        &mut self,
        timestamp: Timestamp,
        id: &str,
        time_at: Timestamp,
    ) -> Result<Amount> {
        self.run("get_balance", timestamp, |engine| {
            engine.apply_get_balance(timestamp, id, time_at)
        })
    }

    fn apply_get_balance(
        &mut self,
        timestamp: Timestamp,
        id: &str,
        time_at: Timestamp,
    ) -> Result<Amount> {
        let owner = self.resolve_queryable(id, time_at)?;

        let now = self
            .latest_timestamp
            .map_or(timestamp, |latest| latest.max(timestamp));
        self.process_due_cashback(time_at.min(now));

        self.accounts
            .find(&owner)
            .and_then(|account| account.history_for(id))
            .and_then(|history| history.balance_at(time_at))
            .ok_or_else(|| LedgerError::NotYetCreated {
                id: id.to_string(),
                time_at,
            })
    }

    /// Finds the live account answering for `id` and checks `id` was
    /// queryable at `time_at`.
    fn resolve_queryable(&self, id: &str, time_at: Timestamp) -> Result<AccountId> {
        let account = self
            .accounts
            .find_by_any_historical_id(id)
            .ok_or_else(|| LedgerError::not_found(id))?;

        if let Some(merged_at) = account.merged_at(id) {
            if merged_at <= time_at {
                return Err(LedgerError::MergedAway {
                    id: id.to_string(),
                    merged_at,
                });
            }
        }

        let first = account
            .history_for(id)
            .and_then(|history| history.first_timestamp());
        match first {
            Some(first) if first <= time_at => Ok(account.id.clone()),
            _ => Err(LedgerError::NotYetCreated {
                id: id.to_string(),
                time_at,
            }),
        }
    }

    /// Credits every pending cashback mature at `now`.
    ///
    /// Each credit is snapshotted at its maturity time, not at `now`. An
    /// entry is credited once; later sweeps at earlier times do not revisit it.
    pub fn process_due_cashback(&mut self, now: Timestamp) {
        let window = self.config.maturity_window;

        for (payment, entry) in self.cashback.take_due(now, window) {
            let matured_at = entry.matures_at(window);
            let credited = match self.accounts.find_mut(&entry.owner) {
                Some(account) => {
                    let credited = account.credit(matured_at, entry.amount);
                    if credited {
                        debug!(
                            "t={}: cashback {} for {} credited to '{}', balance {}",
                            matured_at, entry.amount, payment, entry.owner, account.balance
                        );
                    }
                    credited
                }
                None => false,
            };

            if credited {
                self.cashback.complete(payment, entry);
            } else {
                warn!(
                    "t={}: cashback {} for {} could not be credited to '{}', left pending",
                    matured_at, entry.amount, payment, entry.owner
                );
                self.cashback.defer(payment, entry);
            }
        }
    }

    /// Runs one operation under the clock policy and logs its rejection.
    ///
    /// The clock advances only when the operation succeeds.
    fn run<T>(
        &mut self,
        operation: &str,
        timestamp: Timestamp,
        apply: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let result = match self.check_clock(timestamp) {
            Ok(()) => apply(self),
            Err(e) => Err(e),
        };

        match result {
            Ok(value) => {
                self.advance_clock(timestamp);
                Ok(value)
            }
            Err(e) => {
                warn!("t={}: {} rejected: {}", timestamp, operation, e);
                Err(e)
            }
        }
    }

    /// Applies the out-of-order policy without touching the clock.
    fn check_clock(&self, timestamp: Timestamp) -> Result<()> {
        match self.latest_timestamp {
            Some(latest) if timestamp < latest => {
                if self.config.reject_out_of_order {
                    return Err(LedgerError::ClockRegression { timestamp, latest });
                }
                warn!(
                    "t={}: timestamp precedes previously observed {}",
                    timestamp, latest
                );
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn advance_clock(&mut self, timestamp: Timestamp) {
        self.latest_timestamp = Some(
            self.latest_timestamp
                .map_or(timestamp, |latest| latest.max(timestamp)),
        );
    }

    fn live_balance(&self, id: &str) -> Result<Amount> {
        self.accounts
            .find(id)
            .map(|account| account.balance)
            .ok_or_else(|| LedgerError::not_found(id))
    }

    /// Live account by id.
    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.find(id)
    }

    /// Current balance of a live account.
    pub fn balance(&self, id: &str) -> Option<Amount> {
        self.accounts.find(id).map(|account| account.balance)
    }

    /// Outgoing total of a live account.
    pub fn outgoing_total(&self, id: &str) -> Option<Amount> {
        self.accounts.find(id).map(|account| account.outgoing)
    }

    pub fn is_live(&self, id: &str) -> bool {
        self.accounts.contains(id)
    }

    pub fn pending_cashback_count(&self) -> usize {
        self.cashback.pending_len()
    }
}

impl Default for LedgerEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Validates a debit of `amount` against `balance`.
fn check_debit(id: &str, balance: Amount, amount: Amount) -> Result<()> {
    if amount <= 0 {
        return Err(LedgerError::InvalidAmount { amount });
    }
    if amount > balance {
        return Err(LedgerError::InsufficientFunds {
            id: id.to_string(),
            balance,
            requested: amount,
        });
    }
    Ok(())
}

/// `current + amount`, or `AmountOverflow` against `id`.
fn checked_sum(id: &str, current: Amount, amount: Amount) -> Result<Amount> {
    current
        .checked_add(amount)
        .ok_or_else(|| LedgerError::AmountOverflow { id: id.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const DAY: u64 = 86_400_000;

    fn engine_with(ids: &[&str]) -> LedgerEngine {
        let mut engine = LedgerEngine::new();
        for id in ids {
            assert!(engine.create_account(1, id));
        }
        engine
    }

    #[test]
    fn test_create_duplicate_is_rejected() {
        let mut engine = engine_with(&["a"]);
        engine.deposit(2, "a", 10).unwrap();

        assert!(!engine.create_account(3, "a"));
        assert_eq!(engine.balance("a"), Some(10));
        assert_eq!(engine.get_balance(4, "a", 1), Ok(0));
    }

    #[test]
    fn test_deposit_validation() {
        let mut engine = engine_with(&["a"]);

        let kind = |r: Result<Amount>| r.unwrap_err().kind();
        assert_eq!(kind(engine.deposit(2, "a", 0)), ErrorKind::InvalidArgument);
        assert_eq!(kind(engine.deposit(2, "a", -5)), ErrorKind::InvalidArgument);
        assert_eq!(kind(engine.deposit(2, "zz", 5)), ErrorKind::NotFound);
        assert_eq!(engine.deposit(3, "a", 5), Ok(5));
        assert_eq!(engine.deposit(4, "a", 7), Ok(12));
    }

    #[test]
    fn test_transfer_conserves_total() {
        let mut engine = engine_with(&["a", "b"]);
        engine.deposit(2, "a", 100).unwrap();
        engine.deposit(2, "b", 30).unwrap();

        assert_eq!(engine.transfer(3, "a", "b", 40), Ok(60));
        assert_eq!(engine.balance("a"), Some(60));
        assert_eq!(engine.balance("b"), Some(70));
        assert_eq!(engine.outgoing_total("a"), Some(40));
        assert_eq!(engine.outgoing_total("b"), Some(0));
    }

    #[test]
    fn test_transfer_full_balance_but_not_more() {
        let mut engine = engine_with(&["a", "b"]);
        engine.deposit(2, "a", 50).unwrap();

        assert!(matches!(
            engine.transfer(3, "a", "b", 51),
            Err(LedgerError::InsufficientFunds { .. })
        ));
        assert_eq!(engine.transfer(4, "a", "b", 50), Ok(0));
        assert_eq!(engine.balance("b"), Some(50));
    }

    #[test]
    fn test_transfer_rejects_self_and_unknown() {
        let mut engine = engine_with(&["a"]);
        engine.deposit(2, "a", 50).unwrap();

        assert!(matches!(
            engine.transfer(3, "a", "a", 10),
            Err(LedgerError::SameAccount { .. })
        ));
        assert!(matches!(
            engine.transfer(3, "a", "nope", 10),
            Err(LedgerError::AccountNotFound { .. })
        ));
        assert_eq!(engine.balance("a"), Some(50));
    }

    #[test]
    fn test_pay_schedules_cashback_and_matures_once() {
        let mut engine = engine_with(&["a"]);
        engine.deposit(2, "a", 1_000).unwrap();

        let payment = engine.pay(10, "a", 500).unwrap();
        assert_eq!(payment, "payment1");
        assert_eq!(engine.balance("a"), Some(500));
        assert_eq!(
            engine.get_payment_status(11, "a", &payment),
            Ok(PaymentStatus::InProgress)
        );

        assert_eq!(
            engine.get_payment_status(10 + DAY - 1, "a", &payment),
            Ok(PaymentStatus::InProgress)
        );
        assert_eq!(
            engine.get_payment_status(10 + DAY, "a", &payment),
            Ok(PaymentStatus::CashbackReceived)
        );
        assert_eq!(engine.balance("a"), Some(510));

        engine.deposit(10 + 3 * DAY, "a", 1).unwrap();
        assert_eq!(engine.balance("a"), Some(511));
        assert_eq!(engine.pending_cashback_count(), 0);
    }

    #[test]
    fn test_payment_status_checks_owner() {
        let mut engine = engine_with(&["a", "b"]);
        engine.deposit(2, "a", 100).unwrap();
        let payment = engine.pay(3, "a", 10).unwrap();

        assert!(matches!(
            engine.get_payment_status(4, "b", &payment),
            Err(LedgerError::PaymentOwnerMismatch { .. })
        ));
        assert!(matches!(
            engine.get_payment_status(4, "a", "payment42"),
            Err(LedgerError::PaymentNotFound { .. })
        ));
        assert!(matches!(
            engine.get_payment_status(4, "ghost", &payment),
            Err(LedgerError::AccountNotFound { .. })
        ));
    }

    #[test]
    fn test_top_spenders_orders_and_truncates() {
        let mut engine = engine_with(&["c", "a", "b", "d"]);
        for id in ["a", "b", "c", "d"] {
            engine.deposit(2, id, 100).unwrap();
        }
        engine.transfer(3, "b", "a", 30).unwrap();
        engine.pay(4, "c", 30).unwrap();
        engine.pay(5, "d", 50).unwrap();

        assert_eq!(engine.top_spenders(6, 3), vec!["d(50)", "b(30)", "c(30)"]);
        assert_eq!(engine.top_spenders(6, 10).len(), 4);
        assert!(engine.top_spenders(6, 0).is_empty());
    }

    #[test]
    fn test_merge_moves_balance_outgoing_and_payments() {
        let mut engine = engine_with(&["a", "b"]);
        engine.deposit(2, "a", 100).unwrap();
        engine.deposit(2, "b", 1_000).unwrap();
        engine.transfer(3, "a", "b", 10).unwrap();
        let payment = engine.pay(4, "b", 500).unwrap();

        assert!(engine.merge_accounts(5, "a", "b"));
        assert!(!engine.is_live("b"));
        assert_eq!(engine.balance("a"), Some(90 + 510));
        assert_eq!(engine.outgoing_total("a"), Some(510));
        assert_eq!(
            engine.get_payment_status(6, "a", &payment),
            Ok(PaymentStatus::InProgress)
        );

        engine.deposit(4 + DAY, "a", 1).unwrap();
        assert_eq!(engine.balance("a"), Some(600 + 10 + 1));
        assert_eq!(
            engine.get_payment_status(4 + DAY, "a", &payment),
            Ok(PaymentStatus::CashbackReceived)
        );
    }

    #[test]
    fn test_merge_rejections() {
        let mut engine = engine_with(&["a", "b"]);

        assert!(!engine.merge_accounts(2, "a", "a"));
        assert!(!engine.merge_accounts(2, "a", "ghost"));
        assert!(!engine.merge_accounts(2, "ghost", "a"));
        assert!(engine.merge_accounts(3, "a", "b"));
        assert!(!engine.merge_accounts(4, "a", "b"));
    }

    #[test]
    fn test_merged_id_cannot_be_reused() {
        let mut engine = engine_with(&["a", "b"]);
        assert!(engine.merge_accounts(2, "a", "b"));

        assert!(!engine.create_account(3, "b"));
        assert!(engine.deposit(3, "b", 5).is_err());
        assert!(engine.pay(3, "b", 5).is_err());
        assert!(engine.transfer(3, "a", "b", 5).is_err());
    }

    #[test]
    fn test_get_balance_history_visibility() {
        let mut engine = engine_with(&["a"]);
        engine.create_account(2, "b");
        engine.deposit(3, "b", 40).unwrap();
        assert!(engine.merge_accounts(10, "a", "b"));

        assert_eq!(engine.get_balance(11, "b", 2), Ok(0));
        assert_eq!(engine.get_balance(11, "b", 9), Ok(40));
        assert!(matches!(
            engine.get_balance(11, "b", 10),
            Err(LedgerError::MergedAway { merged_at: 10, .. })
        ));
        assert!(matches!(
            engine.get_balance(11, "b", 1),
            Err(LedgerError::NotYetCreated { .. })
        ));
        assert_eq!(engine.get_balance(11, "a", 9), Ok(0));
        assert_eq!(engine.get_balance(11, "a", 10), Ok(40));
    }

    #[test]
    fn test_outgoing_total_overflow_is_rejected() {
        let mut engine = engine_with(&["a", "b"]);
        engine.deposit(2, "a", Amount::MAX).unwrap();
        engine.transfer(3, "a", "b", Amount::MAX).unwrap();
        engine.transfer(4, "b", "a", Amount::MAX).unwrap();

        assert_eq!(
            engine.transfer(5, "a", "b", 1),
            Err(LedgerError::AmountOverflow { id: "a".into() })
        );
        assert_eq!(
            engine.pay(5, "a", 1),
            Err(LedgerError::AmountOverflow { id: "a".into() })
        );
        assert_eq!(engine.balance("a"), Some(Amount::MAX));
        assert_eq!(engine.balance("b"), Some(0));
        assert_eq!(engine.outgoing_total("a"), Some(Amount::MAX));
        assert_eq!(engine.pending_cashback_count(), 0);
    }

    #[test]
    fn test_get_balance_sweep_stops_at_engine_clock() {
        let mut engine = engine_with(&["a"]);
        engine.deposit(2, "a", 1_000).unwrap();
        let payment = engine.pay(3, "a", 500).unwrap();

        assert_eq!(engine.get_balance(4, "a", 3 + 2 * DAY), Ok(500));
        assert_eq!(
            engine.get_payment_status(4, "a", &payment),
            Ok(PaymentStatus::InProgress)
        );

        engine.deposit(5, "a", 100).unwrap();
        let history = engine.account("a").unwrap().history_for("a").unwrap();
        assert_eq!(history.snapshots(), &[(1, 0), (2, 1_000), (3, 500), (5, 600)]);
    }

    #[test]
    fn test_failed_call_does_not_advance_strict_clock() {
        let config = LedgerConfig::default().with_reject_out_of_order(true);
        let mut strict = LedgerEngine::with_config(config);
        assert!(strict.create_account(1, "a"));

        assert!(strict.deposit(1_000, "ghost", 5).is_err());
        assert!(strict.get_balance(1_000, "ghost", 1).is_err());
        assert_eq!(strict.deposit(2, "a", 5), Ok(5));
    }

    #[test]
    fn test_clock_regression_policy() {
        let mut lenient = engine_with(&["a"]);
        lenient.deposit(10, "a", 5).unwrap();
        assert_eq!(lenient.deposit(5, "a", 5), Ok(10));

        let config = LedgerConfig::default().with_reject_out_of_order(true);
        let mut strict = LedgerEngine::with_config(config);
        assert!(strict.create_account(10, "a"));
        assert!(!strict.create_account(9, "b"));
        assert_eq!(
            strict.deposit(9, "a", 5).unwrap_err().kind(),
            ErrorKind::OutOfOrder
        );
        assert_eq!(strict.deposit(10, "a", 5), Ok(5));
    }
}
