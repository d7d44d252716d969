//! Account model and balance history.
//!
//! Maintains the invariant: `balance >= 0` for every live account, and
//! snapshot timestamps strictly increase within each history bucket.

use std::collections::HashMap;

/// Account identifier, unique across the lifetime of an engine.
pub type AccountId = String;

/// Caller-supplied logical clock value.
pub type Timestamp = u64;

/// Signed ledger amount.
pub type Amount = i64;

/// Time-ordered balance snapshots for a single account id.
///
/// Each entry holds the balance immediately after the mutation recorded at
/// that timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceHistory {
    snapshots: Vec<(Timestamp, Amount)>,
}

impl BalanceHistory {
    /// Creates a history seeded with a single snapshot.
    pub fn starting_at(timestamp: Timestamp, balance: Amount) -> Self {
        BalanceHistory {
            snapshots: vec![(timestamp, balance)],
        }
    }

    /// Records the balance after a mutation at `timestamp`.
    ///
    /// A mutation at or before the latest snapshot overwrites that snapshot,
    /// so timestamps stay strictly increasing even if the caller's clock
    /// goes backwards.
    pub fn record(&mut self, timestamp: Timestamp, balance: Amount) {
        match self.snapshots.last_mut() {
            Some(last) if timestamp <= last.0 => last.1 = balance,
            _ => self.snapshots.push((timestamp, balance)),
        }
    }

    /// Timestamp of the earliest snapshot.
    pub fn first_timestamp(&self) -> Option<Timestamp> {
        self.snapshots.first().map(|(t, _)| *t)
    }

    /// Balance at the latest snapshot taken at or before `time_at`.
    pub fn balance_at(&self, time_at: Timestamp) -> Option<Amount> {
        self.snapshots
            .iter()
            .take_while(|(t, _)| *t <= time_at)
            .last()
            .map(|(_, balance)| *balance)
    }

    pub fn snapshots(&self) -> &[(Timestamp, Amount)] {
        &self.snapshots
    }
}

/// A live ledger account.
///
/// # Merge lineage
///
/// `history` holds one bucket per id that has ever been folded into this
/// account (its own id included). `merged_from` records when each absorbed
/// id stopped existing independently, transitively across chained merges.
#[derive(Debug, Clone)]
pub struct Account {
    /// Unique, immutable identifier.
    pub id: AccountId,

    /// Timestamp of creation.
    pub created_at: Timestamp,

    /// Current balance. Never negative.
    pub balance: Amount,

    /// Cumulative amount moved out by transfers and payments.
    pub outgoing: Amount,

    history: HashMap<AccountId, BalanceHistory>,

    merged_from: HashMap<AccountId, Timestamp>,
}

impl Account {
    /// Creates a new account with zero balance and a seeded history.
    pub fn new(id: &str, created_at: Timestamp) -> Self {
        let mut history = HashMap::new();
        history.insert(id.to_string(), BalanceHistory::starting_at(created_at, 0));

        Account {
            id: id.to_string(),
            created_at,
            balance: 0,
            outgoing: 0,
            history,
            merged_from: HashMap::new(),
        }
    }

    /// Credits the account and snapshots the result in its own bucket.
    ///
    /// Returns `false`, leaving the account untouched, if the balance would
    /// overflow.
    pub fn credit(&mut self, timestamp: Timestamp, amount: Amount) -> bool {
        match self.balance.checked_add(amount) {
            Some(balance) => {
                self.balance = balance;
                self.snapshot(timestamp);
                true
            }
            None => false,
        }
    }

    /// Debits the account and snapshots the result in its own bucket.
    ///
    /// Returns `false`, leaving the account untouched, if `amount` exceeds
    /// the balance.
    pub fn debit(&mut self, timestamp: Timestamp, amount: Amount) -> bool {
        if amount > self.balance {
            return false;
        }

        self.balance -= amount;
        self.snapshot(timestamp);
        true
    }

    fn snapshot(&mut self, timestamp: Timestamp) {
        let balance = self.balance;
        self.history
            .entry(self.id.clone())
            .or_default()
            .record(timestamp, balance);
    }

    /// History bucket for `id`, if this account answers for it.
    pub fn history_for(&self, id: &str) -> Option<&BalanceHistory> {
        self.history.get(id)
    }

    /// Returns `true` if `id` is this account or was absorbed into it.
    pub fn answers_for(&self, id: &str) -> bool {
        self.history.contains_key(id)
    }

    /// When `id` was absorbed into this account, if it was.
    pub fn merged_at(&self, id: &str) -> Option<Timestamp> {
        self.merged_from.get(id).copied()
    }

    /// Folds `other` into this account's lineage at `timestamp`.
    ///
    /// Copies every history bucket and prior merge record of `other`, then
    /// records `other` itself as absorbed. Buckets are keyed by globally
    /// unique ids so the union never collides. Balance and outgoing totals
    /// are left to the caller.
    pub fn absorb_lineage(&mut self, other: Account, timestamp: Timestamp) {
        self.history.extend(other.history);
        self.merged_from.extend(other.merged_from);
        self.merged_from.insert(other.id, timestamp);
    }
}
