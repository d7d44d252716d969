//! Deferred cashback schedule.
//!
//! Every payment schedules one entry. An entry stays pending until the sweep
//! sees a time at or past `scheduled_at + maturity_window`, then moves to the
//! completed set exactly once.

use crate::account::{AccountId, Amount, Timestamp};
use std::collections::HashMap;
use std::fmt;

/// Lifecycle state of a payment's cashback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    /// Waiting for the maturity window to elapse.
    InProgress,

    /// Cashback has been credited.
    CashbackReceived,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::InProgress => "IN_PROGRESS",
            PaymentStatus::CashbackReceived => "CASHBACK_RECEIVED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cashback owed on a single payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashbackEntry {
    /// Timestamp of the payment.
    pub scheduled_at: Timestamp,

    /// Account credited at maturity. Follows merges while pending.
    pub owner: AccountId,

    /// Amount credited at maturity.
    pub amount: Amount,

    pub status: PaymentStatus,
}

impl CashbackEntry {
    pub fn new(scheduled_at: Timestamp, owner: &str, amount: Amount) -> Self {
        CashbackEntry {
            scheduled_at,
            owner: owner.to_string(),
            amount,
            status: PaymentStatus::InProgress,
        }
    }

    /// Time at which the cashback becomes payable.
    pub fn matures_at(&self, window: u64) -> Timestamp {
        self.scheduled_at.saturating_add(window)
    }
}

/// Pending and completed cashback, keyed by payment id.
///
/// Pending entries keep insertion order so the sweep credits them in the
/// order the payments were made.
#[derive(Debug, Default)]
pub struct CashbackSchedule {
    pending: Vec<(String, CashbackEntry)>,
    completed: HashMap<String, CashbackEntry>,
}

impl CashbackSchedule {
    pub fn new() -> Self {
        CashbackSchedule {
            pending: Vec::new(),
            completed: HashMap::new(),
        }
    }

    /// Schedules cashback for a new payment.
    pub fn schedule(&mut self, payment: &str, entry: CashbackEntry) {
        self.pending.push((payment.to_string(), entry));
    }

    /// Removes and returns every pending entry mature at `now`, in
    /// insertion order. The caller credits them and hands them back through
    /// [`complete`](Self::complete).
    pub fn take_due(&mut self, now: Timestamp, window: u64) -> Vec<(String, CashbackEntry)> {
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|(_, entry)| entry.matures_at(window) <= now);
        self.pending = waiting;
        due
    }

    /// Puts an entry that could not be credited back into the pending set.
    pub fn defer(&mut self, payment: String, entry: CashbackEntry) {
        self.pending.push((payment, entry));
    }

    /// Records a credited entry as completed.
    pub fn complete(&mut self, payment: String, mut entry: CashbackEntry) {
        entry.status = PaymentStatus::CashbackReceived;
        self.completed.insert(payment, entry);
    }

    /// Repoints every pending entry owned by `from` to `to`.
    pub fn reassign(&mut self, from: &str, to: &str) {
        for (_, entry) in self.pending.iter_mut() {
            if entry.owner == from {
                entry.owner = to.to_string();
            }
        }
    }

    /// Looks up an entry in whichever set currently holds it.
    pub fn get(&self, payment: &str) -> Option<&CashbackEntry> {
        self.pending
            .iter()
            .find(|(id, _)| id == payment)
            .map(|(_, entry)| entry)
            .or_else(|| self.completed.get(payment))
    }

    pub fn status(&self, payment: &str) -> Option<PaymentStatus> {
        self.get(payment).map(|entry| entry.status)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn completed_len(&self) -> usize {
        self.completed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: u64 = 100;

    #[test]
    fn test_status_strings() {
        assert_eq!(PaymentStatus::InProgress.to_string(), "IN_PROGRESS");
        assert_eq!(
            PaymentStatus::CashbackReceived.to_string(),
            "CASHBACK_RECEIVED"
        );
    }

    #[test]
    fn test_take_due_respects_window_boundary() {
        let mut schedule = CashbackSchedule::new();
        schedule.schedule("payment1", CashbackEntry::new(10, "a", 3));

        assert!(schedule.take_due(109, WINDOW).is_empty());
        assert_eq!(schedule.pending_len(), 1);

        let due = schedule.take_due(110, WINDOW);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].0, "payment1");
        assert_eq!(schedule.pending_len(), 0);
    }

    #[test]
    fn test_take_due_keeps_insertion_order() {
        let mut schedule = CashbackSchedule::new();
        schedule.schedule("payment1", CashbackEntry::new(5, "a", 1));
        schedule.schedule("payment2", CashbackEntry::new(1, "b", 2));
        schedule.schedule("payment3", CashbackEntry::new(500, "c", 3));

        let due: Vec<String> = schedule
            .take_due(200, WINDOW)
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(due, vec!["payment1", "payment2"]);
        assert_eq!(schedule.status("payment3"), Some(PaymentStatus::InProgress));
    }

    #[test]
    fn test_complete_moves_entry_once() {
        let mut schedule = CashbackSchedule::new();
        schedule.schedule("payment1", CashbackEntry::new(0, "a", 4));

        for (id, entry) in schedule.take_due(WINDOW, WINDOW) {
            schedule.complete(id, entry);
        }
        assert_eq!(
            schedule.status("payment1"),
            Some(PaymentStatus::CashbackReceived)
        );
        assert!(schedule.take_due(10 * WINDOW, WINDOW).is_empty());
        assert_eq!(schedule.completed_len(), 1);
    }

    #[test]
    fn test_reassign_only_touches_pending_owner() {
        let mut schedule = CashbackSchedule::new();
        schedule.schedule("payment1", CashbackEntry::new(0, "b", 1));
        schedule.schedule("payment2", CashbackEntry::new(0, "c", 1));

        schedule.reassign("b", "a");
        assert_eq!(schedule.get("payment1").unwrap().owner, "a");
        assert_eq!(schedule.get("payment2").unwrap().owner, "c");
        assert!(schedule.get("payment9").is_none());
    }
}
