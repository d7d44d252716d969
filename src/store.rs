//! Live account storage.

use crate::account::{Account, Timestamp};
use std::collections::HashMap;

/// Owns the set of live accounts, indexed by id.
///
/// Absorbed accounts are removed from the index but remain reachable
/// through the history buckets of the account that absorbed them.
#[derive(Debug, Default)]
pub struct AccountStore {
    accounts: HashMap<String, Account>,
}

impl AccountStore {
    pub fn new() -> Self {
        AccountStore {
            accounts: HashMap::new(),
        }
    }

    /// Creates an account. Returns `false` if `id` is already live.
    pub fn create(&mut self, id: &str, timestamp: Timestamp) -> bool {
        if self.accounts.contains_key(id) {
            return false;
        }

        self.accounts
            .insert(id.to_string(), Account::new(id, timestamp));
        true
    }

    /// Live lookup only.
    pub fn find(&self, id: &str) -> Option<&Account> {
        self.accounts.get(id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Account> {
        self.accounts.get_mut(id)
    }

    /// Resolves `id` to the live account that currently answers for it,
    /// following merges.
    pub fn find_by_any_historical_id(&self, id: &str) -> Option<&Account> {
        self.find(id)
            .or_else(|| self.accounts.values().find(|account| account.answers_for(id)))
    }

    /// Removes a live account, handing it back to the caller.
    pub fn remove(&mut self, id: &str) -> Option<Account> {
        self.accounts.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.accounts.contains_key(id)
    }

    /// Mutable access to two distinct live accounts at once.
    pub fn pair_mut(&mut self, first: &str, second: &str) -> Option<[&mut Account; 2]> {
        if first == second {
            return None;
        }

        let mut first_ref = None;
        let mut second_ref = None;
        for (id, account) in self.accounts.iter_mut() {
            if id == first {
                first_ref = Some(account);
            } else if id == second {
                second_ref = Some(account);
            }
        }

        Some([first_ref?, second_ref?])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rejects_duplicate() {
        let mut store = AccountStore::new();
        assert!(store.create("a", 1));
        assert!(!store.create("a", 2));

        assert_eq!(store.iter().count(), 1);
        assert_eq!(store.find("a").unwrap().created_at, 1);
    }

    #[test]
    fn test_find_by_historical_id_follows_merge() {
        let mut store = AccountStore::new();
        store.create("a", 1);
        store.create("b", 2);

        let b = store.remove("b").unwrap();
        store.find_mut("a").unwrap().absorb_lineage(b, 3);

        assert!(store.find("b").is_none());
        assert_eq!(store.find_by_any_historical_id("b").unwrap().id, "a");
        assert_eq!(store.find_by_any_historical_id("a").unwrap().id, "a");
        assert!(store.find_by_any_historical_id("zzz").is_none());
    }

    #[test]
    fn test_pair_mut_requires_two_distinct_live_accounts() {
        let mut store = AccountStore::new();
        store.create("a", 1);
        store.create("b", 1);

        assert!(store.pair_mut("a", "a").is_none());
        assert!(store.pair_mut("a", "missing").is_none());

        let [a, b] = store.pair_mut("a", "b").unwrap();
        a.credit(2, 5);
        b.credit(2, 7);
        assert_eq!(store.find("a").unwrap().balance, 5);
        assert_eq!(store.find("b").unwrap().balance, 7);
    }
}
