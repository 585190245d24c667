//! Account balance state and the transfer rules applied to it
//!
//! `State` is a value: applying a transaction never touches the receiver,
//! it returns the next state. Callers keep the previous snapshot until they
//! explicitly adopt the new one.

use crate::types::{write_entries, AccountId, Allocation, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Mapping of account to balance at a point in the chain.
///
/// Accounts without an entry have an implicit balance of zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(BTreeMap<AccountId, i64>);

impl State {
    /// Empty state (every balance zero)
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of an account (0 if never credited)
    pub fn balance(&self, account: &AccountId) -> i64 {
        self.0.get(account).copied().unwrap_or(0)
    }

    /// Iterate over `(account, balance)` pairs in account order
    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, i64)> {
        self.0.iter().map(|(account, balance)| (account, *balance))
    }

    /// Number of known accounts
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no account is known
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all balances
    pub fn total_supply(&self) -> i128 {
        self.0.values().map(|balance| i128::from(*balance)).sum()
    }

    /// Return a new state with a transaction's deltas applied (no checks)
    pub fn apply(&self, txn: &Transaction) -> State {
        self.credit_all(txn.iter())
    }

    /// Return a new state with a genesis allocation credited (no checks)
    pub fn allocate(&self, allocation: &Allocation) -> State {
        self.credit_all(allocation.iter())
    }

    fn credit_all<'a>(&self, entries: impl Iterator<Item = (&'a AccountId, i64)>) -> State {
        let mut next = self.0.clone();
        for (account, amount) in entries {
            let balance = next.entry(account.clone()).or_insert(0);
            *balance = balance.saturating_add(amount);
        }
        State(next)
    }
}

impl<K: Into<AccountId>> FromIterator<(K, i64)> for State {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<const N: usize> From<[(&str, i64); N]> for State {
    fn from(entries: [(&str, i64); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_entries(f, self.iter())
    }
}

/// Check whether a transaction is admissible against a state.
///
/// Valid iff the deltas sum to zero and every touched account keeps a
/// non-negative balance that still fits in an `i64`. Never fails.
pub fn is_valid_txn(txn: &Transaction, state: &State) -> bool {
    if txn.net() != 0 {
        return false;
    }

    txn.iter().all(|(account, delta)| {
        let next = i128::from(state.balance(account)) + i128::from(delta);
        next >= 0 && i64::try_from(next).is_ok()
    })
}

/// Apply a transaction to a state, producing the next state.
///
/// Unconditional: validate with [`is_valid_txn`] first. `state` is left
/// untouched.
pub fn update_state(txn: &Transaction, state: &State) -> State {
    state.apply(txn)
}
