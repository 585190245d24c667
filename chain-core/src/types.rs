//! Core types for the chain
//!
//! All types are designed for:
//! - Deterministic serialization (ordered maps, canonical JSON)
//! - Wire compatibility (every record is a plain `account -> integer` map)
//! - Exact arithmetic (signed 64-bit integer balances)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Account identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create new account ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Hex-encoded SHA-256 digest identifying a block
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockHash(String);

impl BlockHash {
    /// Wrap an already computed hex digest
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Get as hex string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Balance transfer: signed delta per account.
///
/// Admissible only when the deltas sum to zero and no account is overdrawn,
/// see [`crate::is_valid_txn`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transaction(BTreeMap<AccountId, i64>);

impl Transaction {
    /// Create from account deltas
    pub fn new(deltas: BTreeMap<AccountId, i64>) -> Self {
        Self(deltas)
    }

    /// Delta for an account (0 if not touched)
    pub fn delta(&self, account: &AccountId) -> i64 {
        self.0.get(account).copied().unwrap_or(0)
    }

    /// Iterate over `(account, delta)` pairs in account order
    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, i64)> {
        self.0.iter().map(|(account, delta)| (account, *delta))
    }

    /// Sum of all deltas, widened so it cannot overflow
    pub fn net(&self) -> i128 {
        self.0.values().map(|delta| i128::from(*delta)).sum()
    }

    /// Number of accounts touched
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no account is touched
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<AccountId>> FromIterator<(K, i64)> for Transaction {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<const N: usize> From<[(&str, i64); N]> for Transaction {
    fn from(entries: [(&str, i64); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_entries(f, self.iter())
    }
}

/// Genesis pseudo-transaction: initial balance per account.
///
/// Serialized exactly like a [`Transaction`] but never subject to the
/// zero-sum or overdraft rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Allocation(BTreeMap<AccountId, i64>);

impl Allocation {
    /// Create from initial balances
    pub fn new(balances: BTreeMap<AccountId, i64>) -> Self {
        Self(balances)
    }

    /// Iterate over `(account, balance)` pairs in account order
    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, i64)> {
        self.0.iter().map(|(account, amount)| (account, *amount))
    }
}

impl<K: Into<AccountId>> FromIterator<(K, i64)> for Allocation {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<const N: usize> From<[(&str, i64); N]> for Allocation {
    fn from(entries: [(&str, i64); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_entries(f, self.iter())
    }
}

pub(crate) fn write_entries<'a>(
    f: &mut fmt::Formatter<'_>,
    entries: impl Iterator<Item = (&'a AccountId, i64)>,
) -> fmt::Result {
    f.write_str("{")?;
    for (i, (account, amount)) in entries.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}: {}", account, amount)?;
    }
    f.write_str("}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_net() {
        assert_eq!(Transaction::from([("Alice", -3), ("Bob", 3)]).net(), 0);
        assert_eq!(Transaction::from([("Alice", -4), ("Bob", 3)]).net(), -1);
        assert_eq!(Transaction::default().net(), 0);
    }

    #[test]
    fn test_net_does_not_overflow() {
        let txn = Transaction::from([("Alice", i64::MAX), ("Bob", i64::MAX)]);
        assert_eq!(txn.net(), 2 * i128::from(i64::MAX));
    }

    #[test]
    fn test_transaction_serializes_as_plain_map() {
        let txn = Transaction::from([("Bob", 3), ("Alice", -3)]);
        let json = serde_json::to_string(&txn).unwrap();
        assert_eq!(json, r#"{"Alice":-3,"Bob":3}"#);

        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, txn);
    }

    #[test]
    fn test_delta_of_untouched_account() {
        let txn = Transaction::from([("Alice", -3), ("Bob", 3)]);
        assert_eq!(txn.delta(&AccountId::new("Lisa")), 0);
        assert_eq!(txn.delta(&AccountId::new("Bob")), 3);
    }

    #[test]
    fn test_display() {
        let alloc = Allocation::from([("Bob", 50), ("Alice", 50)]);
        assert_eq!(alloc.to_string(), "{Alice: 50, Bob: 50}");
    }
}
