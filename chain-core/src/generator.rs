//! Random transaction source for demos and load tests
//!
//! Each generated transaction moves between 1 and `max_value` units between
//! two distinct accounts in a random direction. Output is reproducible for
//! a given seed. No overdraft screening happens here; that is the
//! assembler's job.

use crate::{
    types::{AccountId, Transaction},
    Error, Result,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

/// Seeded generator of balanced two-party transfers
#[derive(Debug, Clone)]
pub struct TransactionGenerator {
    rng: StdRng,
    accounts: Vec<AccountId>,
    max_value: i64,
}

impl TransactionGenerator {
    /// Create a generator over `accounts` (at least two distinct ones)
    pub fn new(seed: u64, accounts: Vec<AccountId>, max_value: i64) -> Result<Self> {
        let mut accounts = accounts;
        accounts.sort();
        accounts.dedup();

        if accounts.len() < 2 {
            return Err(Error::Config(
                "generator needs at least two distinct accounts".to_string(),
            ));
        }
        if max_value < 1 {
            return Err(Error::Config(format!(
                "generator max_value must be at least 1, got {}",
                max_value
            )));
        }

        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            accounts,
            max_value,
        })
    }

    /// Generate one balanced transfer
    pub fn make_transaction(&mut self) -> Transaction {
        let n = self.accounts.len();
        let payer = self.rng.gen_range(0..n);
        let mut payee = self.rng.gen_range(0..n - 1);
        if payee >= payer {
            payee += 1;
        }
        let (payer, payee) = (self.accounts[payer].clone(), self.accounts[payee].clone());

        let sign = if self.rng.gen_bool(0.5) { 1 } else { -1 };
        let amount = sign * self.rng.gen_range(1..=self.max_value);

        Transaction::new(BTreeMap::from([(payer, amount), (payee, -amount)]))
    }

    /// Generate `count` transfers
    pub fn batch(&mut self, count: usize) -> Vec<Transaction> {
        (0..count).map(|_| self.make_transaction()).collect()
    }
}
