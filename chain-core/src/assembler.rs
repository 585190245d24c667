//! Block assembly from pending transactions
//!
//! The assembler buffers submitted transactions in arrival order. Sealing
//! takes candidates from the front of the buffer, keeps those admissible
//! against a running state and drops the rest, until the block is full or
//! the buffer is empty.

use crate::{
    block::{make_block, Block, BlockRef},
    state::{is_valid_txn, State},
    types::Transaction,
    Result,
};
use std::collections::VecDeque;

/// Block sealed by the assembler together with the state it produces
#[derive(Debug, Clone)]
pub struct SealedBlock {
    /// The new block
    pub block: Block,

    /// State after applying the block
    pub state: State,

    /// Candidates dropped as inadmissible while filling the block
    pub ignored: usize,
}

/// Pending transaction buffer with a per-block size limit
#[derive(Debug, Clone)]
pub struct BlockAssembler {
    pending: VecDeque<Transaction>,
    max_txns_per_block: usize,
}

impl BlockAssembler {
    /// Create an assembler sealing at most `max_txns_per_block` per block
    pub fn new(max_txns_per_block: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            max_txns_per_block: max_txns_per_block.max(1),
        }
    }

    /// Queue a transaction; returns the number pending
    pub fn submit(&mut self, txn: Transaction) -> usize {
        self.pending.push_back(txn);
        self.pending.len()
    }

    /// Number of pending transactions
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Whether enough transactions are pending to fill a block
    pub fn is_full(&self) -> bool {
        self.pending.len() >= self.max_txns_per_block
    }

    /// Fill and seal the block following `parent`.
    ///
    /// Consumes pending transactions until `max_txns_per_block` admissible
    /// ones are collected or the buffer runs out. Returns `None` if none
    /// were admissible (the inadmissible ones are still consumed).
    pub fn seal<'a>(
        &mut self,
        parent: impl Into<BlockRef<'a>>,
        state: &State,
    ) -> Result<Option<SealedBlock>> {
        let mut state = state.clone();
        let mut txns = Vec::with_capacity(self.max_txns_per_block);
        let mut ignored = 0;

        while txns.len() < self.max_txns_per_block {
            let Some(txn) = self.pending.pop_front() else {
                break;
            };

            if is_valid_txn(&txn, &state) {
                state = state.apply(&txn);
                txns.push(txn);
            } else {
                tracing::warn!(%txn, "Ignored transaction");
                ignored += 1;
            }
        }

        if txns.is_empty() {
            return Ok(None);
        }

        let block = make_block(txns, parent)?;
        Ok(Some(SealedBlock {
            block,
            state,
            ignored,
        }))
    }
}
