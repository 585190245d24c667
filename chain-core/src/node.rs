//! Node: owner of one `(chain, state)` pair
//!
//! Lifecycle is `init -> extend* -> read`. A node is extended either by
//! producing a block from its own assembler or by receiving a block from a
//! peer. A received block is adopted only if it validates against the tip;
//! otherwise chain and state stay exactly as they were.

use crate::{
    assembler::BlockAssembler,
    block::{Block, GenesisBlock},
    chain::Chain,
    state::State,
    types::Allocation,
    validation::{check_block_validity, check_chain, check_genesis},
    Error, Result,
};

/// Result of offering a block to a node
#[derive(Debug)]
pub enum BlockOutcome {
    /// Block appended; chain and state advanced
    Accepted {
        /// Number of the appended block
        block_number: u64,
    },

    /// Block refused; chain and state unchanged
    Rejected {
        /// Why the block failed validation
        reason: Error,
    },
}

impl BlockOutcome {
    /// Whether the block was appended
    pub fn is_accepted(&self) -> bool {
        matches!(self, BlockOutcome::Accepted { .. })
    }
}

/// A ledger node holding a validated chain and the state at its tip
#[derive(Debug, Clone)]
pub struct Node {
    chain: Chain,
    state: State,
}

impl Node {
    /// Start a fresh chain seeded with the given balances
    pub fn from_genesis(allocation: Allocation) -> Result<Self> {
        let genesis = GenesisBlock::genesis(allocation)?;
        let state = check_genesis(&genesis)?;

        tracing::info!(hash = %genesis.hash, "Genesis block created");

        Ok(Self {
            chain: Chain::new(genesis),
            state,
        })
    }

    /// Adopt an existing chain after validating it from genesis
    pub fn from_chain(chain: Chain) -> Result<Self> {
        let state = check_chain(&chain)?;
        Ok(Self { chain, state })
    }

    /// Current chain
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// State at the chain tip
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Number of blocks, genesis included
    pub fn height(&self) -> usize {
        self.chain.len()
    }

    /// Offer a candidate next block.
    ///
    /// Validation failures are reported as [`BlockOutcome::Rejected`] and
    /// leave the node untouched; any other error propagates.
    pub fn receive_block(&mut self, block: Block) -> Result<BlockOutcome> {
        match check_block_validity(&block, self.chain.tip(), &self.state) {
            Ok(state) => {
                let block_number = block.number();
                self.state = state;
                self.chain.blocks.push(block);

                tracing::info!(block_number, height = self.height(), "Block accepted");
                Ok(BlockOutcome::Accepted { block_number })
            }
            Err(reason) if reason.is_rejection() => {
                tracing::warn!(%reason, height = self.height(), "Block rejected");
                Ok(BlockOutcome::Rejected { reason })
            }
            Err(err) => Err(err),
        }
    }

    /// Seal the next block from the assembler's pending transactions.
    ///
    /// Returns the new block number, or `None` if no pending transaction
    /// was admissible.
    pub fn produce_block(&mut self, assembler: &mut BlockAssembler) -> Result<Option<u64>> {
        let Some(sealed) = assembler.seal(self.chain.tip(), &self.state)? else {
            return Ok(None);
        };

        let block_number = sealed.block.number();
        self.state = sealed.state;
        self.chain.blocks.push(sealed.block);

        tracing::info!(
            block_number,
            ignored = sealed.ignored,
            "Block produced"
        );
        Ok(Some(block_number))
    }

    /// Seal blocks until the assembler's buffer is empty.
    ///
    /// Returns the numbers of the blocks produced.
    pub fn drain(&mut self, assembler: &mut BlockAssembler) -> Result<Vec<u64>> {
        let mut produced = Vec::new();
        while !assembler.is_empty() {
            if let Some(block_number) = self.produce_block(assembler)? {
                produced.push(block_number);
            }
        }
        Ok(produced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{make_block, Transaction};

    fn node() -> Node {
        Node::from_genesis(Allocation::from([("Alice", 50), ("Bob", 50)])).unwrap()
    }

    #[test]
    fn test_accepts_valid_block() {
        let mut node = node();
        let block = make_block(
            vec![Transaction::from([("Alice", -3), ("Bob", 3)])],
            node.chain().tip(),
        )
        .unwrap();

        let outcome = node.receive_block(block).unwrap();
        assert!(matches!(outcome, BlockOutcome::Accepted { block_number: 1 }));
        assert_eq!(node.height(), 2);
        assert_eq!(node.state(), &State::from([("Alice", 47), ("Bob", 53)]));
    }

    #[test]
    fn test_rejects_overdraft_block() {
        let mut node = node();
        let before = node.clone();
        let block = make_block(
            vec![Transaction::from([("Alice", -60), ("Bob", 60)])],
            node.chain().tip(),
        )
        .unwrap();

        let outcome = node.receive_block(block).unwrap();
        assert!(matches!(
            outcome,
            BlockOutcome::Rejected {
                reason: Error::InvalidTransaction { .. }
            }
        ));
        assert_eq!(node.chain(), before.chain());
        assert_eq!(node.state(), before.state());
    }

    #[test]
    fn test_rejects_stale_block() {
        let mut node = node();
        let genesis_tip = make_block(vec![], node.chain().tip()).unwrap();
        assert!(node.receive_block(genesis_tip.clone()).unwrap().is_accepted());

        // Same block again no longer follows the tip
        let outcome = node.receive_block(genesis_tip).unwrap();
        assert!(matches!(
            outcome,
            BlockOutcome::Rejected {
                reason: Error::SequenceError { .. }
            }
        ));
        assert_eq!(node.height(), 2);
    }

    #[test]
    fn test_from_chain_validates() {
        let mut source = node();
        let block = make_block(
            vec![Transaction::from([("Bob", -5), ("Carol", 5)])],
            source.chain().tip(),
        )
        .unwrap();
        source.receive_block(block).unwrap();

        let copy = Node::from_chain(source.chain().clone()).unwrap();
        assert_eq!(copy.state(), source.state());

        let mut tampered = source.chain().clone();
        tampered.blocks[0].contents.txns[0] = Transaction::from([("Bob", -50), ("Carol", 50)]);
        assert!(matches!(
            Node::from_chain(tampered),
            Err(Error::HashMismatch { block_number: 1, .. })
        ));
    }

    #[test]
    fn test_produce_and_drain() {
        let mut node = node();
        let mut assembler = BlockAssembler::new(2);
        assembler.submit(Transaction::from([("Alice", -10), ("Bob", 10)]));
        assembler.submit(Transaction::from([("Alice", -100), ("Bob", 100)]));
        assembler.submit(Transaction::from([("Bob", -20), ("Carol", 20)]));
        assembler.submit(Transaction::from([("Carol", -5), ("Alice", 5)]));

        let produced = node.drain(&mut assembler).unwrap();
        assert_eq!(produced, vec![1, 2]);
        assert!(assembler.is_empty());
        assert_eq!(
            node.state(),
            &State::from([("Alice", 45), ("Bob", 40), ("Carol", 15)])
        );
        assert_eq!(check_chain(node.chain()).unwrap(), *node.state());
    }
}
