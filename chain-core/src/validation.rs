//! Block and chain validation
//!
//! Validation replays transactions against a state and re-derives hashes
//! and links; nothing here mutates its inputs. Every check fails fast with
//! a named [`Error`] kind:
//!
//! | Check                         | Failure              |
//! |-------------------------------|----------------------|
//! | Transaction replay            | `InvalidTransaction` |
//! | Hash recomputation            | `HashMismatch`       |
//! | `number == parent.number + 1` | `SequenceError`      |
//! | `parentHash == parent.hash`   | `LinkageError`       |
//! | Input shape                   | `MalformedChain`     |

use crate::{
    block::{Block, BlockRef, GenesisBlock},
    chain::ChainSource,
    state::{is_valid_txn, State},
    Error, Result,
};
use serde::Serialize;

/// Verify that a block's stored hash matches its contents
pub fn check_block_hash<T: Serialize>(block: &Block<T>) -> Result<()> {
    let actual = block.compute_hash()?;
    if actual != block.hash {
        return Err(Error::HashMismatch {
            block_number: block.number(),
            expected: block.hash.clone(),
            actual,
        });
    }
    Ok(())
}

/// Validate a block against its parent and the state before it.
///
/// Checks, in order: every transaction replays cleanly, the hash matches
/// the contents, the number follows the parent, and the parent hash names
/// the parent. Returns the state after the block's transactions.
pub fn check_block_validity<'a>(
    block: &Block,
    parent: impl Into<BlockRef<'a>>,
    state: &State,
) -> Result<State> {
    let parent = parent.into();
    let block_number = block.number();

    let mut state = state.clone();
    for txn in &block.contents.txns {
        if !is_valid_txn(txn, &state) {
            return Err(Error::InvalidTransaction {
                block_number,
                txn: txn.clone(),
            });
        }
        state = state.apply(txn);
    }

    check_block_hash(block)?;

    if parent.block_number.checked_add(1) != Some(block_number) {
        return Err(Error::SequenceError {
            block_number,
            parent_number: parent.block_number,
        });
    }

    if block.contents.parent_hash.as_ref() != Some(parent.hash) {
        return Err(Error::LinkageError {
            block_number,
            expected: Some(parent.hash.clone()),
            actual: block.contents.parent_hash.clone(),
        });
    }

    tracing::debug!(
        block_number,
        txns = block.contents.txns.len(),
        "Block validated"
    );

    Ok(state)
}

/// Seed a state from the genesis block and verify it.
///
/// The allocation is credited unconditionally; only the hash and the
/// genesis position (number 0, no parent) are checked.
pub fn check_genesis(genesis: &GenesisBlock) -> Result<State> {
    let state = genesis
        .contents
        .txns
        .iter()
        .fold(State::new(), |state, allocation| state.allocate(allocation));

    check_block_hash(genesis)?;

    if genesis.number() != 0 {
        return Err(Error::SequenceError {
            block_number: genesis.number(),
            parent_number: 0,
        });
    }

    if genesis.contents.parent_hash.is_some() {
        return Err(Error::LinkageError {
            block_number: 0,
            expected: None,
            actual: genesis.contents.parent_hash.clone(),
        });
    }

    Ok(state)
}

/// Validate a whole chain from genesis, returning the final state.
///
/// Accepts a structured [`crate::Chain`] or its serialized JSON form; input
/// that cannot be read as a chain fails with [`Error::MalformedChain`].
pub fn check_chain<'a>(source: impl ChainSource<'a>) -> Result<State> {
    let chain = source.into_chain()?;

    let mut state = check_genesis(&chain.genesis)?;
    let mut parent: BlockRef<'_> = (&chain.genesis).into();

    for block in &chain.blocks {
        state = check_block_validity(block, parent, &state)?;
        parent = block.into();
    }

    tracing::debug!(height = chain.len(), accounts = state.len(), "Chain validated");

    Ok(state)
}
