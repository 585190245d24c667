//! Blocks: ordered transaction batches sealed by a content hash
//!
//! The genesis block carries an [`Allocation`] instead of transfers, so it
//! is typed `Block<Allocation>`; every later block is `Block<Transaction>`.
//! Both serialize to the same `{hash, contents}` shape.

use crate::{
    canonical,
    types::{Allocation, BlockHash, Transaction},
    Error, Result,
};
use serde::{Deserialize, Serialize};

/// Hashed part of a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockContents<T = Transaction> {
    /// Position in the chain (genesis is 0)
    pub block_number: u64,

    /// Hash of the parent block (None for genesis)
    pub parent_hash: Option<BlockHash>,

    /// Number of records in `txns`
    pub txn_count: u64,

    /// Ordered records
    pub txns: Vec<T>,
}

impl<T: Serialize> BlockContents<T> {
    /// Compute the content hash
    pub fn compute_hash(&self) -> Result<BlockHash> {
        canonical::hash(self).map(BlockHash::from_hex)
    }
}

/// Block: contents plus the hash computed over them at creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block<T = Transaction> {
    /// Hash of `contents`
    pub hash: BlockHash,

    /// Hashed contents
    pub contents: BlockContents<T>,
}

/// First block of every chain
pub type GenesisBlock = Block<Allocation>;

impl<T: Serialize> Block<T> {
    /// Seal contents into a block
    pub fn seal(contents: BlockContents<T>) -> Result<Self> {
        let hash = contents.compute_hash()?;
        Ok(Self { hash, contents })
    }

    /// Block number
    pub fn number(&self) -> u64 {
        self.contents.block_number
    }

    /// Recompute the hash from the current contents
    pub fn compute_hash(&self) -> Result<BlockHash> {
        self.contents.compute_hash()
    }
}

impl GenesisBlock {
    /// Build the genesis block seeding the given balances
    pub fn genesis(allocation: Allocation) -> Result<Self> {
        Self::seal(BlockContents {
            block_number: 0,
            parent_hash: None,
            txn_count: 1,
            txns: vec![allocation],
        })
    }
}

/// Borrowed view of the fields a child block links against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef<'a> {
    /// Block number
    pub block_number: u64,
    /// Block hash
    pub hash: &'a BlockHash,
}

impl<'a, T> From<&'a Block<T>> for BlockRef<'a> {
    fn from(block: &'a Block<T>) -> Self {
        Self {
            block_number: block.contents.block_number,
            hash: &block.hash,
        }
    }
}

/// Seal transactions into the block following `parent`.
///
/// No validation: the assembler is expected to have screened `txns`
/// already.
pub fn make_block<'a>(txns: Vec<Transaction>, parent: impl Into<BlockRef<'a>>) -> Result<Block> {
    let parent = parent.into();
    let block_number = parent.block_number.checked_add(1).ok_or_else(|| {
        Error::MalformedChain(format!("no block can follow block {}", parent.block_number))
    })?;
    Block::seal(BlockContents {
        block_number,
        parent_hash: Some(parent.hash.clone()),
        txn_count: txns.len() as u64,
        txns,
    })
}
