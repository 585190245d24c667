//! Error types for the chain engine

use crate::types::{BlockHash, Transaction};
use thiserror::Error;

/// Result type for chain operations
pub type Result<T> = std::result::Result<T, Error>;

/// Chain errors
#[derive(Error, Debug)]
pub enum Error {
    /// A transaction failed the zero-sum or overdraft rule during replay
    #[error("Invalid transaction in block {block_number}: {txn}")]
    InvalidTransaction {
        /// Block containing the transaction
        block_number: u64,
        /// Offending transaction
        txn: Transaction,
    },

    /// Stored hash differs from the digest of the block contents
    #[error("Hash does not match contents of block {block_number}: stored {expected}, computed {actual}")]
    HashMismatch {
        /// Block whose hash failed to verify
        block_number: u64,
        /// Hash stored on the block
        expected: BlockHash,
        /// Hash recomputed from contents
        actual: BlockHash,
    },

    /// Block number does not follow its parent
    #[error("Block number {block_number} does not follow parent block {parent_number}")]
    SequenceError {
        /// Block number found
        block_number: u64,
        /// Parent block number
        parent_number: u64,
    },

    /// Parent hash does not name the actual parent
    #[error("Parent hash not accurate at block {block_number}: expected {expected:?}, got {actual:?}")]
    LinkageError {
        /// Block whose link is broken
        block_number: u64,
        /// Hash the block should reference (None for genesis)
        expected: Option<BlockHash>,
        /// Hash the block actually references
        actual: Option<BlockHash>,
    },

    /// Input cannot be read as a chain
    #[error("Malformed chain: {0}")]
    MalformedChain(String),

    /// Serialization error (value cannot be canonicalized)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Metrics registration error
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this is one of the declared block/chain rejection kinds.
    ///
    /// A node receiving a block swallows exactly these and keeps its state;
    /// anything else is an operational fault and propagates.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Error::InvalidTransaction { .. }
                | Error::HashMismatch { .. }
                | Error::SequenceError { .. }
                | Error::LinkageError { .. }
                | Error::MalformedChain(_)
        )
    }
}

impl From<prometheus::Error> for Error {
    fn from(err: prometheus::Error) -> Self {
        Error::Metrics(err.to_string())
    }
}
