//! Hashchain Ledger Core
//!
//! Append-only chain of transfer blocks, linked by content hashes and
//! validated by replaying every transaction against a balance state.
//!
//! # Architecture
//!
//! - **Canonical hashing**: Sorted-key JSON, SHA-256, hex digest
//! - **Copy-on-write state**: Applying a transaction yields a new state
//! - **Replay validation**: A chain is trusted only after full replay
//! - **Single writer**: One actor task owns each node's `(chain, state)`
//!
//! # Invariants
//!
//! - Value conservation: every transfer's deltas sum to zero
//! - No overdraft: no balance ever drops below zero
//! - Hash integrity: a block's hash is the digest of its contents
//! - Linkage: each block names its parent's hash and follows its number
//!
//! # Example
//!
//! ```
//! use chain_core::{check_chain, Allocation, Node, Transaction};
//!
//! # fn main() -> chain_core::Result<()> {
//! let mut node = Node::from_genesis(Allocation::from([("Alice", 50), ("Bob", 50)]))?;
//!
//! let block = chain_core::make_block(
//!     vec![Transaction::from([("Alice", -3), ("Bob", 3)])],
//!     node.chain().tip(),
//! )?;
//! assert!(node.receive_block(block)?.is_accepted());
//!
//! let state = check_chain(&node.chain().to_json()?)?;
//! assert_eq!(&state, node.state());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod canonical;
pub mod state;
pub mod block;
pub mod chain;
pub mod validation;
pub mod node;
pub mod assembler;
pub mod generator;
pub mod actor;
pub mod error;
pub mod config;
pub mod metrics;

// Re-exports
pub use error::{Error, Result};
pub use types::{AccountId, Allocation, BlockHash, Transaction};
pub use canonical::hash;
pub use state::{is_valid_txn, update_state, State};
pub use block::{make_block, Block, BlockContents, BlockRef, GenesisBlock};
pub use chain::{Chain, ChainSource};
pub use validation::{check_block_hash, check_block_validity, check_chain, check_genesis};
pub use node::{BlockOutcome, Node};
pub use assembler::BlockAssembler;
pub use generator::TransactionGenerator;
pub use config::Config;
pub use metrics::Metrics;
