//! Actor-based concurrency for a chain node
//!
//! This module implements the single-writer pattern using Tokio actors:
//! - One task owns the node's `(chain, state)` and its assembler
//! - Appending a block and adopting its state happen in one message turn
//! - Async message passing with backpressure
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │        Transaction sources / peer block feeds        │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │                NodeHandle (Clone)                     │
//! │         Sends messages to actor mailbox              │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       │ mpsc::channel (bounded)
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │                NodeActor (Single Task)                │
//! │  ┌────────────────────────────────────────────────┐  │
//! │  │ Assembler: pending transactions                │  │
//! │  │ Timer: seal_interval or full block → seal()    │  │
//! │  └────────────────────────────────────────────────┘  │
//! │                       │                               │
//! │                       ▼                               │
//! │        Node::produce_block / receive_block            │
//! │          (validate, then append + adopt)              │
//! └───────────────────────────────────────────────────────┘
//! ```

use crate::{
    assembler::BlockAssembler,
    block::Block,
    chain::Chain,
    config::AssemblyConfig,
    node::{BlockOutcome, Node},
    state::State,
    types::Transaction,
    Error, Metrics, Result,
};
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Duration};

/// Message sent to the node actor
#[derive(Debug)]
pub enum NodeMessage {
    /// Queue a transaction for the next block
    SubmitTransaction {
        txn: Transaction,
        response: oneshot::Sender<Result<usize>>,
    },

    /// Offer a block received from a peer
    SubmitBlock {
        block: Block,
        response: oneshot::Sender<Result<BlockOutcome>>,
    },

    /// Seal pending transactions into a block now
    SealBlock {
        response: oneshot::Sender<Result<Option<u64>>>,
    },

    /// Get state at the tip
    GetState {
        response: oneshot::Sender<State>,
    },

    /// Get a copy of the chain
    GetChain {
        response: oneshot::Sender<Chain>,
    },

    /// Get chain height
    GetHeight {
        response: oneshot::Sender<usize>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that owns a node and serializes every mutation of it
#[derive(Debug)]
pub struct NodeActor {
    /// Chain and state
    node: Node,

    /// Pending transactions
    assembler: BlockAssembler,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<NodeMessage>,

    /// Seal interval
    seal_interval: Duration,

    /// Automatic sealing enabled
    auto_seal: bool,

    /// Metrics sink
    metrics: Metrics,
}

impl NodeActor {
    /// Create new actor
    pub fn new(
        node: Node,
        mailbox: mpsc::Receiver<NodeMessage>,
        config: &AssemblyConfig,
        metrics: Metrics,
    ) -> Self {
        metrics.set_chain_height(node.height());

        Self {
            node,
            assembler: BlockAssembler::new(config.max_txns_per_block),
            mailbox,
            seal_interval: Duration::from_millis(config.seal_interval_ms.max(1)),
            auto_seal: config.auto_seal,
            metrics,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        // First tick one full interval after start
        let mut seal_timer = interval_at(
            tokio::time::Instant::now() + self.seal_interval,
            self.seal_interval,
        );
        seal_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // Process incoming messages
                Some(msg) = self.mailbox.recv() => {
                    if let NodeMessage::Shutdown = msg {
                        tracing::info!(
                            height = self.node.height(),
                            pending = self.assembler.len(),
                            "Node actor shutting down"
                        );
                        break;
                    }

                    if let Err(e) = self.handle_message(msg) {
                        tracing::error!("Error handling message: {}", e);
                    }

                    // Seal as soon as a block's worth is pending
                    if self.auto_seal && self.assembler.is_full() {
                        if let Err(e) = self.seal() {
                            tracing::error!("Error sealing full block: {}", e);
                        }
                    }
                }

                // Seal interval expired
                _ = seal_timer.tick(), if self.auto_seal && !self.assembler.is_empty() => {
                    if let Err(e) = self.seal() {
                        tracing::error!("Error sealing block on interval: {}", e);
                    }
                }

                // Mailbox closed
                else => break,
            }
        }
    }

    /// Handle a single message
    fn handle_message(&mut self, msg: NodeMessage) -> Result<()> {
        match msg {
            NodeMessage::SubmitTransaction { txn, response } => {
                let pending = self.assembler.submit(txn);
                let _ = response.send(Ok(pending));
            }

            NodeMessage::SubmitBlock { block, response } => {
                let result = self.receive(block);
                let _ = response.send(result);
            }

            NodeMessage::SealBlock { response } => {
                let result = self.seal();
                let _ = response.send(result);
            }

            NodeMessage::GetState { response } => {
                let _ = response.send(self.node.state().clone());
            }

            NodeMessage::GetChain { response } => {
                let _ = response.send(self.node.chain().clone());
            }

            NodeMessage::GetHeight { response } => {
                let _ = response.send(self.node.height());
            }

            NodeMessage::Shutdown => {
                // Handled in main loop
            }
        }

        Ok(())
    }

    /// Validate and append a peer block
    fn receive(&mut self, block: Block) -> Result<BlockOutcome> {
        let txns = block.contents.txns.len();
        let started = Instant::now();
        let outcome = self.node.receive_block(block)?;
        self.metrics
            .record_validation_duration(started.elapsed().as_secs_f64());

        match &outcome {
            BlockOutcome::Accepted { .. } => {
                self.metrics.record_block_accepted(txns, self.node.height())
            }
            BlockOutcome::Rejected { .. } => self.metrics.record_block_rejected(),
        }

        Ok(outcome)
    }

    /// Seal pending transactions into the next block
    fn seal(&mut self) -> Result<Option<u64>> {
        if self.assembler.is_empty() {
            return Ok(None);
        }

        let before = self.assembler.len();
        let produced = self.node.produce_block(&mut self.assembler)?;
        let consumed = before - self.assembler.len();

        let included = match produced {
            Some(_) => self.node.chain().blocks.last().map_or(0, |b| b.contents.txns.len()),
            None => 0,
        };
        self.metrics.record_txns_ignored(consumed - included);
        if produced.is_some() {
            self.metrics
                .record_block_accepted(included, self.node.height());
        }

        tracing::debug!(
            pending = self.assembler.len(),
            "Flushed pending transactions"
        );
        Ok(produced)
    }
}

/// Handle for sending messages to the actor
#[derive(Clone, Debug)]
pub struct NodeHandle {
    sender: mpsc::Sender<NodeMessage>,
}

impl NodeHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<NodeMessage>) -> Self {
        Self { sender }
    }

    /// Queue a transaction; returns the number pending
    pub async fn submit_transaction(&self, txn: Transaction) -> Result<usize> {
        let (tx, rx) = oneshot::channel();
        self.send(NodeMessage::SubmitTransaction { txn, response: tx })
            .await?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Offer a block received from a peer
    pub async fn submit_block(&self, block: Block) -> Result<BlockOutcome> {
        let (tx, rx) = oneshot::channel();
        self.send(NodeMessage::SubmitBlock {
            block,
            response: tx,
        })
        .await?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Seal pending transactions now
    pub async fn seal_block(&self) -> Result<Option<u64>> {
        let (tx, rx) = oneshot::channel();
        self.send(NodeMessage::SealBlock { response: tx }).await?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Get state at the tip
    pub async fn get_state(&self) -> Result<State> {
        let (tx, rx) = oneshot::channel();
        self.send(NodeMessage::GetState { response: tx }).await?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Get a copy of the chain
    pub async fn get_chain(&self) -> Result<Chain> {
        let (tx, rx) = oneshot::channel();
        self.send(NodeMessage::GetChain { response: tx }).await?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Get chain height
    pub async fn get_height(&self) -> Result<usize> {
        let (tx, rx) = oneshot::channel();
        self.send(NodeMessage::GetHeight { response: tx }).await?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.send(NodeMessage::Shutdown).await
    }

    async fn send(&self, msg: NodeMessage) -> Result<()> {
        self.sender
            .send(msg)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))
    }
}

/// Spawn the node actor
pub fn spawn_node_actor(node: Node, config: &AssemblyConfig, metrics: Metrics) -> NodeHandle {
    let (tx, rx) = mpsc::channel(1000); // Bounded channel for backpressure
    let actor = NodeActor::new(node, rx, config, metrics);

    tokio::spawn(async move {
        actor.run().await;
    });

    NodeHandle::new(tx)
}
