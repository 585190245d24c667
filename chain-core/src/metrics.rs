//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring a chain node.
//!
//! # Metrics
//!
//! - `chain_blocks_accepted_total` - Blocks appended (produced or received)
//! - `chain_blocks_rejected_total` - Received blocks that failed validation
//! - `chain_txns_applied_total` - Transactions included in appended blocks
//! - `chain_txns_ignored_total` - Pending transactions dropped by the assembler
//! - `chain_height` - Number of blocks, genesis included
//! - `chain_block_validation_seconds` - Histogram of block validation latencies

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder,
};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone, Debug)]
pub struct Metrics {
    /// Blocks appended
    pub blocks_accepted: IntCounter,

    /// Blocks rejected
    pub blocks_rejected: IntCounter,

    /// Transactions applied
    pub txns_applied: IntCounter,

    /// Transactions ignored during assembly
    pub txns_ignored: IntCounter,

    /// Current chain height
    pub chain_height: IntGauge,

    /// Block validation duration histogram
    pub validation_duration: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> crate::Result<Self> {
        let registry = Arc::new(Registry::new());

        let blocks_accepted = IntCounter::new(
            "chain_blocks_accepted_total",
            "Blocks appended (produced or received)",
        )?;
        registry.register(Box::new(blocks_accepted.clone()))?;

        let blocks_rejected = IntCounter::new(
            "chain_blocks_rejected_total",
            "Received blocks that failed validation",
        )?;
        registry.register(Box::new(blocks_rejected.clone()))?;

        let txns_applied = IntCounter::new(
            "chain_txns_applied_total",
            "Transactions included in appended blocks",
        )?;
        registry.register(Box::new(txns_applied.clone()))?;

        let txns_ignored = IntCounter::new(
            "chain_txns_ignored_total",
            "Pending transactions dropped by the assembler",
        )?;
        registry.register(Box::new(txns_ignored.clone()))?;

        let chain_height = IntGauge::new("chain_height", "Number of blocks, genesis included")?;
        registry.register(Box::new(chain_height.clone()))?;

        let validation_duration = Histogram::with_opts(
            HistogramOpts::new(
                "chain_block_validation_seconds",
                "Histogram of block validation latencies",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.010, 0.050, 0.100, 0.500]),
        )?;
        registry.register(Box::new(validation_duration.clone()))?;

        Ok(Self {
            blocks_accepted,
            blocks_rejected,
            txns_applied,
            txns_ignored,
            chain_height,
            validation_duration,
            registry,
        })
    }

    /// Record an appended block with `txns` transactions
    pub fn record_block_accepted(&self, txns: usize, height: usize) {
        self.blocks_accepted.inc();
        self.txns_applied.inc_by(txns as u64);
        self.chain_height.set(height as i64);
    }

    /// Record a rejected block
    pub fn record_block_rejected(&self) {
        self.blocks_rejected.inc();
    }

    /// Record transactions dropped during assembly
    pub fn record_txns_ignored(&self, count: usize) {
        self.txns_ignored.inc_by(count as u64);
    }

    /// Record validation duration
    pub fn record_validation_duration(&self, duration_seconds: f64) {
        self.validation_duration.observe(duration_seconds);
    }

    /// Set chain height
    pub fn set_chain_height(&self, height: usize) {
        self.chain_height.set(height as i64);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render all metrics in the Prometheus text format
    pub fn render(&self) -> crate::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| crate::Error::Metrics(e.to_string()))
    }
}
